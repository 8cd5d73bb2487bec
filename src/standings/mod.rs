pub mod engine;
pub mod history;

pub use engine::{compute_driver_standings, compute_team_standings, DriverStanding, TeamStanding};
pub use history::{driver_history, leaders, team_roster, RaceEntry};
