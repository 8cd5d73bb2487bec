mod types;
pub mod validation;

pub use types::{ChampionshipData, Driver, Race, RaceResult, Session, Team, DEFAULT_TOTAL_TIME};
pub use validation::validate_references;
