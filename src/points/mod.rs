pub mod schedule;

pub use schedule::{apply_position_edit, parse_position, PointsSchedule};
