pub mod formatter;

pub use formatter::{
    format_driver_detail, format_driver_list, format_driver_standings, format_driver_standings_tsv,
    format_race_calendar, format_race_detail, format_team_detail, format_team_list,
    format_team_standings, format_team_standings_tsv, should_use_colors,
};
