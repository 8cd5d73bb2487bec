use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of drivers shown in the summary when `top` is not set
pub const DEFAULT_TOP: usize = 5;

/// User configuration.
///
/// Example YAML:
/// ```yaml
/// data_file: ~/racing/championship.json
/// top: 10
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON file holding drivers, teams, races and the points schedule
    /// (default: ~/.config/podium/championship.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Rows shown in the standings summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
}

impl Config {
    pub fn top(&self) -> usize {
        self.top.unwrap_or(DEFAULT_TOP)
    }
}
