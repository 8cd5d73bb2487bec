use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::points::PointsSchedule;

/// Elapsed time recorded for a result that has not been run yet
pub const DEFAULT_TOTAL_TIME: &str = "00:00:000";
const DEFAULT_COUNTRY: &str = "JPN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub number: u32,
    /// Current team. Historical results carry their own snapshot.
    pub team_id: String,
    pub nationality: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: String,
    /// Display hint only
    pub color: String,
    #[serde(default)]
    pub description: String,
}

/// One driver's outcome in one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub position: u32,
    pub driver_id: String,
    /// Team the driver raced for in this session
    pub team_id: String,
    pub laps: u32,
    pub total_time: String,
    pub points: i64,
    #[serde(default)]
    pub fastest_lap: bool,
}

impl RaceResult {
    /// Placeholder entry for a driver in a freshly created session
    pub fn placeholder(position: u32, driver: &Driver) -> Self {
        Self {
            position,
            driver_id: driver.id.clone(),
            team_id: driver.team_id.clone(),
            laps: 0,
            total_time: DEFAULT_TOTAL_TIME.to_string(),
            points: 0,
            fastest_lap: false,
        }
    }

    pub fn is_win(&self) -> bool {
        self.position == 1
    }

    pub fn is_podium(&self) -> bool {
        self.position <= 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_type: String,
    pub name: String,
    #[serde(default)]
    pub results: Vec<RaceResult>,
}

impl Session {
    /// Session with one placeholder result per driver, in roster order
    pub fn with_roster(label: String, drivers: &[Driver]) -> Self {
        let results = drivers
            .iter()
            .enumerate()
            .map(|(idx, driver)| RaceResult::placeholder(idx as u32 + 1, driver))
            .collect();

        Self {
            session_type: label.clone(),
            name: label,
            results,
        }
    }

    /// Results ordered by finishing position (stable for duplicate positions)
    pub fn sorted_results(&self) -> Vec<&RaceResult> {
        let mut sorted: Vec<&RaceResult> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.position);
        sorted
    }

    pub fn result_for_driver_mut(&mut self, driver_id: &str) -> Option<&mut RaceResult> {
        self.results.iter_mut().find(|r| r.driver_id == driver_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: String,
    /// Authoritative calendar sequence
    pub round: u32,
    pub name: String,
    #[serde(default)]
    pub circuit: String,
    pub date: NaiveDate,
    pub country: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Race {
    /// A race that has not been run yet has no sessions
    pub fn is_scheduled(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Default race offered when an editor adds a new round: one session
    /// pre-filled with every driver in roster order
    pub fn template(round: u32, drivers: &[Driver], today: NaiveDate) -> Self {
        Self {
            id: format!("rd{}-tbd", round),
            round,
            name: format!("Rd.{} TBD", round),
            circuit: String::new(),
            date: today,
            country: DEFAULT_COUNTRY.to_string(),
            sessions: vec![Session::with_roster("RACE 1".to_string(), drivers)],
        }
    }

    /// Append the next numbered session ("RACE 2", "RACE 3", ...)
    pub fn add_session(&mut self, drivers: &[Driver]) -> &Session {
        let label = format!("RACE {}", self.sessions.len() + 1);
        self.sessions.push(Session::with_roster(label, drivers));
        &self.sessions[self.sessions.len() - 1]
    }

    pub fn results(&self) -> impl Iterator<Item = &RaceResult> {
        self.sessions.iter().flat_map(|s| s.results.iter())
    }
}

/// Full championship snapshot as persisted by the file store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionshipData {
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub races: Vec<Race>,
    #[serde(default)]
    pub points_system: PointsSchedule,
}

impl Default for ChampionshipData {
    fn default() -> Self {
        Self {
            drivers: Vec::new(),
            teams: Vec::new(),
            races: Vec::new(),
            points_system: PointsSchedule::default(),
        }
    }
}

impl ChampionshipData {
    pub fn driver(&self, id: &str) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == id)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn race(&self, id: &str) -> Option<&Race> {
        self.races.iter().find(|r| r.id == id)
    }

    /// Races in calendar order. Equal rounds keep their stored order.
    pub fn races_by_round(&self) -> Vec<&Race> {
        let mut races: Vec<&Race> = self.races.iter().collect();
        races.sort_by_key(|r| r.round);
        races
    }

    /// Round number offered for the next race added to the calendar
    pub fn next_round(&self) -> u32 {
        self.races.iter().map(|r| r.round).max().unwrap_or(0) + 1
    }
}
