mod error;
pub mod file;
pub mod memory;
pub mod propagate;

pub use error::{EntityKind, StoreError};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use propagate::{on_driver_team_changed, reassign_driver_team};

use tracing::info;

use crate::model::{ChampionshipData, Driver, Race, RaceResult, Team};
use crate::points::{apply_position_edit, PointsSchedule};

/// Partial update for a driver. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub number: Option<u32>,
    pub team_id: Option<String>,
    pub nationality: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<Option<String>>,
}

/// Partial update for a team. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Persistent home of drivers, teams, races and the points schedule.
///
/// Implementors provide `load` and `commit`; every mutation below runs as one
/// `transact` call, so a multi-step change (replacing a race's sessions,
/// rewriting a driver's history on transfer) lands in a single commit or not
/// at all. Concurrent writers are last-write-wins.
pub trait EntityStore {
    fn load(&self) -> Result<ChampionshipData, StoreError>;

    fn commit(&self, data: &ChampionshipData) -> Result<(), StoreError>;

    /// Load, apply `f`, commit. Nothing is written when `f` fails.
    fn transact<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ChampionshipData) -> Result<T, StoreError>,
    {
        let mut data = self.load()?;
        let out = f(&mut data)?;
        self.commit(&data)?;
        Ok(out)
    }

    fn list_drivers(&self) -> Result<Vec<Driver>, StoreError> {
        Ok(self.load()?.drivers)
    }

    fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(self.load()?.teams)
    }

    fn list_races(&self) -> Result<Vec<Race>, StoreError> {
        Ok(self.load()?.races)
    }

    fn points_schedule(&self) -> Result<PointsSchedule, StoreError> {
        Ok(self.load()?.points_system)
    }

    fn get_driver(&self, id: &str) -> Result<Driver, StoreError> {
        self.load()?
            .driver(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(EntityKind::Driver, id))
    }

    fn get_team(&self, id: &str) -> Result<Team, StoreError> {
        self.load()?
            .team(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(EntityKind::Team, id))
    }

    fn get_race(&self, id: &str) -> Result<Race, StoreError> {
        self.load()?
            .race(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(EntityKind::Race, id))
    }

    fn create_driver(&self, driver: Driver) -> Result<Driver, StoreError> {
        self.transact(|data| {
            if data.driver(&driver.id).is_some() {
                return Err(StoreError::already_exists(EntityKind::Driver, &driver.id));
            }
            info!(driver = %driver.id, "created driver");
            data.drivers.push(driver.clone());
            Ok(driver)
        })
    }

    /// Apply a partial update. When the update moves the driver to another
    /// team, every historical result of the driver follows in the same commit.
    fn update_driver(&self, id: &str, update: DriverUpdate) -> Result<Driver, StoreError> {
        self.transact(|data| {
            let driver = data
                .drivers
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| StoreError::not_found(EntityKind::Driver, id))?;

            let old_team = driver.team_id.clone();
            if let Some(name) = update.name {
                driver.name = name;
            }
            if let Some(number) = update.number {
                driver.number = number;
            }
            if let Some(team_id) = update.team_id {
                driver.team_id = team_id;
            }
            if let Some(nationality) = update.nationality {
                driver.nationality = nationality;
            }
            if let Some(bio) = update.bio {
                driver.bio = bio;
            }
            if let Some(photo_url) = update.photo_url {
                driver.photo_url = photo_url;
            }
            let updated = driver.clone();

            on_driver_team_changed(&mut data.races, id, &old_team, &updated.team_id);
            info!(driver = id, "updated driver");
            Ok(updated)
        })
    }

    /// Results that reference the driver are left in place
    fn delete_driver(&self, id: &str) -> Result<(), StoreError> {
        self.transact(|data| {
            let before = data.drivers.len();
            data.drivers.retain(|d| d.id != id);
            if data.drivers.len() == before {
                return Err(StoreError::not_found(EntityKind::Driver, id));
            }
            info!(driver = id, "deleted driver");
            Ok(())
        })
    }

    fn create_team(&self, team: Team) -> Result<Team, StoreError> {
        self.transact(|data| {
            if data.team(&team.id).is_some() {
                return Err(StoreError::already_exists(EntityKind::Team, &team.id));
            }
            info!(team = %team.id, "created team");
            data.teams.push(team.clone());
            Ok(team)
        })
    }

    fn update_team(&self, id: &str, update: TeamUpdate) -> Result<Team, StoreError> {
        self.transact(|data| {
            let team = data
                .teams
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| StoreError::not_found(EntityKind::Team, id))?;

            if let Some(name) = update.name {
                team.name = name;
            }
            if let Some(short_name) = update.short_name {
                team.short_name = short_name;
            }
            if let Some(color) = update.color {
                team.color = color;
            }
            if let Some(description) = update.description {
                team.description = description;
            }
            info!(team = id, "updated team");
            Ok(team.clone())
        })
    }

    /// Drivers and results that reference the team are left in place
    fn delete_team(&self, id: &str) -> Result<(), StoreError> {
        self.transact(|data| {
            let before = data.teams.len();
            data.teams.retain(|t| t.id != id);
            if data.teams.len() == before {
                return Err(StoreError::not_found(EntityKind::Team, id));
            }
            info!(team = id, "deleted team");
            Ok(())
        })
    }

    /// Add a race with its sessions. An empty id is generated from the round.
    fn create_race(&self, mut race: Race) -> Result<Race, StoreError> {
        self.transact(|data| {
            if race.id.is_empty() {
                race.id = unique_race_id(data, race.round);
            } else if data.race(&race.id).is_some() {
                return Err(StoreError::already_exists(EntityKind::Race, &race.id));
            }
            info!(race = %race.id, round = race.round, sessions = race.sessions.len(), "created race");
            data.races.push(race.clone());
            Ok(race)
        })
    }

    /// Replace a race's details and its whole session list in one commit.
    /// The stored id is kept regardless of `race.id`.
    fn update_race(&self, id: &str, mut race: Race) -> Result<Race, StoreError> {
        self.transact(|data| {
            let slot = data
                .races
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::not_found(EntityKind::Race, id))?;
            race.id = id.to_string();
            *slot = race.clone();
            info!(race = id, sessions = race.sessions.len(), "replaced race");
            Ok(race)
        })
    }

    /// Removes the race together with its sessions and results
    fn delete_race(&self, id: &str) -> Result<(), StoreError> {
        self.transact(|data| {
            let before = data.races.len();
            data.races.retain(|r| r.id != id);
            if data.races.len() == before {
                return Err(StoreError::not_found(EntityKind::Race, id));
            }
            info!(race = id, "deleted race");
            Ok(())
        })
    }

    /// Append a session pre-filled with the current roster
    fn add_session(&self, race_id: &str) -> Result<Race, StoreError> {
        self.transact(|data| {
            let drivers = data.drivers.clone();
            let race = data
                .races
                .iter_mut()
                .find(|r| r.id == race_id)
                .ok_or_else(|| StoreError::not_found(EntityKind::Race, race_id))?;
            let session = race.add_session(&drivers);
            info!(race = race_id, session = %session.name, "added session");
            Ok(race.clone())
        })
    }

    /// Change a result's position from raw form input. Points are re-derived
    /// from the stored schedule.
    fn set_result_position(
        &self,
        race_id: &str,
        session_index: usize,
        driver_id: &str,
        input: &str,
    ) -> Result<RaceResult, StoreError> {
        self.transact(|data| {
            let schedule = data.points_system.clone();
            let result = find_result_mut(data, race_id, session_index, driver_id)?;
            apply_position_edit(result, input, &schedule);
            info!(
                race = race_id,
                driver = driver_id,
                position = result.position,
                points = result.points,
                "edited result position"
            );
            Ok(result.clone())
        })
    }

    /// Override a result's points. Never checked against the schedule.
    fn set_result_points(
        &self,
        race_id: &str,
        session_index: usize,
        driver_id: &str,
        points: i64,
    ) -> Result<RaceResult, StoreError> {
        self.transact(|data| {
            let result = find_result_mut(data, race_id, session_index, driver_id)?;
            result.points = points;
            info!(race = race_id, driver = driver_id, points, "edited result points");
            Ok(result.clone())
        })
    }
}

fn find_result_mut<'a>(
    data: &'a mut ChampionshipData,
    race_id: &str,
    session_index: usize,
    driver_id: &str,
) -> Result<&'a mut RaceResult, StoreError> {
    let race = data
        .races
        .iter_mut()
        .find(|r| r.id == race_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Race, race_id))?;
    let session = race
        .sessions
        .get_mut(session_index)
        .ok_or_else(|| StoreError::SessionNotFound {
            race_id: race_id.to_string(),
            index: session_index,
        })?;
    session
        .result_for_driver_mut(driver_id)
        .ok_or_else(|| StoreError::ResultNotFound {
            race_id: race_id.to_string(),
            index: session_index,
            driver_id: driver_id.to_string(),
        })
}

/// `rd{round}`, suffixed `-2`, `-3`, ... until it is free
fn unique_race_id(data: &ChampionshipData, round: u32) -> String {
    let base = format!("rd{}", round);
    if data.race(&base).is_none() {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if data.race(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Session;
    use crate::standings::{compute_driver_standings, compute_team_standings};
    use chrono::NaiveDate;

    fn team(id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {}", id),
            short_name: id.to_uppercase(),
            color: "#e10600".to_string(),
            description: String::new(),
        }
    }

    fn driver(id: &str, team: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: id.to_uppercase(),
            number: 9,
            team_id: team.to_string(),
            nationality: "JPN".to_string(),
            bio: String::new(),
            photo_url: None,
        }
    }

    fn race(id: &str, round: u32, results: Vec<RaceResult>) -> Race {
        Race {
            id: id.to_string(),
            round,
            name: format!("Round {}", round),
            circuit: "Sugo".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 9, round).unwrap(),
            country: "JPN".to_string(),
            sessions: vec![Session {
                session_type: "RACE 1".to_string(),
                name: "RACE 1".to_string(),
                results,
            }],
        }
    }

    fn seeded() -> MemoryStore {
        let a = driver("a", "x");
        let b = driver("b", "y");
        let mut r1 = RaceResult::placeholder(1, &a);
        r1.points = 25;
        let mut r2 = RaceResult::placeholder(2, &b);
        r2.points = 18;
        let mut r3 = RaceResult::placeholder(1, &a);
        r3.points = 25;

        MemoryStore::new(ChampionshipData {
            drivers: vec![a, b],
            teams: vec![team("x"), team("y")],
            races: vec![race("rd1", 1, vec![r1, r2]), race("rd2", 2, vec![r3])],
            ..Default::default()
        })
    }

    #[test]
    fn test_transfer_rewrites_history_in_one_commit() {
        let store = seeded();
        let updated = store
            .update_driver(
                "a",
                DriverUpdate {
                    team_id: Some("y".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.team_id, "y");
        assert_eq!(store.commits(), 1);

        let data = store.load().unwrap();
        assert!(data
            .races
            .iter()
            .flat_map(Race::results)
            .filter(|r| r.driver_id == "a")
            .all(|r| r.team_id == "y"));

        let teams = compute_team_standings(&data.teams, &data.races);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_id, "y");
        assert_eq!(teams[0].points, 68);
    }

    #[test]
    fn test_update_without_team_change_keeps_snapshots() {
        let store = seeded();
        store
            .update_driver(
                "a",
                DriverUpdate {
                    name: Some("Renamed".to_string()),
                    team_id: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let data = store.load().unwrap();
        assert_eq!(data.driver("a").unwrap().name, "Renamed");
        assert_eq!(data.races[0].sessions[0].results[0].team_id, "x");
    }

    #[test]
    fn test_failed_update_does_not_propagate() {
        let store = seeded();
        let err = store
            .update_driver(
                "nobody",
                DriverUpdate {
                    team_id: Some("y".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Driver, .. }));
        assert_eq!(store.commits(), 0);
    }

    #[test]
    fn test_snapshot_team_survives_direct_edit_elsewhere() {
        let store = seeded();
        // Driver standings report the current team, team standings the snapshot
        store
            .transact(|data| {
                data.drivers[0].team_id = "y".to_string();
                Ok(())
            })
            .unwrap();
        let data = store.load().unwrap();
        let drivers = compute_driver_standings(&data.drivers, &data.teams, &data.races);
        assert_eq!(drivers[0].team.id, "y");
        let teams = compute_team_standings(&data.teams, &data.races);
        assert_eq!(teams[0].team_id, "x");
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let store = seeded();
        let err = store.create_team(team("x")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { kind: EntityKind::Team, .. }));
        let err = store.create_driver(driver("a", "x")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { kind: EntityKind::Driver, .. }));
    }

    #[test]
    fn test_create_race_generates_unique_id() {
        let store = seeded();
        let mut new_race = race("", 1, vec![]);
        new_race.sessions.clear();
        let created = store.create_race(new_race.clone()).unwrap();
        assert_eq!(created.id, "rd1-2");
        let again = store.create_race(new_race).unwrap();
        assert_eq!(again.id, "rd1-3");
        assert!(store.get_race("rd1-3").unwrap().is_scheduled());
    }

    #[test]
    fn test_update_race_replaces_sessions() {
        let store = seeded();
        let mut replacement = store.get_race("rd1").unwrap();
        replacement.id = "ignored".to_string();
        replacement.name = "Renamed Round".to_string();
        replacement.sessions.clear();

        let updated = store.update_race("rd1", replacement).unwrap();
        assert_eq!(updated.id, "rd1");
        let stored = store.get_race("rd1").unwrap();
        assert_eq!(stored.name, "Renamed Round");
        assert!(stored.sessions.is_empty());
    }

    #[test]
    fn test_delete_race_cascades() {
        let store = seeded();
        store.delete_race("rd1").unwrap();
        let data = store.load().unwrap();
        assert_eq!(data.races.len(), 1);
        assert!(matches!(
            store.delete_race("rd1").unwrap_err(),
            StoreError::NotFound { kind: EntityKind::Race, .. }
        ));
    }

    #[test]
    fn test_delete_driver_leaves_results() {
        let store = seeded();
        store.delete_driver("b").unwrap();
        let data = store.load().unwrap();
        assert!(data.driver("b").is_none());
        assert_eq!(data.races[0].sessions[0].results.len(), 2);

        let standings = compute_driver_standings(&data.drivers, &data.teams, &data.races);
        assert_eq!(standings.len(), 1);
    }

    #[test]
    fn test_update_and_delete_team() {
        let store = seeded();
        let updated = store
            .update_team(
                "x",
                TeamUpdate {
                    short_name: Some("XR".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.short_name, "XR");
        assert_eq!(updated.name, "Team x");

        store.delete_team("y").unwrap();
        assert_eq!(store.list_teams().unwrap().len(), 1);
        assert!(store.get_team("y").is_err());
    }

    #[test]
    fn test_set_position_uses_schedule() {
        let store = seeded();
        let result = store.set_result_position("rd1", 0, "b", "3").unwrap();
        assert_eq!(result.position, 3);
        assert_eq!(result.points, 15);

        let result = store.set_result_position("rd1", 0, "b", "x").unwrap();
        assert_eq!(result.position, 3);
        assert_eq!(result.points, 0);
    }

    #[test]
    fn test_set_points_overrides() {
        let store = seeded();
        let result = store.set_result_points("rd1", 0, "b", 99).unwrap();
        assert_eq!(result.points, 99);
        assert_eq!(result.position, 2);
    }

    #[test]
    fn test_result_edit_errors() {
        let store = seeded();
        assert!(matches!(
            store.set_result_points("rd1", 5, "b", 1).unwrap_err(),
            StoreError::SessionNotFound { index: 5, .. }
        ));
        assert!(matches!(
            store.set_result_points("rd2", 0, "b", 1).unwrap_err(),
            StoreError::ResultNotFound { .. }
        ));
        assert!(matches!(
            store.set_result_points("rd9", 0, "b", 1).unwrap_err(),
            StoreError::NotFound { kind: EntityKind::Race, .. }
        ));
    }

    #[test]
    fn test_add_session_uses_roster() {
        let store = seeded();
        let race = store.add_session("rd2").unwrap();
        assert_eq!(race.sessions.len(), 2);
        assert_eq!(race.sessions[1].name, "RACE 2");
        assert_eq!(race.sessions[1].results.len(), 2);
        assert_eq!(race.sessions[1].results[1].team_id, "y");
    }
}
