use std::collections::HashSet;

use super::types::ChampionshipData;

/// Check referential integrity of a championship snapshot.
/// Returns every defect found, not just the first. None of these stop the
/// standings from being computed; they only explain "Unknown" entries.
pub fn validate_references(data: &ChampionshipData) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let mut driver_ids = HashSet::new();
    for driver in &data.drivers {
        if !driver_ids.insert(driver.id.as_str()) {
            errors.push(format!("drivers: duplicate id '{}'", driver.id));
        }
    }

    let mut team_ids = HashSet::new();
    for team in &data.teams {
        if !team_ids.insert(team.id.as_str()) {
            errors.push(format!("teams: duplicate id '{}'", team.id));
        }
    }

    for driver in &data.drivers {
        if !team_ids.contains(driver.team_id.as_str()) {
            errors.push(format!(
                "drivers.{}.teamId: unknown team '{}'",
                driver.id, driver.team_id
            ));
        }
    }

    let mut race_ids = HashSet::new();
    for race in &data.races {
        if !race_ids.insert(race.id.as_str()) {
            errors.push(format!("races: duplicate id '{}'", race.id));
        }

        for (s_idx, session) in race.sessions.iter().enumerate() {
            let mut positions = HashSet::new();
            for (r_idx, result) in session.results.iter().enumerate() {
                let path = format!("races.{}.sessions[{}].results[{}]", race.id, s_idx, r_idx);

                if !driver_ids.contains(result.driver_id.as_str()) {
                    errors.push(format!("{}.driverId: unknown driver '{}'", path, result.driver_id));
                }
                if !team_ids.contains(result.team_id.as_str()) {
                    errors.push(format!("{}.teamId: unknown team '{}'", path, result.team_id));
                }
                if result.position == 0 {
                    errors.push(format!("{}.position: must be positive", path));
                } else if !positions.insert(result.position) {
                    errors.push(format!(
                        "{}.position: duplicate position {} in session '{}'",
                        path, result.position, session.name
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Driver, Race, RaceResult, Session, Team};
    use chrono::NaiveDate;

    fn team(id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: id.to_string(),
            short_name: id.to_uppercase(),
            color: "#ff0000".to_string(),
            description: String::new(),
        }
    }

    fn driver(id: &str, team: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: id.to_string(),
            number: 7,
            team_id: team.to_string(),
            nationality: "JPN".to_string(),
            bio: String::new(),
            photo_url: None,
        }
    }

    fn race_with(results: Vec<RaceResult>) -> Race {
        Race {
            id: "rd1".to_string(),
            round: 1,
            name: "Opener".to_string(),
            circuit: "Suzuka".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            country: "JPN".to_string(),
            sessions: vec![Session {
                session_type: "RACE 1".to_string(),
                name: "RACE 1".to_string(),
                results,
            }],
        }
    }

    #[test]
    fn test_clean_data_passes() {
        let a = driver("a", "x");
        let data = ChampionshipData {
            teams: vec![team("x")],
            races: vec![race_with(vec![RaceResult::placeholder(1, &a)])],
            drivers: vec![a],
            ..Default::default()
        };
        assert!(validate_references(&data).is_ok());
    }

    #[test]
    fn test_empty_data_passes() {
        assert!(validate_references(&ChampionshipData::default()).is_ok());
    }

    #[test]
    fn test_dangling_result_references() {
        let ghost = driver("ghost", "nowhere");
        let data = ChampionshipData {
            teams: vec![team("x")],
            races: vec![race_with(vec![RaceResult::placeholder(1, &ghost)])],
            ..Default::default()
        };
        let errors = validate_references(&data).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("driverId: unknown driver 'ghost'"));
        assert!(errors[1].contains("teamId: unknown team 'nowhere'"));
    }

    #[test]
    fn test_collects_all_errors() {
        let a = driver("a", "x");
        let zero = RaceResult::placeholder(0, &a);
        let data = ChampionshipData {
            drivers: vec![a.clone(), a.clone(), driver("b", "missing")],
            teams: vec![team("x")],
            races: vec![race_with(vec![
                RaceResult::placeholder(2, &a),
                RaceResult::placeholder(2, &a),
                zero,
            ])],
            ..Default::default()
        };
        let errors = validate_references(&data).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("drivers: duplicate id 'a'"));
        assert!(errors[1].contains("drivers.b.teamId"));
        assert!(errors[2].contains("duplicate position 2"));
        assert!(errors[3].contains("position: must be positive"));
    }
}
