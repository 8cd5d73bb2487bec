use super::engine::DriverStanding;
use crate::model::{Driver, Race, RaceResult};

/// One race's worth of results for a single driver
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEntry<'a> {
    pub race: &'a Race,
    /// (session name, result) pairs in session order
    pub results: Vec<(&'a str, &'a RaceResult)>,
}

/// A driver's results grouped by race, in calendar order.
/// Races where the driver has no result are skipped.
pub fn driver_history<'a>(driver_id: &str, races: &'a [Race]) -> Vec<RaceEntry<'a>> {
    let mut ordered: Vec<&'a Race> = races.iter().collect();
    ordered.sort_by_key(|r| r.round);

    ordered
        .into_iter()
        .filter_map(|race| {
            let results: Vec<(&'a str, &'a RaceResult)> = race
                .sessions
                .iter()
                .flat_map(|s| {
                    s.results
                        .iter()
                        .filter(|r| r.driver_id == driver_id)
                        .map(move |r| (s.name.as_str(), r))
                })
                .collect();

            if results.is_empty() {
                None
            } else {
                Some(RaceEntry { race, results })
            }
        })
        .collect()
}

/// Current drivers of a team, each paired with their standing when they have one
pub fn team_roster<'a, 'b>(
    team_id: &str,
    drivers: &'a [Driver],
    standings: &'b [DriverStanding<'a>],
) -> Vec<(&'a Driver, Option<&'b DriverStanding<'a>>)> {
    drivers
        .iter()
        .filter(|d| d.team_id == team_id)
        .map(|d| (d, standings.iter().find(|s| s.driver.id == d.id)))
        .collect()
}

/// Top `n` entries of an already ranked list
pub fn leaders<T>(standings: &[T], n: usize) -> &[T] {
    &standings[..n.min(standings.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Session, Team};
    use crate::standings::compute_driver_standings;
    use chrono::NaiveDate;

    fn driver(id: &str, team: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: id.to_string(),
            number: 4,
            team_id: team.to_string(),
            nationality: "JPN".to_string(),
            bio: String::new(),
            photo_url: None,
        }
    }

    fn race(id: &str, round: u32, sessions: Vec<(&str, Vec<RaceResult>)>) -> Race {
        Race {
            id: id.to_string(),
            round,
            name: id.to_string(),
            circuit: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 7, round).unwrap(),
            country: "JPN".to_string(),
            sessions: sessions
                .into_iter()
                .map(|(name, results)| Session {
                    session_type: name.to_string(),
                    name: name.to_string(),
                    results,
                })
                .collect(),
        }
    }

    #[test]
    fn test_history_groups_by_race_in_round_order() {
        let a = driver("a", "x");
        let b = driver("b", "x");
        let races = vec![
            race(
                "second",
                2,
                vec![
                    ("RACE 1", vec![RaceResult::placeholder(2, &a)]),
                    ("RACE 2", vec![RaceResult::placeholder(1, &a)]),
                ],
            ),
            race("only-b", 3, vec![("RACE 1", vec![RaceResult::placeholder(1, &b)])]),
            race("first", 1, vec![("RACE 1", vec![RaceResult::placeholder(3, &a)])]),
            race("scheduled", 4, vec![]),
        ];

        let history = driver_history("a", &races);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].race.id, "first");
        assert_eq!(history[1].race.id, "second");
        assert_eq!(history[1].results.len(), 2);
        assert_eq!(history[1].results[1].0, "RACE 2");
        assert_eq!(history[1].results[1].1.position, 1);
    }

    #[test]
    fn test_history_for_unknown_driver_is_empty() {
        assert!(driver_history("nobody", &[]).is_empty());
    }

    #[test]
    fn test_team_roster_pairs_standings() {
        let teams = vec![Team {
            id: "x".to_string(),
            name: "X".to_string(),
            short_name: "X".to_string(),
            color: "#fff".to_string(),
            description: String::new(),
        }];
        let a = driver("a", "x");
        let drivers = vec![a.clone(), driver("rookie", "x"), driver("other", "y")];
        let races = vec![race("r", 1, vec![("RACE 1", vec![RaceResult::placeholder(1, &a)])])];
        let standings = compute_driver_standings(&drivers, &teams, &races);

        let roster = team_roster("x", &drivers, &standings);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].0.id, "a");
        assert!(roster[0].1.is_some());
        assert_eq!(roster[1].0.id, "rookie");
        assert!(roster[1].1.is_none());
    }

    #[test]
    fn test_leaders_clamps() {
        let ranked = vec![1, 2, 3];
        assert_eq!(leaders(&ranked, 2), &[1, 2]);
        assert_eq!(leaders(&ranked, 10), &[1, 2, 3]);
        assert!(leaders::<i32>(&[], 5).is_empty());
    }
}
