use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{Driver, Race, RaceResult, Team};

/// A driver's championship position data
#[derive(Debug, Clone, PartialEq)]
pub struct DriverStanding<'a> {
    pub driver: &'a Driver,
    /// The driver's current team, not the snapshot on individual results
    pub team: &'a Team,
    pub points: i64,
    pub wins: u32,
    pub podiums: u32,
}

/// A constructor's championship position data
#[derive(Debug, Clone, PartialEq)]
pub struct TeamStanding<'a> {
    /// Id recorded on the results (the snapshot team)
    pub team_id: &'a str,
    /// `None` when no team record exists for `team_id`
    pub team: Option<&'a Team>,
    pub points: i64,
    pub wins: u32,
    /// Distinct drivers who scored for this team, in first-appearance order
    pub drivers: Vec<&'a str>,
}

impl TeamStanding<'_> {
    pub fn display_name(&self) -> &str {
        self.team.map_or("Unknown", |t| t.short_name.as_str())
    }
}

#[derive(Debug, Default)]
struct DriverTally {
    points: i64,
    wins: u32,
    podiums: u32,
}

#[derive(Debug, Default)]
struct TeamTally<'a> {
    points: i64,
    wins: u32,
    drivers: Vec<&'a str>,
}

/// Fold every result of every session of every race into one tally per key.
/// Keys come out in the order they were first seen, so exact ties stay
/// reproducible after the stable sort.
fn fold_results<'a, T, K, F>(races: &'a [Race], key: K, mut apply: F) -> Vec<(&'a str, T)>
where
    T: Default,
    K: Fn(&'a RaceResult) -> &'a str,
    F: FnMut(&mut T, &'a RaceResult),
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut tallies: Vec<(&'a str, T)> = Vec::new();

    for result in races.iter().flat_map(Race::results) {
        let k = key(result);
        let slot = *index.entry(k).or_insert_with(|| {
            tallies.push((k, T::default()));
            tallies.len() - 1
        });
        apply(&mut tallies[slot].1, result);
    }

    tallies
}

/// Drivers' championship.
///
/// Every driver with at least one result appears, ranked by points, then
/// wins, then podiums. Drivers whose record or current team cannot be
/// resolved are left out.
pub fn compute_driver_standings<'a>(
    drivers: &'a [Driver],
    teams: &'a [Team],
    races: &'a [Race],
) -> Vec<DriverStanding<'a>> {
    let tallies = fold_results(
        races,
        |r| r.driver_id.as_str(),
        |tally: &mut DriverTally, r| {
            tally.points += r.points;
            if r.is_win() {
                tally.wins += 1;
            }
            if r.is_podium() {
                tally.podiums += 1;
            }
        },
    );

    let mut standings: Vec<DriverStanding<'a>> = tallies
        .into_iter()
        .filter_map(|(driver_id, tally)| {
            let driver = drivers.iter().find(|d| d.id == driver_id)?;
            let team = teams.iter().find(|t| t.id == driver.team_id)?;
            Some(DriverStanding {
                driver,
                team,
                points: tally.points,
                wins: tally.wins,
                podiums: tally.podiums,
            })
        })
        .collect();

    standings.sort_by(compare_drivers);
    standings
}

/// Constructors' championship.
///
/// Results are grouped by the team recorded on each result. Ranked by points,
/// then wins; anything still tied keeps first-appearance order.
pub fn compute_team_standings<'a>(teams: &'a [Team], races: &'a [Race]) -> Vec<TeamStanding<'a>> {
    let tallies = fold_results(
        races,
        |r| r.team_id.as_str(),
        |tally: &mut TeamTally<'a>, r| {
            tally.points += r.points;
            if r.is_win() {
                tally.wins += 1;
            }
            if !tally.drivers.contains(&r.driver_id.as_str()) {
                tally.drivers.push(r.driver_id.as_str());
            }
        },
    );

    let mut standings: Vec<TeamStanding<'a>> = tallies
        .into_iter()
        .map(|(team_id, tally)| TeamStanding {
            team_id,
            team: teams.iter().find(|t| t.id == team_id),
            points: tally.points,
            wins: tally.wins,
            drivers: tally.drivers,
        })
        .collect();

    standings.sort_by(compare_teams);
    standings
}

fn compare_drivers(a: &DriverStanding, b: &DriverStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.podiums.cmp(&a.podiums))
}

fn compare_teams(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.points.cmp(&a.points).then_with(|| b.wins.cmp(&a.wins))
}
