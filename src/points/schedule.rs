use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::RaceResult;

/// Points awarded for positions 1..=10 when no schedule has been stored
const DEFAULT_POINTS: [i64; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];

/// Mapping from finishing position to points.
///
/// Only used as the default when an editor changes a result's position.
/// The points stored on a result stay authoritative afterwards.
///
/// Stored as a JSON object keyed by position:
/// ```json
/// { "1": 25, "2": 18, "3": 15 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsSchedule {
    points: BTreeMap<u32, i64>,
}

impl Default for PointsSchedule {
    fn default() -> Self {
        Self::from_points(&DEFAULT_POINTS)
    }
}

impl PointsSchedule {
    /// Build a schedule where `points[0]` is awarded for P1, `points[1]` for P2, ...
    pub fn from_points(points: &[i64]) -> Self {
        Self {
            points: points
                .iter()
                .enumerate()
                .map(|(idx, pts)| (idx as u32 + 1, *pts))
                .collect(),
        }
    }

    /// Points configured for exactly this position, 0 when none are
    pub fn lookup(&self, position: u32) -> i64 {
        self.points.get(&position).copied().unwrap_or(0)
    }

    /// Points for a raw position typed into an edit form.
    /// Anything that is not a positive integer earns nothing.
    pub fn points_for_input(&self, input: &str) -> i64 {
        parse_position(input).map_or(0, |pos| self.lookup(pos))
    }

    /// Number of paying positions
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i64)> + '_ {
        self.points.iter().map(|(pos, pts)| (*pos, *pts))
    }
}

/// Parse a finishing position from form input.
/// Accepts positive integers with surrounding whitespace, nothing else.
pub fn parse_position(input: &str) -> Option<u32> {
    match input.trim().parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(pos) => Some(pos),
    }
}

/// Apply a position edit to a result: the position is updated when the input
/// is valid and the points are always re-derived from the schedule.
///
/// Returns the new points value.
pub fn apply_position_edit(result: &mut RaceResult, input: &str, schedule: &PointsSchedule) -> i64 {
    if let Some(pos) = parse_position(input) {
        result.position = pos;
    }
    result.points = schedule.points_for_input(input);
    result.points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> RaceResult {
        RaceResult {
            position: 5,
            driver_id: "a".to_string(),
            team_id: "x".to_string(),
            laps: 20,
            total_time: "30:00:000".to_string(),
            points: 10,
            fastest_lap: false,
        }
    }

    #[test]
    fn test_default_schedule() {
        let schedule = PointsSchedule::default();
        assert_eq!(schedule.len(), 10);
        assert_eq!(schedule.lookup(1), 25);
        assert_eq!(schedule.lookup(3), 15);
        assert_eq!(schedule.lookup(10), 1);
    }

    #[test]
    fn test_lookup_missing_position_is_zero() {
        let schedule = PointsSchedule::default();
        assert_eq!(schedule.lookup(11), 0);
        assert_eq!(schedule.lookup(0), 0);
        assert_eq!(PointsSchedule::from_points(&[]).lookup(1), 0);
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("3"), Some(3));
        assert_eq!(parse_position(" 12 "), Some(12));
        assert_eq!(parse_position("0"), None);
        assert_eq!(parse_position("-1"), None);
        assert_eq!(parse_position(""), None);
        assert_eq!(parse_position("P1"), None);
        assert_eq!(parse_position("2.5"), None);
    }

    #[test]
    fn test_points_for_invalid_input_is_zero() {
        let schedule = PointsSchedule::default();
        assert_eq!(schedule.points_for_input("1"), 25);
        assert_eq!(schedule.points_for_input("abc"), 0);
        assert_eq!(schedule.points_for_input(""), 0);
    }

    #[test]
    fn test_position_edit_overwrites_points() {
        let schedule = PointsSchedule::default();
        let mut result = sample_result();

        let points = apply_position_edit(&mut result, "2", &schedule);
        assert_eq!(points, 18);
        assert_eq!(result.position, 2);
        assert_eq!(result.points, 18);

        apply_position_edit(&mut result, "15", &schedule);
        assert_eq!(result.position, 15);
        assert_eq!(result.points, 0);
    }

    #[test]
    fn test_invalid_position_edit_keeps_position_zeroes_points() {
        let schedule = PointsSchedule::default();
        let mut result = sample_result();

        apply_position_edit(&mut result, "dnf", &schedule);
        assert_eq!(result.position, 5);
        assert_eq!(result.points, 0);
    }

    #[test]
    fn test_manual_points_survive_without_position_edit() {
        let schedule = PointsSchedule::default();
        let mut result = sample_result();
        apply_position_edit(&mut result, "1", &schedule);
        result.points = 30;
        assert_eq!(result.points, 30);
        assert_eq!(schedule.lookup(result.position), 25);
    }

    #[test]
    fn test_json_string_keys() {
        let json = r#"{"1": 10, "2": 6, "3": 4}"#;
        let schedule: PointsSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.lookup(1), 10);
        assert_eq!(schedule.lookup(3), 4);
        assert_eq!(schedule.lookup(4), 0);

        let out = serde_json::to_value(&schedule).unwrap();
        assert_eq!(out["2"], 6);
    }
}
