use tracing::info;

use crate::model::Race;

/// Rewrite the team on every result ever recorded for `driver_id`.
///
/// There is no notion of "team as of a date": a transfer recolors the
/// driver's whole history, past rounds included. Returns the number of
/// results rewritten.
pub fn reassign_driver_team(races: &mut [Race], driver_id: &str, new_team_id: &str) -> usize {
    let mut rewritten = 0;
    for result in races
        .iter_mut()
        .flat_map(|race| race.sessions.iter_mut())
        .flat_map(|session| session.results.iter_mut())
        .filter(|r| r.driver_id == driver_id)
    {
        result.team_id = new_team_id.to_string();
        rewritten += 1;
    }
    rewritten
}

/// Hook run by a driver update whose team field changed.
/// No-op when the team did not actually change.
pub fn on_driver_team_changed(
    races: &mut [Race],
    driver_id: &str,
    old_team_id: &str,
    new_team_id: &str,
) -> usize {
    if old_team_id == new_team_id {
        return 0;
    }

    let rewritten = reassign_driver_team(races, driver_id, new_team_id);
    info!(
        driver = driver_id,
        from = old_team_id,
        to = new_team_id,
        rewritten,
        "reassigned historical results to new team"
    );
    rewritten
}
