use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::model::{ChampionshipData, Driver, Race, Team};
use crate::standings::{DriverStanding, RaceEntry, TeamStanding};

const UNKNOWN: &str = "Unknown";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Width left for a free-text column once `fixed` columns are laid out.
/// None means "don't truncate" (output is piped).
fn free_width(fixed: usize) -> Option<usize> {
    get_terminal_width().map(|width| {
        if width > fixed + 10 {
            width - fixed
        } else {
            20
        }
    })
}

fn fit(name: &str, width: Option<usize>) -> String {
    match width {
        Some(w) => truncate_name(name, w),
        None => name.to_string(),
    }
}

/// Parse a "#rrggbb" (or "#rgb") team color
fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

/// Team short name, painted in the team color when possible
fn team_label(team: Option<&Team>, width: usize, use_colors: bool) -> String {
    let name = team.map_or(UNKNOWN, |t| t.short_name.as_str());
    let padded = format!("{:<width$}", name, width = width);
    if !use_colors {
        return padded;
    }
    match team.and_then(|t| parse_hex_color(&t.color)) {
        Some((r, g, b)) => padded.truecolor(r, g, b).to_string(),
        None => padded.dimmed().to_string(),
    }
}

fn index_label(idx: usize) -> String {
    format!("{:>2}.", idx + 1)
}

/// Drivers' championship table
/// Columns: position, car number, name, team, points, wins, podiums
pub fn format_driver_standings(standings: &[DriverStanding], use_colors: bool) -> String {
    if standings.is_empty() {
        return "No results recorded yet.".to_string();
    }

    let name_width = free_width(4 + 5 + 8 + 7 + 5 + 5 + 6);

    let header = format!(
        "{:>3} {:>4}  {:<24}{:<8}{:>6}{:>5}{:>5}",
        "POS", "NO.", "DRIVER", "TEAM", "PTS", "W", "POD"
    );
    let header = if use_colors { header.bold().to_string() } else { header };

    let rows = standings.iter().enumerate().map(|(idx, s)| {
        let name = fit(&s.driver.name, name_width);
        let name_padded = format!("{:<24}", name);
        let points = format!("{:>6}", s.points);
        let team = team_label(Some(s.team), 8, use_colors);
        if use_colors {
            format!(
                "{} {:>4}  {}{}{}{:>5}{:>5}",
                index_label(idx).dimmed(),
                format!("#{}", s.driver.number),
                name_padded,
                team,
                points.bold(),
                s.wins,
                s.podiums
            )
        } else {
            format!(
                "{} {:>4}  {}{}{}{:>5}{:>5}",
                index_label(idx),
                format!("#{}", s.driver.number),
                name_padded,
                team,
                points,
                s.wins,
                s.podiums
            )
        }
    });

    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Constructors' championship table
/// Columns: position, team, points, wins, driver names
pub fn format_team_standings(
    standings: &[TeamStanding],
    drivers: &[Driver],
    use_colors: bool,
) -> String {
    if standings.is_empty() {
        return "No results recorded yet.".to_string();
    }

    let header = format!("{:>3} {:<10}{:>6}{:>5}  {}", "POS", "TEAM", "PTS", "W", "DRIVERS");
    let header = if use_colors { header.bold().to_string() } else { header };

    let names_width = free_width(4 + 10 + 6 + 5 + 2);

    let rows = standings.iter().enumerate().map(|(idx, s)| {
        let names = driver_names(&s.drivers, drivers);
        let names = fit(&names, names_width);
        let points = format!("{:>6}", s.points);
        let team = team_label(s.team, 10, use_colors);
        if use_colors {
            format!(
                "{} {}{}{:>5}  {}",
                index_label(idx).dimmed(),
                team,
                points.bold(),
                s.wins,
                names
            )
        } else {
            format!("{} {}{}{:>5}  {}", index_label(idx), team, points, s.wins, names)
        }
    });

    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-separated names for driver ids; ids without a driver record are skipped
fn driver_names(ids: &[&str], drivers: &[Driver]) -> String {
    ids.iter()
        .filter_map(|id| drivers.iter().find(|d| d.id == *id))
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Race calendar in round order
pub fn format_race_calendar(races: &[&Race], use_colors: bool) -> String {
    if races.is_empty() {
        return "No races on the calendar.".to_string();
    }

    races
        .iter()
        .map(|race| {
            let status = if race.is_scheduled() {
                "scheduled".to_string()
            } else {
                let n = race.sessions.len();
                format!("{} session{}", n, if n > 1 { "s" } else { "" })
            };
            let round = format!("Rd.{:<3}", race.round);
            if use_colors {
                format!(
                    "{} {}  {} | {} | {} | {}",
                    round.bold(),
                    race.date,
                    race.name.bold(),
                    race.circuit.cyan(),
                    race.country,
                    status.dimmed()
                )
            } else {
                format!(
                    "{} {}  {} | {} | {} | {}",
                    round, race.date, race.name, race.circuit, race.country, status
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One race with every session's classification
pub fn format_race_detail(race: &Race, data: &ChampionshipData, use_colors: bool) -> String {
    let mut out = Vec::new();
    let title = format!("Rd.{} {}", race.round, race.name);
    out.push(if use_colors { title.bold().to_string() } else { title });
    out.push(format!("  Circuit: {}", race.circuit));
    out.push(format!("  Date: {}", race.date));
    out.push(format!("  Country: {}", race.country));

    if race.is_scheduled() {
        out.push("  Not run yet.".to_string());
        return out.join("\n");
    }

    for (s_idx, session) in race.sessions.iter().enumerate() {
        out.push(String::new());
        let heading = format!("[{}] {}", s_idx, session.name);
        out.push(if use_colors { heading.bold().to_string() } else { heading });

        for result in session.sorted_results() {
            let driver = data
                .driver(&result.driver_id)
                .map_or(UNKNOWN, |d| d.name.as_str());
            let team = team_label(data.team(&result.team_id), 8, use_colors);
            let fastest = if result.fastest_lap {
                if use_colors {
                    " FL".magenta().to_string()
                } else {
                    " FL".to_string()
                }
            } else {
                String::new()
            };
            out.push(format!(
                "  P{:<3} {:<24}{}{:>4} laps  {:>10}{:>5} pts{}",
                result.position, driver, team, result.laps, result.total_time, result.points, fastest
            ));
        }
    }

    out.join("\n")
}

/// One line per driver: number, name, team, nationality
pub fn format_driver_list(drivers: &[Driver], teams: &[Team], use_colors: bool) -> String {
    if drivers.is_empty() {
        return "No drivers registered.".to_string();
    }

    drivers
        .iter()
        .map(|d| {
            let team = team_label(teams.iter().find(|t| t.id == d.team_id), 8, use_colors);
            format!("{:>4}  {:<24}{}{}  ({})", format!("#{}", d.number), d.name, team, d.nationality, d.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per team: short name, full name, id
pub fn format_team_list(teams: &[Team], use_colors: bool) -> String {
    if teams.is_empty() {
        return "No teams registered.".to_string();
    }

    teams
        .iter()
        .map(|t| format!("{}{}  ({})", team_label(Some(t), 10, use_colors), t.name, t.id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Driver profile with championship stats and per-race results
pub fn format_driver_detail(
    driver: &Driver,
    team: Option<&Team>,
    standing: Option<(usize, &DriverStanding)>,
    history: &[RaceEntry],
    use_colors: bool,
) -> String {
    let mut out = Vec::new();
    let title = format!("#{} {}", driver.number, driver.name);
    out.push(if use_colors { title.bold().to_string() } else { title });
    out.push(format!("  Team: {}", team.map_or(UNKNOWN, |t| t.name.as_str())));
    out.push(format!("  Nationality: {}", driver.nationality));
    if !driver.bio.is_empty() {
        out.push(format!("  Bio: {}", driver.bio));
    }

    match standing {
        Some((idx, s)) => out.push(format!(
            "  Championship: P{} with {} pts, {} wins, {} podiums",
            idx + 1,
            s.points,
            s.wins,
            s.podiums
        )),
        None => out.push("  Championship: not classified".to_string()),
    }

    for entry in history {
        out.push(String::new());
        let heading = format!("Rd.{} {}", entry.race.round, entry.race.name);
        out.push(if use_colors { heading.bold().to_string() } else { heading });
        for (session, result) in &entry.results {
            out.push(format!(
                "  {:<10} P{:<3}{:>5} pts{}",
                session,
                result.position,
                result.points,
                if result.fastest_lap { "  FL" } else { "" }
            ));
        }
    }

    out.join("\n")
}

/// Team profile with constructors' stats and current line-up
pub fn format_team_detail(
    team: &Team,
    standing: Option<(usize, &TeamStanding)>,
    roster: &[(&Driver, Option<&DriverStanding>)],
    use_colors: bool,
) -> String {
    let mut out = Vec::new();
    out.push(if use_colors {
        team.name.bold().to_string()
    } else {
        team.name.clone()
    });
    out.push(format!("  Short name: {}", team.short_name));
    if !team.description.is_empty() {
        out.push(format!("  {}", team.description));
    }

    match standing {
        Some((idx, s)) => out.push(format!(
            "  Championship: P{} with {} pts, {} wins",
            idx + 1,
            s.points,
            s.wins
        )),
        None => out.push("  Championship: not classified".to_string()),
    }

    out.push(String::new());
    out.push("  Drivers:".to_string());
    if roster.is_empty() {
        out.push("    (none)".to_string());
    }
    for (driver, standing) in roster {
        let stats = standing.map_or_else(
            || "no points yet".to_string(),
            |s| format!("{} pts, {} wins", s.points, s.wins),
        );
        out.push(format!("    #{:<4}{:<24}{}", driver.number, driver.name, stats));
    }

    out.join("\n")
}

/// Keep free text on one TSV cell: tabs and line breaks become spaces
fn tsv_field(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

/// Driver standings as tab-separated values for scripting
/// Columns: position, driver id, name, team id, points, wins, podiums (no headers, no colors)
pub fn format_driver_standings_tsv(standings: &[DriverStanding]) -> String {
    standings
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                idx + 1,
                tsv_field(&s.driver.id),
                tsv_field(&s.driver.name),
                tsv_field(&s.team.id),
                s.points,
                s.wins,
                s.podiums
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Team standings as tab-separated values for scripting
/// Columns: position, team id, name, points, wins, driver ids (comma-joined)
pub fn format_team_standings_tsv(standings: &[TeamStanding]) -> String {
    standings
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                idx + 1,
                tsv_field(s.team_id),
                tsv_field(s.team.map_or(UNKNOWN, |t| t.name.as_str())),
                s.points,
                s.wins,
                tsv_field(&s.drivers.join(","))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
