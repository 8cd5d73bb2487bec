use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, warn};

use podium::model::{ChampionshipData, Driver, Race, Team};
use podium::output;
use podium::standings::{
    compute_driver_standings, compute_team_standings, driver_history, leaders, team_roster,
};
use podium::store::{DriverUpdate, EntityStore, JsonFileStore, TeamUpdate};

const EXIT_SUCCESS: i32 = 0;
const EXIT_STORE: i32 = 1;
const EXIT_DEFECTS: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Tsv,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Board {
    Drivers,
    Teams,
    Both,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the championship standings (default if no subcommand)
    Standings {
        /// Show every classified entry instead of the top rows
        #[arg(long)]
        all: bool,
        /// Which championship to show
        #[arg(long, value_enum, default_value_t = Board::Both)]
        board: Board,
    },
    /// List registered drivers
    Drivers,
    /// List registered teams
    Teams,
    /// Show the race calendar in round order
    Races,
    /// Show one race with all session results
    Race { id: String },
    /// Show a driver's profile and race-by-race results
    Driver { id: String },
    /// Show a team's profile and current line-up
    Team { id: String },
    /// Report data integrity problems (dangling ids, duplicate positions)
    Check,
    /// Write a starter config file
    Init {
        /// JSON file to keep championship data in
        #[arg(long)]
        data_file: Option<PathBuf>,
        /// Rows shown in the standings summary
        #[arg(long)]
        top: Option<usize>,
    },
    /// Move a driver to another team; all past results follow the driver
    Transfer { driver: String, team: String },
    /// Set a finishing position; points are re-derived from the schedule
    SetPosition {
        race: String,
        /// Session index as shown by `race <id>`
        session: usize,
        driver: String,
        /// Raw position input; anything but a positive integer scores 0 points
        position: String,
    },
    /// Override the points of one result
    SetPoints {
        race: String,
        session: usize,
        driver: String,
        #[arg(allow_negative_numbers = true)]
        points: i64,
    },
    /// Add a race pre-filled with the current roster
    AddRace {
        /// Round number (defaults to the next free round)
        #[arg(long)]
        round: Option<u32>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        circuit: Option<String>,
        /// Race date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        country: Option<String>,
        /// Add the race without sessions (not run yet)
        #[arg(long)]
        scheduled: bool,
    },
    /// Change a race's details
    EditRace {
        id: String,
        #[arg(long)]
        round: Option<u32>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        circuit: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Append the next numbered session to a race
    AddSession { race: String },
    /// Delete a race with all of its sessions and results
    DeleteRace { id: String },
    /// Register a team
    AddTeam {
        id: String,
        name: String,
        #[arg(long)]
        short_name: Option<String>,
        #[arg(long, default_value = "#888888")]
        color: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change a team's details
    EditTeam {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        short_name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Register a driver
    AddDriver {
        id: String,
        name: String,
        #[arg(long)]
        number: u32,
        #[arg(long)]
        team: String,
        #[arg(long, default_value = "JPN")]
        nationality: String,
        #[arg(long, default_value = "")]
        bio: String,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Change a driver's details (a team change rewrites their history too)
    EditDriver {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        number: Option<u32>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        nationality: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Remove a driver (their results stay on record)
    DeleteDriver { id: String },
    /// Remove a team (drivers and results keep the id)
    DeleteTeam { id: String },
}

#[derive(Parser, Debug)]
#[command(name = "podium")]
#[command(about = "Racing championship standings CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/podium/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Championship data file (overrides the config's data_file)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Output format for standings
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    podium::logging::init_tracing(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Standings {
        all: false,
        board: Board::Both,
    });

    let command = match command {
        Commands::Init { data_file, top } => {
            let code = match run_init(cli.config, data_file, top) {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    EXIT_CONFIG
                }
            };
            std::process::exit(code);
        }
        other => other,
    };

    let config = match podium::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = podium::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_path = match podium::config::resolve_data_path(&config, cli.data) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    debug!(path = %data_path.display(), "using championship data file");

    let store = JsonFileStore::new(data_path);
    let app = App {
        store: &store,
        format: cli.format,
        top: config.top(),
        use_colors: output::should_use_colors(),
    };

    match run(&app, command) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_STORE);
        }
    }
}

struct App<'a> {
    store: &'a JsonFileStore,
    format: Format,
    top: usize,
    use_colors: bool,
}

impl App<'_> {
    /// Load the championship and surface integrity defects as warnings
    fn load(&self) -> Result<ChampionshipData> {
        let data = self.store.load().with_context(|| {
            format!("Failed to load championship from {}", self.store.path().display())
        })?;
        if let Err(defects) = podium::model::validate_references(&data) {
            for defect in defects {
                warn!("{}", defect);
            }
        }
        Ok(data)
    }
}

fn run_init(config: Option<PathBuf>, data_file: Option<PathBuf>, top: Option<usize>) -> Result<()> {
    let path = match config {
        Some(p) => p,
        None => podium::config::get_config_path()?,
    };
    let new_config = podium::config::Config { data_file, top };
    if let Err(errors) = podium::config::validate_config(&new_config) {
        anyhow::bail!("{}", errors.join("; "));
    }
    podium::config::write_config(&path, &new_config)?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

fn run(app: &App, command: Commands) -> Result<i32> {
    let store = app.store;
    match command {
        Commands::Standings { all, board } => {
            let data = app.load()?;
            print_standings(app, &data, all, board);
        }
        Commands::Drivers => {
            let data = app.load()?;
            println!(
                "{}",
                output::format_driver_list(&data.drivers, &data.teams, app.use_colors)
            );
        }
        Commands::Teams => {
            let data = app.load()?;
            println!("{}", output::format_team_list(&data.teams, app.use_colors));
        }
        Commands::Races => {
            let data = app.load()?;
            println!(
                "{}",
                output::format_race_calendar(&data.races_by_round(), app.use_colors)
            );
        }
        Commands::Race { id } => {
            let data = app.load()?;
            let race = data
                .race(&id)
                .with_context(|| format!("race '{}' not found", id))?;
            println!("{}", output::format_race_detail(race, &data, app.use_colors));
        }
        Commands::Driver { id } => {
            let data = app.load()?;
            let driver = data
                .driver(&id)
                .with_context(|| format!("driver '{}' not found", id))?;
            let standings = compute_driver_standings(&data.drivers, &data.teams, &data.races);
            let standing = standings
                .iter()
                .enumerate()
                .find(|(_, s)| s.driver.id == id);
            let history = driver_history(&id, &data.races);
            println!(
                "{}",
                output::format_driver_detail(
                    driver,
                    data.team(&driver.team_id),
                    standing,
                    &history,
                    app.use_colors
                )
            );
        }
        Commands::Team { id } => {
            let data = app.load()?;
            let team = data
                .team(&id)
                .with_context(|| format!("team '{}' not found", id))?;
            let driver_standings =
                compute_driver_standings(&data.drivers, &data.teams, &data.races);
            let team_standings = compute_team_standings(&data.teams, &data.races);
            let standing = team_standings
                .iter()
                .enumerate()
                .find(|(_, s)| s.team_id == id);
            let roster = team_roster(&id, &data.drivers, &driver_standings);
            println!(
                "{}",
                output::format_team_detail(team, standing, &roster, app.use_colors)
            );
        }
        Commands::Check => {
            let data = store.load()?;
            match podium::model::validate_references(&data) {
                Ok(()) => println!("No problems found."),
                Err(defects) => {
                    println!("{} problem(s) found:", defects.len());
                    for defect in defects {
                        println!("  - {}", defect);
                    }
                    return Ok(EXIT_DEFECTS);
                }
            }
        }
        Commands::Init { .. } => anyhow::bail!("init does not open the championship data"),
        Commands::Transfer { driver, team } => {
            let update = DriverUpdate {
                team_id: Some(team),
                ..Default::default()
            };
            let updated = store.update_driver(&driver, update)?;
            println!("{} now drives for {}", updated.name, updated.team_id);
        }
        Commands::SetPosition {
            race,
            session,
            driver,
            position,
        } => {
            let result = store.set_result_position(&race, session, &driver, &position)?;
            println!(
                "{}: P{} ({} pts)",
                result.driver_id, result.position, result.points
            );
        }
        Commands::SetPoints {
            race,
            session,
            driver,
            points,
        } => {
            let result = store.set_result_points(&race, session, &driver, points)?;
            println!(
                "{}: P{} ({} pts)",
                result.driver_id, result.position, result.points
            );
        }
        Commands::AddRace {
            round,
            name,
            circuit,
            date,
            country,
            scheduled,
        } => {
            let data = store.load()?;
            let round = round.unwrap_or_else(|| data.next_round());
            let today = chrono::Local::now().date_naive();
            let mut race = Race::template(round, &data.drivers, today);
            // Let the store pick a free id from the round
            race.id = String::new();
            if let Some(name) = name {
                race.name = name;
            }
            if let Some(circuit) = circuit {
                race.circuit = circuit;
            }
            if let Some(date) = date {
                race.date = date;
            }
            if let Some(country) = country {
                race.country = country;
            }
            if scheduled {
                race.sessions.clear();
            }
            let created = store.create_race(race)?;
            println!("Added {} (Rd.{} {})", created.id, created.round, created.name);
        }
        Commands::EditRace {
            id,
            round,
            name,
            circuit,
            date,
            country,
        } => {
            let mut race = store.get_race(&id)?;
            if let Some(round) = round {
                race.round = round;
            }
            if let Some(name) = name {
                race.name = name;
            }
            if let Some(circuit) = circuit {
                race.circuit = circuit;
            }
            if let Some(date) = date {
                race.date = date;
            }
            if let Some(country) = country {
                race.country = country;
            }
            let updated = store.update_race(&id, race)?;
            println!("Updated {} (Rd.{} {})", updated.id, updated.round, updated.name);
        }
        Commands::AddSession { race } => {
            let updated = store.add_session(&race)?;
            if let Some(session) = updated.sessions.last() {
                println!(
                    "Added session [{}] {} to {}",
                    updated.sessions.len() - 1,
                    session.name,
                    updated.id
                );
            }
        }
        Commands::DeleteRace { id } => {
            store.delete_race(&id)?;
            println!("Deleted race {}", id);
        }
        Commands::AddTeam {
            id,
            name,
            short_name,
            color,
            description,
        } => {
            let short_name = short_name.unwrap_or_else(|| name.clone());
            let team = store.create_team(Team {
                id,
                name,
                short_name,
                color,
                description,
            })?;
            println!("Added team {} ({})", team.name, team.id);
        }
        Commands::EditTeam {
            id,
            name,
            short_name,
            color,
            description,
        } => {
            let team = store.update_team(
                &id,
                TeamUpdate {
                    name,
                    short_name,
                    color,
                    description,
                },
            )?;
            println!("Updated team {} ({})", team.name, team.id);
        }
        Commands::AddDriver {
            id,
            name,
            number,
            team,
            nationality,
            bio,
            photo_url,
        } => {
            let driver = store.create_driver(Driver {
                id,
                name,
                number,
                team_id: team,
                nationality,
                bio,
                photo_url,
            })?;
            println!("Added driver #{} {} ({})", driver.number, driver.name, driver.id);
        }
        Commands::EditDriver {
            id,
            name,
            number,
            team,
            nationality,
            bio,
            photo_url,
        } => {
            let update = DriverUpdate {
                name,
                number,
                team_id: team,
                nationality,
                bio,
                photo_url: photo_url.map(|url| if url.is_empty() { None } else { Some(url) }),
            };
            let driver = store.update_driver(&id, update)?;
            println!("Updated driver #{} {} ({})", driver.number, driver.name, driver.id);
        }
        Commands::DeleteDriver { id } => {
            store.delete_driver(&id)?;
            println!("Deleted driver {}", id);
        }
        Commands::DeleteTeam { id } => {
            store.delete_team(&id)?;
            println!("Deleted team {}", id);
        }
    }

    Ok(EXIT_SUCCESS)
}

fn print_standings(app: &App, data: &ChampionshipData, all: bool, board: Board) {
    let drivers = compute_driver_standings(&data.drivers, &data.teams, &data.races);
    let teams = compute_team_standings(&data.teams, &data.races);
    let (drivers, teams) = if all {
        (&drivers[..], &teams[..])
    } else {
        (leaders(&drivers, app.top), leaders(&teams, app.top))
    };

    let show_drivers = board != Board::Teams;
    let show_teams = board != Board::Drivers;

    match app.format {
        Format::Tsv => {
            if show_drivers {
                println!("{}", output::format_driver_standings_tsv(drivers));
            }
            if show_drivers && show_teams {
                println!();
            }
            if show_teams {
                println!("{}", output::format_team_standings_tsv(teams));
            }
        }
        Format::Table => {
            if show_drivers {
                println!("Drivers' championship");
                println!(
                    "{}",
                    output::format_driver_standings(drivers, app.use_colors)
                );
            }
            if show_drivers && show_teams {
                println!();
            }
            if show_teams {
                println!("Constructors' championship");
                println!(
                    "{}",
                    output::format_team_standings(teams, &data.drivers, app.use_colors)
                );
            }
        }
    }
}
