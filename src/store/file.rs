use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EntityStore, StoreError};
use crate::model::{ChampionshipData, Driver, Race, Team};
use crate::points::PointsSchedule;

const STORE_VERSION: u32 = 1;

/// On-disk layout: the championship snapshot plus a format version
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    version: u32,
    #[serde(default)]
    drivers: Vec<Driver>,
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    races: Vec<Race>,
    #[serde(default)]
    points_system: PointsSchedule,
}

impl From<StoreFile> for ChampionshipData {
    fn from(stored: StoreFile) -> Self {
        Self {
            drivers: stored.drivers,
            teams: stored.teams,
            races: stored.races,
            points_system: stored.points_system,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreFileRef<'a> {
    version: u32,
    drivers: &'a [Driver],
    teams: &'a [Team],
    races: &'a [Race],
    points_system: &'a PointsSchedule,
}

/// Championship data kept in a single JSON file.
///
/// Every commit rewrites the whole file through `atomic-write-file`, so a
/// crash mid-write leaves the previous version intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl EntityStore for JsonFileStore {
    /// A missing file is an empty championship with the default schedule
    fn load(&self) -> Result<ChampionshipData, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no championship file yet, starting empty");
            return Ok(ChampionshipData::default());
        }

        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let stored: StoreFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if stored.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion(stored.version));
        }

        debug!(
            path = %self.path.display(),
            drivers = stored.drivers.len(),
            teams = stored.teams.len(),
            races = stored.races.len(),
            "loaded championship"
        );
        Ok(stored.into())
    }

    fn commit(&self, data: &ChampionshipData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let mut file = AtomicWriteFile::open(&self.path).map_err(|e| self.io_error(e))?;

        let stored = StoreFileRef {
            version: STORE_VERSION,
            drivers: &data.drivers,
            teams: &data.teams,
            races: &data.races,
            points_system: &data.points_system,
        };
        serde_json::to_writer_pretty(&mut file, &stored).map_err(|e| self.io_error(e.into()))?;

        file.commit().map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), "committed championship");
        Ok(())
    }
}
