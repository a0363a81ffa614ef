use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Race, Team};
use crate::registration::Registration;

/// Race counters move quickly while registration is open, so snapshots go
/// stale after 15 minutes.
const CACHE_STALE_MINUTES: i64 = 15;

const RACE_PREFIX: &str = "race_";
const REGISTRATIONS_PREFIX: &str = "registrations_";

/// Interval between attempts to take a held race lease
const LEASE_RETRY: Duration = Duration::from_millis(50);

/// A race and the teams that could register for it, as fetched together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub race: Race,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl RaceSnapshot {
    pub fn team(&self, team_id: i64) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            // Negative ages come from clock skew
            m if m < 1 => "just now".to_string(),
            m if m < 60 => format!("{}m ago", m),
            m if m < 1440 => format!("{}h ago", m / 60),
            m => format!("{}d ago", m / 1440),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Exclusive hold on one race's registrations across processes.
///
/// The lease is a lock file created with `create_new`; dropping the lease
/// removes it. A lock file left behind by a crashed process has to be
/// deleted by hand.
#[derive(Debug)]
pub struct RaceLease {
    path: PathBuf,
}

impl RaceLease {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for RaceLease {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to release race lease");
        }
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache dir: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;
        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        debug!(name, age = %cached.age_display(), "Loaded cache file");
        Ok(Some(cached))
    }

    /// Write through a temp file and rename, so readers never see a
    /// partially written file.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        let path = self.cache_path(name);
        let tmp = self
            .cache_dir
            .join(format!(".{}.json.tmp.{}", name, std::process::id()));

        let mut file = std::fs::File::create(&tmp)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        file.write_all(contents.as_bytes())
            .and_then(|_| file.sync_all())
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace cache file: {}", name))?;
        Ok(())
    }

    // ===== Leases =====

    /// Take the registration lease of a race, waiting up to `timeout` for
    /// another process to release it.
    pub fn acquire_race_lease(&self, race_id: i64, timeout: Duration) -> Result<RaceLease> {
        let path = self
            .cache_dir
            .join(format!("{}{}.lock", REGISTRATIONS_PREFIX, race_id));
        let started = Instant::now();
        loop {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    // Owner pid, for whoever has to clear a stale lease
                    let _ = writeln!(file, "{}", std::process::id());
                    debug!(race_id, "Acquired race lease");
                    return Ok(RaceLease { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if started.elapsed() >= timeout {
                        bail!(
                            "Race {} is locked by another raidcache process (remove {} if none is running)",
                            race_id,
                            path.display()
                        );
                    }
                    std::thread::sleep(LEASE_RETRY);
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create lease: {}", path.display()))
                }
            }
        }
    }

    // ===== Race snapshots =====

    pub fn load_race_snapshot(&self, race_id: i64) -> Result<Option<CachedData<RaceSnapshot>>> {
        self.load(&format!("{}{}", RACE_PREFIX, race_id))
    }

    pub fn save_race_snapshot(&self, snapshot: &RaceSnapshot) -> Result<()> {
        self.save(&format!("{}{}", RACE_PREFIX, snapshot.race.id), snapshot)
    }

    /// Ids of every race with a cached snapshot, ascending.
    pub fn cached_race_ids(&self) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let name = entry?.file_name();
            let id = name
                .to_str()
                .and_then(|n| n.strip_prefix(RACE_PREFIX))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<i64>().ok());
            if let Some(id) = id {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    // ===== Registrations =====

    pub fn load_registrations(&self, race_id: i64) -> Result<Vec<Registration>> {
        Ok(self
            .load::<Vec<Registration>>(&format!("{}{}", REGISTRATIONS_PREFIX, race_id))?
            .map(|cached| cached.data)
            .unwrap_or_default())
    }

    pub fn save_registrations(&self, race_id: i64, registrations: &[Registration]) -> Result<()> {
        self.save(&format!("{}{}", REGISTRATIONS_PREFIX, race_id), &registrations)
    }

    /// Remove every cached snapshot and registration file. Leases and logs
    /// are left alone.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

// ============================================================================
// Tests
// ============================================================================
