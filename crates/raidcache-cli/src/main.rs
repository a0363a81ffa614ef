//! Raidcache CLI - team eligibility checks and registration for orienteering raids.
//!
//! Race snapshots (a race with its candidate teams) are loaded from JSON,
//! checked, and kept in the local cache so that registrations can be
//! committed against them later. Snapshot counters always come from
//! upstream; registrations committed here are stored apart and added on top.

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use raidcache_core::cache::{CacheManager, RaceSnapshot};
use raidcache_core::config::Config;
use raidcache_core::utils::{fit_column, format_price};
use raidcache_core::{
    select_team, validate_teams, Race, Registration, RegistrationError, RegistrationLedger, Team,
    TeamVerdict,
};

// ============================================================================
// Constants
// ============================================================================

/// Log file written in the cache directory
const LOG_FILE: &str = "raidcache.log";

/// Width of the team name column
const TEAM_COLUMN_WIDTH: usize = 24;

/// How long a command waits for another process holding a race's lease
const LEASE_TIMEOUT: Duration = Duration::from_secs(10);

const USAGE: &str = "\
Usage:
  raidcache check <snapshot.json>          Check every team of a race snapshot and cache it
  raidcache show [race-id]                 Check the teams of a cached race
  raidcache races                          List cached races
  raidcache register <race-id> <team-id>   Register an eligible team
  raidcache withdraw <race-id> <team-id>   Withdraw a registered team
  raidcache pay <race-id> <team-id>        Confirm a team's payment
  raidcache registrations <race-id>        List registrations of a race
  raidcache clear                          Remove cached snapshots and registrations";

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr and to a file in the cache directory.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let cache = CacheManager::new(config.cache_dir()?)?;
    let _guard = init_tracing(cache.cache_dir());
    let mut app = App::new(config, cache);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str);

    match command {
        Some("check") => {
            let path = args.get(1).context("Missing snapshot path")?;
            check(&mut app, Path::new(path)).await
        }
        Some("show") => {
            let race_id = match args.get(1) {
                Some(id) => parse_id(id)?,
                None => app
                    .config
                    .last_race_id
                    .context("No race checked yet; pass a race id")?,
            };
            show(&app, race_id).await
        }
        Some("races") => list_races(&app),
        Some("register") => {
            let (race_id, team_id) = race_and_team(&args)?;
            register(&app, race_id, team_id).await
        }
        Some("withdraw") => {
            let (race_id, team_id) = race_and_team(&args)?;
            let registration = app.withdraw(race_id, team_id).await?;
            println!("Withdrew {}", registration.team_name);
            Ok(())
        }
        Some("pay") => {
            let (race_id, team_id) = race_and_team(&args)?;
            let registration = app.confirm_payment(race_id, team_id).await?;
            println!("Payment confirmed for {}", registration.team_name);
            Ok(())
        }
        Some("registrations") => {
            let race_id = parse_id(args.get(1).context("Missing race id")?)?;
            list_registrations(&app, race_id)
        }
        Some("clear") => {
            let removed = app.cache.clear()?;
            println!("Removed {} cache files from {}", removed, app.cache.cache_dir().display());
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            Ok(())
        }
    }
}

fn parse_id(value: &str) -> Result<i64> {
    value
        .parse()
        .with_context(|| format!("Invalid id: {}", value))
}

fn race_and_team(args: &[String]) -> Result<(i64, i64)> {
    let race_id = parse_id(args.get(1).context("Missing race id")?)?;
    let team_id = parse_id(args.get(2).context("Missing team id")?)?;
    Ok((race_id, team_id))
}

// ============================================================================
// Application state
// ============================================================================

struct App {
    config: Config,
    cache: CacheManager,
    lease_timeout: Duration,
}

impl App {
    fn new(config: Config, cache: CacheManager) -> Self {
        Self {
            config,
            cache,
            lease_timeout: LEASE_TIMEOUT,
        }
    }

    /// Read a snapshot file, lint its race and cache it as the new upstream
    /// baseline. Local registrations are kept.
    fn import_snapshot(&self, path: &Path) -> Result<RaceSnapshot> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot: RaceSnapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

        lint_race(&self.config, &snapshot.race)?;
        self.cache.save_race_snapshot(&snapshot)?;
        info!(race_id = snapshot.race.id, teams = snapshot.teams.len(), "Cached race snapshot");
        Ok(snapshot)
    }

    fn load_cached(&self, race_id: i64) -> Result<RaceSnapshot> {
        let cached = self
            .cache
            .load_race_snapshot(race_id)?
            .with_context(|| format!("Race {} is not cached; run `raidcache check` first", race_id))?;
        if cached.is_stale() {
            warn!(race_id, age = %cached.age_display(), "Race snapshot is stale, counters may be outdated");
        }
        Ok(cached.data)
    }

    async fn restore_ledger(&self, race: &Race) -> Result<RegistrationLedger> {
        let ledger = RegistrationLedger::new();
        ledger
            .restore(race.clone(), self.cache.load_registrations(race.id)?)
            .await;
        Ok(ledger)
    }

    /// The race with local registrations added to the upstream counters
    async fn live_race(&self, race: &Race) -> Result<Race> {
        let ledger = self.restore_ledger(race).await?;
        ledger
            .race(race.id)
            .await
            .with_context(|| format!("Race {} missing from restored ledger", race.id))
    }

    async fn persist_registrations(&self, ledger: &RegistrationLedger, race_id: i64) -> Result<()> {
        self.cache
            .save_registrations(race_id, &ledger.registrations(race_id).await)
    }

    /// Check a team against the cached snapshot, then commit it through the
    /// ledger while holding the race lease.
    async fn register(&self, race_id: i64, team_id: i64) -> Result<Registration> {
        let _lease = self.cache.acquire_race_lease(race_id, self.lease_timeout)?;
        let snapshot = self.load_cached(race_id)?;
        lint_race(&self.config, &snapshot.race)?;

        if snapshot.team(team_id).is_none() {
            bail!("Team {} is not in the snapshot of race {}", team_id, race_id);
        }

        let teams = teams_on_race_day(&snapshot.race, &snapshot.teams);
        let verdicts = validate_teams(&teams, &snapshot.race);
        let Some(verdict) = select_team(&verdicts, team_id) else {
            let errors = verdicts
                .iter()
                .find(|v| v.team_id == team_id)
                .map(|v| v.result.errors.join("; "))
                .unwrap_or_default();
            bail!("Team {} is not eligible for race {}: {}", team_id, race_id, errors);
        };
        let team = teams
            .iter()
            .find(|t| t.id == verdict.team_id)
            .context("Selected team missing from snapshot")?;

        let ledger = self.restore_ledger(&snapshot.race).await?;
        let registration = ledger.register(race_id, team).await?;
        self.persist_registrations(&ledger, race_id).await?;
        Ok(registration)
    }

    async fn withdraw(&self, race_id: i64, team_id: i64) -> Result<Registration> {
        let _lease = self.cache.acquire_race_lease(race_id, self.lease_timeout)?;
        let snapshot = self.load_cached(race_id)?;
        let ledger = self.restore_ledger(&snapshot.race).await?;
        let registration = ledger.withdraw(race_id, team_id).await?;
        self.persist_registrations(&ledger, race_id).await?;
        Ok(registration)
    }

    async fn confirm_payment(&self, race_id: i64, team_id: i64) -> Result<Registration> {
        let _lease = self.cache.acquire_race_lease(race_id, self.lease_timeout)?;
        let snapshot = self.load_cached(race_id)?;
        let ledger = self.restore_ledger(&snapshot.race).await?;
        let registration = ledger.confirm_payment(race_id, team_id).await?;
        self.persist_registrations(&ledger, race_id).await?;
        Ok(registration)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Load a snapshot file, cache it and check its teams
async fn check(app: &mut App, path: &Path) -> Result<()> {
    let snapshot = app.import_snapshot(path)?;
    let live = app.live_race(&snapshot.race).await?;
    print_verdicts(&live, &snapshot.teams);

    app.config.last_race_id = Some(snapshot.race.id);
    app.config.save()
}

async fn show(app: &App, race_id: i64) -> Result<()> {
    let cached = app.load_cached(race_id)?;
    lint_race(&app.config, &cached.race)?;
    let live = app.live_race(&cached.race).await?;
    print_verdicts(&live, &cached.teams);
    Ok(())
}

async fn register(app: &App, race_id: i64, team_id: i64) -> Result<()> {
    let registration = match app.register(race_id, team_id).await {
        Ok(registration) => registration,
        Err(e) => {
            if e.downcast_ref::<RegistrationError>().is_some_and(RegistrationError::is_conflict) {
                eprintln!("The race changed since it was checked; refresh it with `raidcache check`.");
            }
            return Err(e);
        }
    };

    match registration.amount_due_cents {
        Some(cents) => println!("Registered {} (amount due: {})", registration.team_name, format_price(cents)),
        None => println!("Registered {}", registration.team_name),
    }
    Ok(())
}

fn list_races(app: &App) -> Result<()> {
    let race_ids = app.cache.cached_race_ids()?;
    if race_ids.is_empty() {
        println!("No cached races");
        return Ok(());
    }

    for race_id in race_ids {
        let Some(cached) = app.cache.load_race_snapshot(race_id)? else {
            continue;
        };
        let registered = app.cache.load_registrations(race_id)?.len();
        let race = &cached.data.race;
        println!(
            "{:>6}  {}  {:<11}  {:>3} teams  {:>3} registered here  cached {}",
            race.id,
            fit_column(&race.name, TEAM_COLUMN_WIDTH),
            race.type_label(),
            cached.data.teams.len(),
            registered,
            cached.age_display()
        );
    }
    Ok(())
}

fn list_registrations(app: &App, race_id: i64) -> Result<()> {
    let registrations = app.cache.load_registrations(race_id)?;
    if registrations.is_empty() {
        println!("No registrations for race {}", race_id);
        return Ok(());
    }

    for r in &registrations {
        let amount = r.amount_due_cents.map(format_price).unwrap_or_else(|| "-".to_string());
        let paid = if r.payment_confirmed { "paid" } else { "unpaid" };
        println!(
            "{:>6}  {}  {:>2} runners  {:>10}  {}  {}",
            r.team_id,
            fit_column(&r.team_name, TEAM_COLUMN_WIDTH),
            r.participants,
            amount,
            paid,
            r.registered_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Report threshold problems; strict mode refuses the race.
fn lint_race(config: &Config, race: &Race) -> Result<()> {
    let lints = race.lint();
    for lint in &lints {
        warn!(race_id = race.id, "{}", lint);
    }
    if config.strict_leisure_thresholds && !lints.is_empty() {
        bail!("Race {} has invalid leisure age thresholds: {}", race.id, lints[0]);
    }
    Ok(())
}

/// Teams with ages computed on the race date when birth dates are known
fn teams_on_race_day(race: &Race, teams: &[Team]) -> Vec<Team> {
    let race_day = race.date.unwrap_or_else(|| Utc::now().date_naive());
    teams.iter().map(|t| t.with_ages_on(race_day)).collect()
}

fn print_verdicts(race: &Race, teams: &[Team]) {
    let c = &race.constraints;
    println!(
        "Race {} - {} ({}): {}/{} teams, {}/{} runners, {}-{} per team",
        race.id,
        race.name,
        race.type_label(),
        c.current_teams_count,
        c.max_teams,
        c.current_participants_count,
        c.max_participants,
        c.min_runners_per_team,
        c.max_runners_per_team
    );
    if race.is_competitive() {
        let categories: Vec<String> = race
            .accepted_categories
            .iter()
            .map(|category| format!("{} ({})", category.name, category.range_display()))
            .collect();
        println!("Categories: {}", categories.join(", "));
    }

    let teams = teams_on_race_day(race, teams);
    let race_day = race.date.unwrap_or_else(|| Utc::now().date_naive());
    for (team, verdict) in teams.iter().zip(validate_teams(&teams, race)) {
        let price = race.pricing.map(|p| format_price(p.team_price_cents(team, race_day)));
        print_verdict(team, &verdict, price);
    }
}

fn print_verdict(team: &Team, verdict: &TeamVerdict, price: Option<String>) {
    println!(
        "{:>6}  {}  {:<10}  {:>10}  {}",
        verdict.team_id,
        fit_column(&verdict.team_name, TEAM_COLUMN_WIDTH),
        team.display_member_count(),
        price.unwrap_or_default(),
        verdict.status_label()
    );
    for member in &team.members {
        println!("          {} ({})", member.display_name(), member.age_str());
    }
    for error in &verdict.result.errors {
        println!("        - {}", error);
    }
    for warning in &verdict.result.warnings {
        println!("        ! {}", warning);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use raidcache_core::{LeisureThresholds, Member, RaceConstraints};
    use tempfile::TempDir;

    fn race(max_teams: u32, current_teams: u32) -> Race {
        Race {
            id: 4,
            name: "Raid des Crêtes".to_string(),
            date: None,
            constraints: RaceConstraints {
                min_runners_per_team: 2,
                max_runners_per_team: 3,
                max_teams,
                max_participants: 100,
                current_teams_count: current_teams,
                current_participants_count: current_teams * 2,
                is_competitive: false,
            },
            accepted_categories: Vec::new(),
            leisure: LeisureThresholds::default(),
            pricing: None,
        }
    }

    fn team(id: i64, size: usize) -> Team {
        let members = (0..size)
            .map(|i| Member::new(format!("R{}", i), format!("T{}", id), Some(30)))
            .collect();
        Team::new(id, format!("Team {}", id), members)
    }

    /// A workspace with a cache dir and an upstream snapshot file for race 4
    fn setup(upstream: Race) -> (TempDir, App, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().join("cache")).unwrap();
        let snapshot = RaceSnapshot {
            race: upstream,
            teams: vec![team(1, 2), team(2, 2), team(3, 1)],
        };
        let snapshot_path = dir.path().join("snapshot.json");
        std::fs::write(&snapshot_path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let mut app = App::new(Config::default(), cache);
        app.lease_timeout = Duration::from_millis(100);
        (dir, app, snapshot_path)
    }

    // ===== Re-check and register =====

    #[tokio::test]
    async fn test_recheck_does_not_free_registered_capacity() {
        // Upstream reports 2/3 teams before and after the local registration
        let (_dir, app, snapshot_path) = setup(race(3, 2));

        app.import_snapshot(&snapshot_path).unwrap();
        app.register(4, 1).await.unwrap();

        app.import_snapshot(&snapshot_path).unwrap();
        let live = app.live_race(&app.load_cached(4).unwrap().race).await.unwrap();
        assert_eq!(live.constraints.current_teams_count, 3);
        assert_eq!(live.constraints.current_participants_count, 6);

        let err = app.register(4, 2).await.unwrap_err();
        let err = err.downcast_ref::<RegistrationError>().unwrap();
        assert!(err.is_conflict());
        assert!(matches!(err, RegistrationError::CapacityExhausted(_)));
        assert_eq!(app.cache.load_registrations(4).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_keeps_upstream_counters() {
        let (_dir, app, snapshot_path) = setup(race(10, 2));
        app.import_snapshot(&snapshot_path).unwrap();
        app.register(4, 1).await.unwrap();

        // The cached snapshot is never rewritten with local counts
        let cached = app.load_cached(4).unwrap();
        assert_eq!(cached.race.constraints.current_teams_count, 2);
        let live = app.live_race(&cached.race).await.unwrap();
        assert_eq!(live.constraints.current_teams_count, 3);
    }

    // ===== Withdraw and payment =====

    #[tokio::test]
    async fn test_withdraw_and_pay_persist() {
        let (_dir, app, snapshot_path) = setup(race(3, 2));
        app.import_snapshot(&snapshot_path).unwrap();
        app.register(4, 1).await.unwrap();

        assert!(app.confirm_payment(4, 1).await.unwrap().payment_confirmed);
        assert!(app.cache.load_registrations(4).unwrap()[0].payment_confirmed);

        app.withdraw(4, 1).await.unwrap();
        assert!(app.cache.load_registrations(4).unwrap().is_empty());
        // The freed slot can be taken again
        assert_eq!(app.register(4, 2).await.unwrap().team_id, 2);

        let err = app.withdraw(4, 1).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<RegistrationError>(),
            Some(&RegistrationError::NotRegistered { race_id: 4, team_id: 1 })
        );
    }

    // ===== Rejections =====

    #[tokio::test]
    async fn test_ineligible_or_unknown_team_not_recorded() {
        let (_dir, app, snapshot_path) = setup(race(10, 0));
        app.import_snapshot(&snapshot_path).unwrap();

        let err = app.register(4, 3).await.unwrap_err();
        assert!(err.to_string().contains("not eligible"));
        assert!(err.to_string().contains("at least 2 members"));

        let err = app.register(4, 99).await.unwrap_err();
        assert!(err.to_string().contains("not in the snapshot"));
        assert!(app.cache.load_registrations(4).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_uncached_race() {
        let (_dir, app, _) = setup(race(10, 0));
        let err = app.register(4, 1).await.unwrap_err();
        assert!(err.to_string().contains("not cached"));
    }

    // ===== Cross-process lease =====

    #[tokio::test]
    async fn test_register_blocked_while_race_leased() {
        let (_dir, app, snapshot_path) = setup(race(10, 0));
        app.import_snapshot(&snapshot_path).unwrap();

        let lease = app.cache.acquire_race_lease(4, Duration::from_millis(0)).unwrap();
        let err = app.register(4, 1).await.unwrap_err();
        assert!(err.to_string().contains("locked by another raidcache process"));
        assert!(app.cache.load_registrations(4).unwrap().is_empty());

        drop(lease);
        app.register(4, 1).await.unwrap();
        assert_eq!(app.cache.load_registrations(4).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lease_released_after_failed_commit() {
        let (_dir, app, snapshot_path) = setup(race(10, 0));
        app.import_snapshot(&snapshot_path).unwrap();

        assert!(app.register(4, 3).await.is_err());
        assert!(app.register(4, 1).await.is_ok());
    }

    // ===== Helpers =====

    #[test]
    fn test_strict_mode_refuses_partial_thresholds() {
        let mut partial = race(10, 0);
        partial.leisure = LeisureThresholds::new(Some(10), None, Some(18));

        assert!(lint_race(&Config::default(), &partial).is_ok());
        let strict = Config {
            strict_leisure_thresholds: true,
            ..Config::default()
        };
        assert!(lint_race(&strict, &partial).is_err());
    }
}
