//! Local snapshot cache.
//!
//! Race snapshots (race rules plus candidate teams) and committed
//! registrations are stored as JSON under the cache directory. Snapshots are
//! considered stale after 15 minutes since the race counters they carry may
//! have moved. Writers of a race's registrations hold a `RaceLease`, a lock
//! file next to the cache files, for the whole read-modify-write.

pub mod manager;

pub use manager::{CacheManager, CachedData, RaceLease, RaceSnapshot};
