//! The counter store: single owner of the running total, the per-day buckets
//! and the persisted preference flags.
//!
//! Every operation is a read-modify-write over a [`KeyValueStore`]. Storage
//! failures never reach the caller: a failed or unparsable read falls back to
//! the default value, and a failed write is logged while the new value stays
//! in the session cache. A failed write is therefore lost on restart.
//!
//! Operations are serialized by one async mutex that also guards the cache,
//! so a [`CountSnapshot`] always describes one consistent state.

use crate::clock::Clock;
use crate::models::{
    AppSettings, DailyPoint, DerivedStatistics, NotificationKind, NotificationPreferences,
    SettingKind,
};
use crate::stats::{date_key, derive_statistics, trailing_days};
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const TOTAL_KEY: &str = "istighfar_count";
const DAILY_PREFIX: &str = "daily_stats_";

pub fn daily_key(date: NaiveDate) -> String {
    format!("{DAILY_PREFIX}{}", date_key(date))
}

/// Counts and statistics read under one lock, for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSnapshot {
    pub date: NaiveDate,
    pub total: u64,
    pub today: u64,
    pub statistics: DerivedStatistics,
    pub degraded: bool,
}

#[derive(Debug, Default)]
struct Session {
    values: HashMap<String, String>,
    /// Keys whose latest value never reached storage.
    unsynced: HashSet<String>,
}

pub struct CounterStore<S, C> {
    storage: S,
    clock: C,
    cache: Mutex<Session>,
    degraded: AtomicBool,
}

impl<S: KeyValueStore, C: Clock> CounterStore<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            cache: Mutex::new(Session::default()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Records one repetition and returns the new total.
    pub async fn increment(&self) -> u64 {
        self.increment_snapshot().await.total
    }

    /// Records one repetition and returns the state right after it.
    pub async fn increment_snapshot(&self) -> CountSnapshot {
        let mut cache = self.cache.lock().await;
        let today = self.clock.today();
        self.record(&mut cache, today).await;
        self.snapshot_locked(&mut cache, today).await
    }

    /// Zeroes the total and returns the resulting state.
    pub async fn reset_snapshot(&self) -> CountSnapshot {
        let mut cache = self.cache.lock().await;
        self.write_value(&mut cache, TOTAL_KEY, "0".to_string()).await;
        info!("total counter reset");
        self.snapshot_locked(&mut cache, self.clock.today()).await
    }

    pub async fn snapshot(&self) -> CountSnapshot {
        let mut cache = self.cache.lock().await;
        self.snapshot_locked(&mut cache, self.clock.today()).await
    }

    async fn record(&self, cache: &mut Session, today: NaiveDate) {
        let total = self
            .read_value::<u64>(cache, TOTAL_KEY)
            .await
            .unwrap_or(0)
            .saturating_add(1);
        self.write_value(cache, TOTAL_KEY, total.to_string()).await;

        // the two writes are independent; a crash in between leaves them apart
        let key = daily_key(today);
        let bucket = self
            .read_value::<u64>(cache, &key)
            .await
            .unwrap_or(0)
            .saturating_add(1);
        self.write_value(cache, &key, bucket.to_string()).await;

        debug!(total, date = %today, bucket, "recorded repetition");
    }

    /// Zeroes the total. Daily buckets keep their counts.
    pub async fn reset(&self) {
        self.reset_snapshot().await;
    }

    pub async fn total(&self) -> u64 {
        let mut cache = self.cache.lock().await;
        self.read_value(&mut cache, TOTAL_KEY).await.unwrap_or(0)
    }

    pub async fn today_count(&self) -> u64 {
        self.day_count(self.clock.today()).await
    }

    pub async fn day_count(&self, date: NaiveDate) -> u64 {
        let mut cache = self.cache.lock().await;
        self.read_value(&mut cache, &daily_key(date))
            .await
            .unwrap_or(0)
    }

    /// One point per day for the `days` days ending today, oldest first.
    pub async fn history(&self, days: usize) -> Vec<DailyPoint> {
        let mut cache = self.cache.lock().await;
        let mut points = Vec::with_capacity(days);
        for date in trailing_days(self.clock.today(), days) {
            let count = self
                .read_value(&mut cache, &daily_key(date))
                .await
                .unwrap_or(0);
            points.push(DailyPoint {
                date: date_key(date),
                count,
            });
        }
        points
    }

    pub async fn statistics(&self) -> DerivedStatistics {
        self.snapshot().await.statistics
    }

    pub async fn notification_preferences(&self) -> NotificationPreferences {
        let mut cache = self.cache.lock().await;
        NotificationPreferences {
            daily: self.read_notification(&mut cache, NotificationKind::Daily).await,
            weekly: self.read_notification(&mut cache, NotificationKind::Weekly).await,
            monthly: self.read_notification(&mut cache, NotificationKind::Monthly).await,
        }
    }

    pub async fn set_notification_preference(&self, kind: NotificationKind, enabled: bool) {
        let mut cache = self.cache.lock().await;
        self.write_value(&mut cache, kind.storage_key(), enabled.to_string())
            .await;
        info!(%kind, enabled, "notification preference updated");
    }

    pub async fn settings(&self) -> AppSettings {
        let mut cache = self.cache.lock().await;
        AppSettings {
            notifications: self.read_setting(&mut cache, SettingKind::Notifications).await,
            dark_mode: self.read_setting(&mut cache, SettingKind::DarkMode).await,
            sound: self.read_setting(&mut cache, SettingKind::Sound).await,
        }
    }

    pub async fn set_setting(&self, kind: SettingKind, enabled: bool) {
        let mut cache = self.cache.lock().await;
        self.write_value(&mut cache, kind.storage_key(), enabled.to_string())
            .await;
        info!(setting = %kind, enabled, "setting updated");
    }

    /// True while any value written this session has not reached storage.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    async fn snapshot_locked(&self, cache: &mut Session, date: NaiveDate) -> CountSnapshot {
        let total = self.read_value(cache, TOTAL_KEY).await.unwrap_or(0);
        let today = self
            .read_value(cache, &daily_key(date))
            .await
            .unwrap_or(0);

        CountSnapshot {
            date,
            total,
            today,
            statistics: derive_statistics(total, today),
            degraded: !cache.unsynced.is_empty(),
        }
    }

    async fn read_notification(
        &self,
        cache: &mut Session,
        kind: NotificationKind,
    ) -> bool {
        self.read_value(cache, kind.storage_key())
            .await
            .unwrap_or(kind.default_enabled())
    }

    async fn read_setting(&self, cache: &mut Session, kind: SettingKind) -> bool {
        self.read_value(cache, kind.storage_key())
            .await
            .unwrap_or(kind.default_enabled())
    }

    /// Cache first, then storage. Read and parse failures come back as `None`.
    async fn read_value<T: FromStr>(
        &self,
        cache: &mut Session,
        key: &str,
    ) -> Option<T> {
        let cached = cache.values.get(key).cloned();
        let raw = match cached {
            Some(raw) => raw,
            None => match self.storage.get(key).await {
                Ok(Some(raw)) => {
                    cache.values.insert(key.to_string(), raw.clone());
                    raw
                }
                Ok(None) => return None,
                Err(err) => {
                    warn!(key, error = %err, "storage read failed; using default");
                    return None;
                }
            },
        };

        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(key, value = %raw, "stored value is malformed; using default");
                None
            }
        }
    }

    /// Persists, then caches the value whether or not it reached storage. A key
    /// stays unsynced until a later write of it succeeds.
    async fn write_value(&self, cache: &mut Session, key: &str, value: String) {
        let result = self.storage.set(key, &value).await;
        cache.values.insert(key.to_string(), value);

        match result {
            Ok(()) => {
                cache.unsynced.remove(key);
            }
            Err(err) => {
                cache.unsynced.insert(key.to_string());
                error!(key, error = %err, "storage write failed; value kept for this session only");
            }
        }
        self.degraded
            .store(!cache.unsynced.is_empty(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::errors::StorageError;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    /// Rejects writes to one key and passes everything else through.
    struct RejectKey {
        inner: MemoryStore,
        key: &'static str,
    }

    impl KeyValueStore for RejectKey {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.key {
                return Err(StorageError::Unavailable(format!("write of `{key}` rejected")));
            }
            self.inner.set(key, value).await
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn d1() -> NaiveDate {
        date(2026, 10, 16)
    }

    fn d2() -> NaiveDate {
        date(2026, 10, 17)
    }

    fn fresh() -> (CounterStore<MemoryStore, FixedClock>, MemoryStore, FixedClock) {
        let storage = MemoryStore::new();
        let clock = FixedClock::new(d1());
        let store = CounterStore::new(storage.clone(), clock.clone());
        (store, storage, clock)
    }

    async fn increment_times<S: KeyValueStore, C: Clock>(store: &CounterStore<S, C>, n: u64) {
        for _ in 0..n {
            store.increment().await;
        }
    }

    #[tokio::test]
    async fn fresh_install_reads_zero() {
        let (store, _, _) = fresh();

        assert_eq!(store.total().await, 0);
        assert_eq!(store.today_count().await, 0);
        assert_eq!(store.statistics().await, DerivedStatistics::default());
        assert!(!store.is_degraded());
    }

    #[tokio::test]
    async fn increments_count_total_and_today() {
        let (store, storage, _) = fresh();

        increment_times(&store, 5).await;
        assert_eq!(store.total().await, 5);
        assert_eq!(store.today_count().await, 5);
        assert_eq!(storage.raw(TOTAL_KEY).as_deref(), Some("5"));
        assert_eq!(
            storage.raw("daily_stats_2026-10-16").as_deref(),
            Some("5")
        );
    }

    #[tokio::test]
    async fn increment_returns_running_total() {
        let (store, _, _) = fresh();

        for expected in 1..=20 {
            assert_eq!(store.increment().await, expected);
        }
        assert_eq!(store.total().await, 20);
    }

    #[tokio::test]
    async fn date_boundary_starts_new_bucket() {
        let (store, storage, clock) = fresh();

        increment_times(&store, 5).await;
        clock.set(d2());
        assert_eq!(store.today_count().await, 0);
        increment_times(&store, 3).await;

        assert_eq!(store.total().await, 8);
        assert_eq!(store.day_count(d1()).await, 5);
        assert_eq!(store.day_count(d2()).await, 3);
        assert_eq!(store.today_count().await, 3);
        assert_eq!(
            storage.raw("daily_stats_2026-10-17").as_deref(),
            Some("3")
        );
    }

    #[tokio::test]
    async fn reset_keeps_daily_buckets() {
        let (store, storage, clock) = fresh();

        increment_times(&store, 5).await;
        clock.set(d2());
        increment_times(&store, 3).await;

        store.reset().await;
        assert_eq!(store.total().await, 0);
        assert_eq!(store.today_count().await, 3);
        assert_eq!(store.day_count(d1()).await, 5);
        assert_eq!(store.day_count(d2()).await, 3);
        assert_eq!(storage.raw(TOTAL_KEY).as_deref(), Some("0"));

        assert_eq!(store.increment().await, 1);
        assert_eq!(store.today_count().await, 4);
    }

    #[tokio::test]
    async fn reset_on_fresh_install_is_harmless() {
        let (store, _, _) = fresh();
        store.reset().await;
        assert_eq!(store.total().await, 0);
        assert_eq!(store.today_count().await, 0);
    }

    #[tokio::test]
    async fn reads_are_stable_without_mutation() {
        let (store, _, _) = fresh();
        increment_times(&store, 7).await;

        let first = store.total().await;
        let second = store.total().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn statistics_follow_total_and_today() {
        let (store, storage, _) = fresh();
        storage.insert_raw(TOTAL_KEY, "1234");
        storage.insert_raw("daily_stats_2026-10-16", "200");

        let stats = store.statistics().await;
        assert_eq!(stats.daily_average, 41);
        assert_eq!(stats.weekly_average, 309);
        assert_eq!(stats.highest_day, 200);
    }

    #[tokio::test]
    async fn state_survives_restart() {
        let (store, storage, clock) = fresh();
        increment_times(&store, 4).await;
        drop(store);

        let restarted = CounterStore::new(storage, clock);
        assert_eq!(restarted.total().await, 4);
        assert_eq!(restarted.today_count().await, 4);
        assert_eq!(restarted.increment().await, 5);
    }

    #[tokio::test]
    async fn preferences_default_then_round_trip_across_restart() {
        let (store, storage, clock) = fresh();

        assert_eq!(
            store.notification_preferences().await,
            NotificationPreferences {
                daily: true,
                weekly: true,
                monthly: false,
            }
        );

        store
            .set_notification_preference(NotificationKind::Daily, false)
            .await;
        store
            .set_notification_preference(NotificationKind::Monthly, true)
            .await;
        assert_eq!(storage.raw("daily_reminder").as_deref(), Some("false"));
        drop(store);

        let restarted = CounterStore::new(storage, clock);
        let prefs = restarted.notification_preferences().await;
        assert!(!prefs.daily);
        assert!(prefs.weekly);
        assert!(prefs.monthly);
        assert_eq!(restarted.settings().await, AppSettings::default());
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let (store, storage, clock) = fresh();

        store.set_setting(SettingKind::Sound, false).await;
        store.set_setting(SettingKind::DarkMode, false).await;
        assert_eq!(storage.raw("settings_sound").as_deref(), Some("false"));
        drop(store);

        let restarted = CounterStore::new(storage, clock);
        assert_eq!(
            restarted.settings().await,
            AppSettings {
                notifications: true,
                dark_mode: false,
                sound: false,
            }
        );
        assert_eq!(
            restarted.notification_preferences().await,
            NotificationPreferences::default()
        );
    }

    #[tokio::test]
    async fn failed_reads_fall_back_to_defaults() {
        let (store, storage, _) = fresh();
        storage.insert_raw(TOTAL_KEY, "9");
        storage.insert_raw("monthly_reminder", "true");
        storage.fail_reads(true);

        assert_eq!(store.total().await, 0);
        assert!(!store.notification_preferences().await.monthly);

        storage.fail_reads(false);
        assert_eq!(store.total().await, 9);
        assert!(store.notification_preferences().await.monthly);
    }

    #[tokio::test]
    async fn failed_writes_keep_session_value_but_lose_it_on_restart() {
        let (store, storage, clock) = fresh();
        increment_times(&store, 2).await;

        storage.fail_writes(true);
        assert_eq!(store.increment().await, 3);
        assert!(store.is_degraded());
        assert_eq!(store.total().await, 3);
        assert_eq!(store.today_count().await, 3);
        store
            .set_notification_preference(NotificationKind::Weekly, false)
            .await;
        assert!(!store.notification_preferences().await.weekly);

        storage.fail_writes(false);
        let restarted = CounterStore::new(storage.clone(), clock);
        assert_eq!(restarted.total().await, 2);
        assert_eq!(restarted.today_count().await, 2);
        assert!(restarted.notification_preferences().await.weekly);

        store.increment().await;
        assert_eq!(storage.raw(TOTAL_KEY).as_deref(), Some("4"));
        // the weekly preference has still not reached storage
        assert!(store.is_degraded());

        store
            .set_notification_preference(NotificationKind::Weekly, false)
            .await;
        assert!(!store.is_degraded());
        assert_eq!(storage.raw("weekly_reminder").as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn lost_total_write_keeps_store_degraded() {
        let storage = MemoryStore::new();
        let store = CounterStore::new(
            RejectKey {
                inner: storage.clone(),
                key: TOTAL_KEY,
            },
            FixedClock::new(d1()),
        );

        let snapshot = store.increment_snapshot().await;
        assert_eq!(snapshot.total, 1);
        assert!(snapshot.degraded);
        assert!(store.is_degraded());
        assert_eq!(storage.raw(TOTAL_KEY), None);
        assert_eq!(storage.raw("daily_stats_2026-10-16").as_deref(), Some("1"));

        store.set_setting(SettingKind::Sound, false).await;
        assert!(store.is_degraded());
        assert!(store.snapshot().await.degraded);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_each_see_their_own_total() {
        let (store, storage, _) = fresh();
        let store = Arc::new(store);

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment_snapshot().await })
            })
            .collect();

        let mut totals = Vec::with_capacity(tasks.len());
        for task in tasks {
            let snapshot = task.await.unwrap();
            assert_eq!(snapshot.date, d1());
            assert_eq!(snapshot.today, snapshot.total);
            assert_eq!(
                snapshot.statistics,
                derive_statistics(snapshot.total, snapshot.today)
            );
            totals.push(snapshot.total);
        }
        totals.sort_unstable();
        assert_eq!(totals, (1..=64).collect::<Vec<u64>>());
        assert_eq!(storage.raw(TOTAL_KEY).as_deref(), Some("64"));
    }

    #[tokio::test]
    async fn snapshots_read_one_date() {
        let (store, _, clock) = fresh();
        increment_times(&store, 5).await;
        clock.set(d2());
        increment_times(&store, 3).await;

        let snapshot = store.reset_snapshot().await;
        assert_eq!(snapshot.date, d2());
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.today, 3);
        assert_eq!(snapshot.statistics.highest_day, 3);
        assert!(!snapshot.degraded);
        assert_eq!(store.snapshot().await, snapshot);
    }

    #[tokio::test]
    async fn malformed_values_read_as_absent() {
        let (store, storage, _) = fresh();
        storage.insert_raw(TOTAL_KEY, "lots");
        storage.insert_raw("daily_stats_2026-10-16", "-3");
        storage.insert_raw("daily_reminder", "yes");

        assert_eq!(store.total().await, 0);
        assert_eq!(store.today_count().await, 0);
        assert!(store.notification_preferences().await.daily);

        assert_eq!(store.increment().await, 1);
        assert_eq!(store.today_count().await, 1);
    }

    #[tokio::test]
    async fn history_fills_missing_days_with_zero() {
        let (store, _, clock) = fresh();

        increment_times(&store, 2).await;
        clock.advance_days(2);
        increment_times(&store, 1).await;

        let history = store.history(4).await;
        assert_eq!(
            history,
            vec![
                DailyPoint { date: "2026-10-15".into(), count: 0 },
                DailyPoint { date: "2026-10-16".into(), count: 2 },
                DailyPoint { date: "2026-10-17".into(), count: 0 },
                DailyPoint { date: "2026-10-18".into(), count: 1 },
            ]
        );
        assert!(store.history(0).await.is_empty());
    }

    #[test]
    fn daily_keys_use_iso_dates() {
        assert_eq!(daily_key(date(2026, 1, 5)), "daily_stats_2026-01-05");
    }
}
