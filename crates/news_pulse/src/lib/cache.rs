//! Headline cache with a daily 6AM US-Eastern refresh boundary.
//!
//! The cache serves whatever it holds immediately and refreshes in the
//! background, so readers never wait on a live curation pass unless they
//! explicitly ask to. Staleness is anchored to 6AM in America/New_York,
//! which tracks US daylight saving transitions.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use serde::{Deserialize, Serialize};

/// Placeholder headline served while the very first fetch is in flight.
pub const LOADING_PLACEHOLDER: &str =
    "**AI News Loading** - Your personalized headlines are being prepared...";

/// Strategy label recorded alongside cached headlines.
const STRATEGY: &str = "claude-agent";

/// Source of current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Anything that can produce a fresh batch of headlines.
pub trait HeadlineSource: Send + Sync {
    fn fetch_headlines(
        &self,
    ) -> impl std::future::Future<Output = anyhow::Result<Vec<String>>> + Send;
}

impl<T: HeadlineSource> HeadlineSource for &T {
    fn fetch_headlines(
        &self,
    ) -> impl std::future::Future<Output = anyhow::Result<Vec<String>>> + Send {
        (*self).fetch_headlines()
    }
}

/// Persisted cache record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedHeadlines {
    pub headlines: Vec<String>,
    pub last_fetch: DateTime<Utc>,
    pub strategy: String,
}

/// What a reader sees: headlines plus cache metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineView {
    pub headlines: Vec<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub cached: bool,
    pub is_loading: bool,
}

/// Headline cache refreshed against the daily 6AM Eastern boundary.
///
/// Cheap to clone; all clones share the same state. Reads are
/// non-blocking: a cold cache returns a loading placeholder and kicks off
/// population in the background, a stale cache returns the old headlines
/// while a background refresh replaces them. [`read_blocking`] and
/// [`force_refresh`] wait for the fetch instead.
///
/// [`read_blocking`]: HeadlineCache::read_blocking
/// [`force_refresh`]: HeadlineCache::force_refresh
pub struct HeadlineCache<H, C = SystemClock> {
    inner: Arc<Inner<H, C>>,
}

impl<H, C> Clone for HeadlineCache<H, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<H, C> {
    source: H,
    clock: C,
    cache_file: Option<PathBuf>,
    state: RwLock<Option<CachedHeadlines>>,
    // Serializes refreshes. Background refreshes try_lock and bail if one
    // is already running; blocking refreshes queue behind it.
    refresh_lock: tokio::sync::Mutex<()>,
    refreshing: AtomicBool,
}

impl<H> HeadlineCache<H, SystemClock>
where
    H: HeadlineSource + Send + Sync + 'static,
{
    pub fn new(source: H) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<H, C> HeadlineCache<H, C>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn with_clock(source: H, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                cache_file: None,
                state: RwLock::new(None),
                refresh_lock: tokio::sync::Mutex::new(()),
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    /// Persists the cache record to `path` after every refresh and seeds
    /// the in-memory state from it when the file already exists.
    ///
    /// Must be called before the cache is cloned; a shared cache cannot
    /// take on a file and the call is ignored with a warning.
    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let Some(inner) = Arc::get_mut(&mut self.inner) else {
            tracing::warn!(
                path = %path.display(),
                "Ignoring cache file on an already-shared headline cache"
            );
            return self;
        };
        match load_cache_file(&path) {
            Ok(Some(record)) => {
                tracing::info!(
                    path = %path.display(),
                    headlines = record.headlines.len(),
                    "Loaded headline cache from disk"
                );
                if let Ok(state) = inner.state.get_mut() {
                    *state = Some(record);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    path = %path.display(),
                    "Failed to load headline cache"
                );
            }
        }
        inner.cache_file = Some(path);
        self
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refreshing.load(Ordering::SeqCst)
    }

    /// Non-blocking read.
    ///
    /// An empty cache returns the loading placeholder and spawns the first
    /// population; a stale cache returns the existing headlines and spawns
    /// a background refresh.
    pub fn read(&self) -> HeadlineView {
        let now = self.inner.clock.now();

        match self.inner.snapshot() {
            Some(record) => {
                if is_stale(record.last_fetch, now) {
                    tracing::info!("Headlines are stale, refreshing in background");
                    self.spawn_refresh();
                }
                HeadlineView {
                    headlines: record.headlines,
                    timestamp: Some(record.last_fetch),
                    cached: true,
                    is_loading: self.is_refreshing(),
                }
            }
            None => {
                tracing::info!("Headline cache is empty, populating in background");
                self.spawn_refresh();
                HeadlineView {
                    headlines: vec![LOADING_PLACEHOLDER.to_string()],
                    timestamp: None,
                    cached: false,
                    is_loading: true,
                }
            }
        }
    }

    /// Read that waits for population when the cache is empty or stale.
    ///
    /// A fetch failure is an error only when the cache has never been
    /// populated; once a record exists, the stale record is served instead.
    pub async fn read_blocking(&self) -> anyhow::Result<HeadlineView> {
        let now = self.inner.clock.now();
        let needs_fetch = match self.inner.snapshot() {
            Some(record) => is_stale(record.last_fetch, now),
            None => true,
        };

        if needs_fetch {
            let _guard = self.inner.refresh_lock.lock().await;
            // Another caller may have refreshed while we waited.
            let now = self.inner.clock.now();
            let still_needed = match self.inner.snapshot() {
                Some(record) => is_stale(record.last_fetch, now),
                None => true,
            };
            if still_needed {
                if let Err(e) = self.inner.populate().await {
                    if self.inner.snapshot().is_none() {
                        return Err(e);
                    }
                    tracing::warn!(error = ?e, "Refresh failed, serving stale headlines");
                }
            }
        }

        Ok(self.view())
    }

    /// Unconditionally refetches, replacing the cache on success. The
    /// existing record survives a failed refresh, but the error is the
    /// caller's to handle.
    pub async fn force_refresh(&self) -> anyhow::Result<HeadlineView> {
        {
            let _guard = self.inner.refresh_lock.lock().await;
            self.inner.populate().await?;
        }
        Ok(self.view())
    }

    fn view(&self) -> HeadlineView {
        let record = self.inner.snapshot();
        HeadlineView {
            timestamp: record.as_ref().map(|r| r.last_fetch),
            cached: record.is_some(),
            headlines: record
                .map(|r| r.headlines)
                .unwrap_or_else(|| vec![LOADING_PLACEHOLDER.to_string()]),
            is_loading: self.is_refreshing(),
        }
    }

    fn spawn_refresh(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            // If a refresh is already running, it covers this request.
            let Ok(_guard) = inner.refresh_lock.try_lock() else {
                return;
            };
            // Re-check under the lock: the refresh we queued behind may
            // have already brought the cache up to date.
            let now = inner.clock.now();
            let still_needed = match inner.snapshot() {
                Some(record) => is_stale(record.last_fetch, now),
                None => true,
            };
            if still_needed {
                // Background refreshes have no caller to report to.
                if let Err(e) = inner.populate().await {
                    tracing::error!(error = ?e, "Background headline refresh failed");
                }
            }
        });
    }
}

impl<H, C> Inner<H, C>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + 'static,
{
    fn snapshot(&self) -> Option<CachedHeadlines> {
        self.state.read().ok().and_then(|s| s.clone())
    }

    /// Fetches and replaces the cached record. Must be called with the
    /// refresh lock held. On failure the existing record is left intact.
    async fn populate(&self) -> anyhow::Result<()> {
        self.refreshing.store(true, Ordering::SeqCst);
        let fetched = self.source.fetch_headlines().await;
        self.refreshing.store(false, Ordering::SeqCst);

        let headlines = fetched.context("Failed to fetch headlines")?;
        let record = CachedHeadlines {
            headlines,
            last_fetch: self.clock.now(),
            strategy: STRATEGY.to_string(),
        };
        tracing::info!(headlines = record.headlines.len(), "Headline cache refreshed");
        if let Some(path) = &self.cache_file {
            if let Err(e) = store_cache_file(path, &record) {
                tracing::warn!(
                    error = ?e,
                    path = %path.display(),
                    "Failed to persist headline cache"
                );
            }
        }
        if let Ok(mut state) = self.state.write() {
            *state = Some(record);
        }
        Ok(())
    }
}

fn load_cache_file(path: &Path) -> anyhow::Result<Option<CachedHeadlines>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    let record = serde_json::from_str(&raw)?;
    Ok(Some(record))
}

fn store_cache_file(path: &Path, record: &CachedHeadlines) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(record)?;
    std::fs::write(path, raw)?;
    Ok(())
}

/// 6AM Eastern on `date`, expressed in UTC.
fn six_am_eastern(date: NaiveDate) -> DateTime<Utc> {
    let six_am = NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default();
    match New_York.from_local_datetime(&date.and_time(six_am)) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            dt.with_timezone(&Utc)
        }
        // DST transitions happen at 2AM Eastern, so 6AM always exists;
        // fall back to standard time just in case.
        chrono::LocalResult::None => {
            Utc.from_utc_datetime(&date.and_time(six_am)) + Duration::hours(5)
        }
    }
}

/// Most recent 6AM-Eastern boundary at or before `now`.
pub fn refresh_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let eastern_date = now.with_timezone(&New_York).date_naive();
    let today_boundary = six_am_eastern(eastern_date);
    if now >= today_boundary {
        today_boundary
    } else {
        six_am_eastern(eastern_date - Duration::days(1))
    }
}

/// Whether a record fetched at `last_fetch` predates the current boundary.
pub fn is_stale(last_fetch: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    last_fetch < refresh_boundary(now)
}
