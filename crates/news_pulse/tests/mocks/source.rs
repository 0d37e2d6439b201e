use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use chrono::{DateTime, Utc};
use news_pulse::cache::{Clock, HeadlineSource};

#[derive(Clone)]
pub struct MockHeadlineSource {
    headlines: Vec<String>,
    delay: Duration,
    fail_with: Arc<Mutex<Option<String>>>,
    pub fetches: Arc<AtomicUsize>,
}

impl MockHeadlineSource {
    pub fn new(headlines: &[&str]) -> Self {
        Self {
            headlines: headlines.iter().map(|h| h.to_string()).collect(),
            delay: Duration::ZERO,
            fail_with: Arc::new(Mutex::new(None)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn slow(headlines: &[&str], delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(headlines)
        }
    }

    pub fn failing(msg: &str) -> Self {
        let source = Self::new(&[]);
        source.set_failing(msg);
        source
    }

    pub fn set_failing(&self, msg: &str) {
        *self.fail_with.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl HeadlineSource for MockHeadlineSource {
    async fn fetch_headlines(&self) -> anyhow::Result<Vec<String>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.fail_with.lock().unwrap().clone() {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.headlines.clone())
    }
}

/// Clock pinned to a settable instant.
#[derive(Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
