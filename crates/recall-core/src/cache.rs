//! In-memory question cache with TTL and a background reaper.
//!
//! Holds generated questions long enough for a later evaluation call to
//! reference their topic and difficulty, then forgets them. The table is
//! the only state shared across requests; no I/O happens under the lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

use crate::error::{RecallError, RecallResult};
use crate::types::StoredQuestion;

/// Concurrent TTL cache of issued questions, keyed by question id.
pub struct QuestionCache {
    entries: RwLock<HashMap<String, StoredQuestion>>,
    ttl: chrono::Duration,
}

impl QuestionCache {
    /// Create a cache with the given entry time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(24)),
        }
    }

    /// Insert or overwrite a question, stamping its expiry.
    ///
    /// Last write wins on key collision.
    pub async fn put(&self, mut question: StoredQuestion) {
        let now = Utc::now();
        question.created_at = now;
        question.expires_at = now + self.ttl;

        let mut entries = self.entries.write().await;
        entries.insert(question.question_id.clone(), question);
    }

    /// Look up a question; expired entries behave as absent even before
    /// the reaper has removed them.
    pub async fn get(&self, question_id: &str) -> Option<StoredQuestion> {
        self.get_at(question_id, Utc::now()).await
    }

    /// Time-parameterized lookup, used directly by tests.
    pub async fn get_at(&self, question_id: &str, now: DateTime<Utc>) -> Option<StoredQuestion> {
        let entries = self.entries.read().await;
        entries
            .get(question_id)
            .filter(|q| now < q.expires_at)
            .cloned()
    }

    /// Remove every entry whose expiry has passed, returning the count.
    pub async fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, q| now < q.expires_at);
        before - entries.len()
    }

    /// Number of physically present entries, including not-yet-reaped
    /// expired ones.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Background reaper that periodically evicts expired cache entries.
///
/// Explicit lifecycle: `start()` schedules the periodic job, `shutdown()`
/// stops it cleanly so no timer outlives the process teardown.
pub struct CacheReaper {
    scheduler: JobScheduler,
    cache: Arc<QuestionCache>,
    interval: Duration,
    running: RwLock<bool>,
}

impl CacheReaper {
    /// Create a reaper for the given cache. Call `start()` to begin.
    pub async fn new(cache: Arc<QuestionCache>, interval: Duration) -> RecallResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| RecallError::internal(format!("failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            cache,
            interval,
            running: RwLock::new(false),
        })
    }

    /// Start periodic eviction at the configured interval.
    pub async fn start(&self) -> RecallResult<()> {
        let mut running = self.running.write().await;
        if *running {
            return Ok(());
        }

        let cache = self.cache.clone();
        let job = Job::new_repeated_async(self.interval, move |_uuid, _lock| {
            let cache = cache.clone();
            Box::pin(async move {
                let evicted = cache.evict_expired(Utc::now()).await;
                if evicted > 0 {
                    info!(evicted, "Expired questions reaped");
                } else {
                    debug!("Reaper pass found no expired questions");
                }
            })
        })
        .map_err(|e| RecallError::internal(format!("failed to create reaper job: {}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| RecallError::internal(format!("failed to add reaper job: {}", e)))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| RecallError::internal(format!("failed to start reaper: {}", e)))?;

        *running = true;
        info!(interval_secs = self.interval.as_secs(), "Cache reaper started");
        Ok(())
    }

    /// Stop the reaper gracefully.
    pub async fn shutdown(&mut self) -> RecallResult<()> {
        let mut running = self.running.write().await;
        if *running {
            self.scheduler
                .shutdown()
                .await
                .map_err(|e| RecallError::internal(format!("failed to stop reaper: {}", e)))?;
            *running = false;
            info!("Cache reaper stopped");
        }
        Ok(())
    }

    /// Whether the reaper is currently running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, QuestionType};

    fn question(id: &str) -> StoredQuestion {
        StoredQuestion {
            question_id: id.to_string(),
            user_id: "u1".to_string(),
            question_type: QuestionType::MultipleChoice,
            topic: "gardening".to_string(),
            difficulty: Difficulty::Medium,
            created_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_then_get_returns_entry() {
        let cache = QuestionCache::new(Duration::from_secs(300));
        cache.put(question("q1")).await;

        let got = cache.get("q1").await.expect("entry should be present");
        assert_eq!(got.topic, "gardening");
        assert_eq!(got.difficulty, Difficulty::Medium);
    }

    #[tokio::test]
    async fn test_get_misses_after_virtual_expiry_without_reaper() {
        let cache = QuestionCache::new(Duration::from_secs(300));
        cache.put(question("q1")).await;

        let later = Utc::now() + chrono::Duration::seconds(301);
        assert!(cache.get_at("q1", later).await.is_none());
        // Entry is logically absent but physically still present.
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_last_write_wins_on_key_collision() {
        let cache = QuestionCache::new(Duration::from_secs(300));
        cache.put(question("q1")).await;

        let mut replacement = question("q1");
        replacement.topic = "cooking".to_string();
        cache.put(replacement).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("q1").await.unwrap().topic, "cooking");
    }

    #[tokio::test]
    async fn test_reaper_eviction_is_idempotent() {
        let cache = QuestionCache::new(Duration::from_secs(300));
        cache.put(question("q1")).await;
        cache.put(question("q2")).await;

        let later = Utc::now() + chrono::Duration::seconds(301);
        assert_eq!(cache.evict_expired(later).await, 2);
        // Second pass with no intervening put removes nothing further.
        assert_eq!(cache.evict_expired(later).await, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict_keeps_live_entries() {
        let cache = QuestionCache::new(Duration::from_secs(300));
        cache.put(question("q1")).await;

        assert_eq!(cache.evict_expired(Utc::now()).await, 0);
        assert!(cache.get("q1").await.is_some());
    }

    #[tokio::test]
    async fn test_reaper_start_shutdown() {
        let cache = Arc::new(QuestionCache::new(Duration::from_secs(300)));
        let mut reaper = CacheReaper::new(cache, Duration::from_secs(60))
            .await
            .unwrap();

        assert!(!reaper.is_running().await);
        reaper.start().await.unwrap();
        assert!(reaper.is_running().await);

        reaper.shutdown().await.unwrap();
        assert!(!reaper.is_running().await);
    }
}
