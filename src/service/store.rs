//! Short-lived in-memory store for completed analyses
//!
//! Lets a client POST a document and fetch the result again by id. Entries
//! expire after the configured TTL; when full, the oldest entry is evicted.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::AnalysisResult;
use crate::model::config::StoreConfig;

/// A completed analysis and when it was produced
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

pub struct ResultStore {
    entries: RwLock<HashMap<Uuid, StoredAnalysis>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResultStore {
    pub fn new(config: &StoreConfig) -> Self {
        let ttl_seconds = i64::try_from(config.ttl_seconds).unwrap_or(i64::MAX);
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::try_seconds(ttl_seconds).unwrap_or(Duration::MAX),
            max_entries: config.max_entries.max(1),
        }
    }

    /// Store a result under a fresh id
    pub async fn insert(&self, result: AnalysisResult) -> StoredAnalysis {
        let stored = StoredAnalysis {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            result,
        };

        let mut entries = self.entries.write().await;
        let now = Utc::now();
        entries.retain(|_, entry| !self.is_expired(entry, now));

        while entries.len() >= self.max_entries {
            let oldest = entries
                .values()
                .min_by_key(|entry| entry.analyzed_at)
                .map(|entry| entry.id);
            match oldest {
                Some(id) => {
                    tracing::debug!(id = %id, "Evicting oldest stored analysis");
                    entries.remove(&id);
                }
                None => break,
            }
        }

        entries.insert(stored.id, stored.clone());
        stored
    }

    /// Fetch a stored result unless it has expired
    pub async fn get(&self, id: &Uuid) -> Option<StoredAnalysis> {
        let entries = self.entries.read().await;
        entries
            .get(id)
            .filter(|entry| !self.is_expired(entry, Utc::now()))
            .cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    fn is_expired(&self, entry: &StoredAnalysis, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.analyzed_at) > self.ttl
    }
}
