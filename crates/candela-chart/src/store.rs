//! Persistence collaborator contracts and the in-memory reference store.
//!
//! The engine never talks to a database or network itself; it depends on
//! these traits. [`MemoryStore`] is the reference implementation used by
//! tests and the demo binary. Validation happens here at the boundary,
//! before any write takes effect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use candela_core::{Annotation, AnnotationDraft, AnnotationPatch, Candle, Error, Result};
use candela_data::check_candle;

/// Inclusive timestamp range filter, unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    #[must_use]
    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Candle persistence collaborator.
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// Store one candle. OHLC consistency is enforced here: a violation
    /// is a rejected write, never a silent clamp.
    async fn insert(&self, candle: Candle) -> Result<Candle>;

    /// Store a batch. The whole batch is validated before any candle is
    /// written; an empty batch is a no-op.
    async fn insert_batch(&self, candles: Vec<Candle>) -> Result<Vec<Candle>>;

    /// Load candles for a symbol, ascending by timestamp, at most
    /// `limit`. Without a range this means the most recent `limit`
    /// candles (still returned ascending); with a range, the earliest
    /// `limit` candles inside it.
    async fn load_candles(
        &self,
        symbol: &str,
        range: Option<TimeRange>,
        limit: usize,
    ) -> Result<Vec<Candle>>;
}

/// Annotation persistence collaborator.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Validate and persist a draft, assigning its id and creation time.
    async fn commit(&self, draft: AnnotationDraft) -> Result<Annotation>;

    /// All annotations for a symbol; order unspecified.
    async fn load_annotations(&self, symbol: &str) -> Result<Vec<Annotation>>;

    /// Partial update: unspecified fields unchanged, explicit nulls
    /// clear. A missing id is an error.
    async fn update(&self, id: u64, patch: AnnotationPatch) -> Result<Annotation>;

    /// Returns `true` iff a record existed and was removed. A second
    /// delete of the same id is `Ok(false)`, not an error.
    async fn delete(&self, id: u64) -> Result<bool>;
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// In-memory store backing tests and the demo binary.
///
/// Interior mutability via mutexes; the id counter is monotonic across
/// both entity kinds for simplicity.
#[derive(Debug, Default)]
pub struct MemoryStore {
    candles: Mutex<Vec<Candle>>,
    annotations: Mutex<HashMap<u64, Annotation>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            candles: Mutex::new(Vec::new()),
            annotations: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_candles(&self) -> std::sync::MutexGuard<'_, Vec<Candle>> {
        // A poisoned lock means a panic mid-write in another test thread;
        // the data is still the best truth available.
        self.candles.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_annotations(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Annotation>> {
        self.annotations.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CandleStore for MemoryStore {
    async fn insert(&self, candle: Candle) -> Result<Candle> {
        check_candle(&candle)?;
        self.lock_candles().push(candle.clone());
        Ok(candle)
    }

    async fn insert_batch(&self, candles: Vec<Candle>) -> Result<Vec<Candle>> {
        // Validate everything up front so a bad row rejects the batch
        // before any write.
        for candle in &candles {
            check_candle(candle)?;
        }
        self.lock_candles().extend(candles.iter().cloned());
        Ok(candles)
    }

    async fn load_candles(
        &self,
        symbol: &str,
        range: Option<TimeRange>,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let mut matched: Vec<Candle> = self
            .lock_candles()
            .iter()
            .filter(|c| c.symbol == symbol)
            .filter(|c| range.map_or(true, |r| r.contains(c.timestamp)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        if matched.len() > limit {
            if range.is_some() {
                matched.truncate(limit);
            } else {
                // no range: the most recent `limit`, kept ascending
                matched.drain(..matched.len() - limit);
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn commit(&self, draft: AnnotationDraft) -> Result<Annotation> {
        draft.validate()?;

        let annotation = Annotation {
            id: self.allocate_id(),
            symbol: draft.symbol,
            tool_type: draft.tool_type,
            start: draft.start,
            end: draft.end,
            color: draft.color,
            stroke_width: draft.stroke_width,
            label: draft.label,
            created_at: unix_now(),
        };
        self.lock_annotations()
            .insert(annotation.id, annotation.clone());
        Ok(annotation)
    }

    async fn load_annotations(&self, symbol: &str) -> Result<Vec<Annotation>> {
        Ok(self
            .lock_annotations()
            .values()
            .filter(|a| a.symbol == symbol)
            .cloned()
            .collect())
    }

    async fn update(&self, id: u64, patch: AnnotationPatch) -> Result<Annotation> {
        let mut annotations = self.lock_annotations();
        let annotation = annotations.get_mut(&id).ok_or(Error::NotFound { id })?;
        patch.apply_to(annotation)?;
        Ok(annotation.clone())
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        Ok(self.lock_annotations().remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use candela_core::{DataPoint, ToolType};

    use super::*;

    fn candle(symbol: &str, timestamp: f64) -> Candle {
        Candle::new(symbol, timestamp, 100.0, 105.0, 95.0, 102.0, 1000.0)
    }

    fn draft(symbol: &str) -> AnnotationDraft {
        AnnotationDraft::new(
            symbol,
            ToolType::TrendLine,
            DataPoint::new(10.0, 100.0),
            Some(DataPoint::new(20.0, 110.0)),
        )
    }

    #[tokio::test]
    async fn test_commit_assigns_id_and_created_at() {
        let store = MemoryStore::new();
        let a = store.commit(draft("AAPL")).await.unwrap();
        let b = store.commit(draft("AAPL")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(a.created_at > 0.0);
    }

    #[tokio::test]
    async fn test_commit_rejects_invalid_draft_without_persisting() {
        let store = MemoryStore::new();
        let mut bad = draft("AAPL");
        bad.stroke_width = -1.0;

        assert!(matches!(
            store.commit(bad).await,
            Err(Error::Validation(_))
        ));
        assert!(store.load_annotations("AAPL").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_twice_true_then_false() {
        let store = MemoryStore::new();
        let a = store.commit(draft("AAPL")).await.unwrap();

        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update(42, AnnotationPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err, Error::NotFound { id: 42 });
    }

    #[tokio::test]
    async fn test_update_partial_and_explicit_null() {
        let store = MemoryStore::new();
        let mut d = draft("AAPL");
        d.label = Some("entry".into());
        let a = store.commit(d).await.unwrap();

        let updated = store
            .update(
                a.id,
                AnnotationPatch {
                    stroke_width: Some(4.0),
                    label: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.stroke_width, 4.0);
        assert!(updated.label.is_none());
        // unspecified fields kept
        assert_eq!(updated.color, a.color);
        assert_eq!(updated.start, a.start);
    }

    #[tokio::test]
    async fn test_candle_insert_rejects_inconsistent_ohlc() {
        let store = MemoryStore::new();
        let bad = Candle::new("AAPL", 1000.0, 100.0, 90.0, 95.0, 102.0, 1000.0);

        assert!(matches!(
            store.insert(bad).await,
            Err(Error::Validation(_))
        ));
        assert!(store.load_candles("AAPL", None, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_rejects_before_any_write() {
        let store = MemoryStore::new();
        let batch = vec![
            candle("AAPL", 1000.0),
            Candle::new("AAPL", 2000.0, 100.0, 90.0, 95.0, 102.0, 1000.0),
        ];

        assert!(store.insert_batch(batch).await.is_err());
        assert!(store.load_candles("AAPL", None, 100).await.unwrap().is_empty());

        assert!(store.insert_batch(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_most_recent_ascending() {
        let store = MemoryStore::new();
        let batch: Vec<Candle> = (1..=5).map(|i| candle("AAPL", i as f64 * 1000.0)).collect();
        store.insert_batch(batch).await.unwrap();
        store.insert(candle("MSFT", 9000.0)).await.unwrap();

        let loaded = store.load_candles("AAPL", None, 3).await.unwrap();
        let timestamps: Vec<f64> = loaded.iter().map(|c| c.timestamp).collect();
        // most recent three, still ascending, other symbols excluded
        assert_eq!(timestamps, vec![3000.0, 4000.0, 5000.0]);
    }

    #[tokio::test]
    async fn test_load_range_filter() {
        let store = MemoryStore::new();
        let batch: Vec<Candle> = (1..=5).map(|i| candle("AAPL", i as f64 * 1000.0)).collect();
        store.insert_batch(batch).await.unwrap();

        let range = TimeRange {
            start: 2000.0,
            end: 4000.0,
        };
        let loaded = store.load_candles("AAPL", Some(range), 2).await.unwrap();
        let timestamps: Vec<f64> = loaded.iter().map(|c| c.timestamp).collect();
        // earliest candles inside the range, capped at the limit
        assert_eq!(timestamps, vec![2000.0, 3000.0]);
    }
}
