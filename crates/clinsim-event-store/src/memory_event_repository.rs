//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use clinsim_core::error::DomainError;
use clinsim_core::repository::{EventRepository, StoredEvent};

/// Process-lifetime event repository keyed by aggregate ID.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aggregate streams currently held.
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().await;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self.streams.write().await;
        let stream = streams.entry(aggregate_id).or_default();

        let actual = stream.len() as i64;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for (offset, event) in events.iter().enumerate() {
            let expected_sequence = expected_version + offset as i64 + 1;
            if event.sequence_number != expected_sequence {
                return Err(DomainError::Infrastructure(format!(
                    "event {} has sequence number {}, expected {expected_sequence}",
                    event.event_id, event.sequence_number
                )));
            }
        }

        stream.extend_from_slice(events);
        debug!(%aggregate_id, appended = events.len(), version = stream.len(), "events appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn stored_event(aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id,
            event_type: "session.started".to_owned(),
            payload: serde_json::json!({ "Started": { "session_id": aggregate_id } }),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_load_events_returns_empty_for_unknown_aggregate() {
        // Arrange
        let repo = InMemoryEventRepository::new();

        // Act
        let events = repo.load_events(Uuid::new_v4()).await.unwrap();

        // Assert
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_preserves_order() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let id = Uuid::new_v4();
        let first = stored_event(id, 1);
        let second = stored_event(id, 2);

        // Act
        repo.append_events(id, 0, &[first.clone()]).await.unwrap();
        repo.append_events(id, 1, &[second.clone()]).await.unwrap();
        let events = repo.load_events(id).await.unwrap();

        // Assert
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_id, first.event_id);
        assert_eq!(events[1].event_id, second.event_id);
        assert_eq!(repo.stream_count().await, 1);
    }

    #[tokio::test]
    async fn test_append_with_stale_version_is_rejected() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let id = Uuid::new_v4();
        repo.append_events(id, 0, &[stored_event(id, 1)]).await.unwrap();

        // Act
        let result = repo.append_events(id, 0, &[stored_event(id, 1)]).await;

        // Assert
        match result.unwrap_err() {
            DomainError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual,
            } => {
                assert_eq!(aggregate_id, id);
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
        assert_eq!(repo.load_events(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_with_gapped_sequence_is_rejected() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let id = Uuid::new_v4();

        // Act
        let result = repo.append_events(id, 0, &[stored_event(id, 3)]).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(repo.load_events(id).await.unwrap().is_empty());
    }
}
