//! Durable storage for sightings and important locations.
//!
//! Both backends hand out ids per kind starting at 1 and list records in
//! ascending id order.
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use redis::{AsyncCommands, RedisError, aio::ConnectionManager};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::geo::{NewRecord, Record, RecordKind};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, kind: RecordKind, record: NewRecord) -> Result<Record, StoreError>;

    async fn all(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError>;
}

pub struct RedisStore {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager, prefix: &str) -> Self {
        Self {
            connection,
            prefix: prefix.to_string(),
        }
    }

    fn records_key(&self, kind: RecordKind) -> String {
        format!("{}:{}", self.prefix, kind.collection())
    }

    fn next_id_key(&self, kind: RecordKind) -> String {
        format!("{}:{}:next_id", self.prefix, kind.collection())
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn create(&self, kind: RecordKind, record: NewRecord) -> Result<Record, StoreError> {
        let mut connection = self.connection.clone();

        let id: u64 = connection.incr(self.next_id_key(kind), 1).await?;
        let record = record.into_record(id);

        let _: () = connection
            .hset(self.records_key(kind), id, serde_json::to_string(&record)?)
            .await?;

        Ok(record)
    }

    async fn all(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: HashMap<u64, String> = connection.hgetall(self.records_key(kind)).await?;

        let mut records = raw
            .values()
            .map(|json| serde_json::from_str::<Record>(json))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|record| record.id);

        Ok(records)
    }
}

#[derive(Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Record>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<RecordKind, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record as-is, keeping its id. Later `create` calls continue
    /// after the highest id seen.
    pub async fn insert(&self, kind: RecordKind, record: Record) {
        let mut tables = self.tables.lock().await;
        let table = tables.entry(kind).or_default();

        table.next_id = table.next_id.max(record.id);
        table.rows.insert(record.id, record);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, kind: RecordKind, record: NewRecord) -> Result<Record, StoreError> {
        let mut tables = self.tables.lock().await;
        let table = tables.entry(kind).or_default();

        table.next_id += 1;
        let record = record.into_record(table.next_id);
        table.rows.insert(record.id, record.clone());

        Ok(record)
    }

    async fn all(&self, kind: RecordKind) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .get(&kind)
            .map(|table| table.rows.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Point;

    fn new_record(label: &str) -> NewRecord {
        NewRecord {
            label: label.to_string(),
            location: Point::new(-63.5752, 44.6488).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_per_kind() {
        let store = MemoryStore::new();

        let osprey = store
            .create(RecordKind::Sighting, new_record("Osprey"))
            .await
            .unwrap();
        let heron = store
            .create(RecordKind::Sighting, new_record("Heron"))
            .await
            .unwrap();
        let trail = store
            .create(RecordKind::ImportantLocation, new_record("Trailhead"))
            .await
            .unwrap();

        assert_eq!((osprey.id, heron.id, trail.id), (1, 2, 1));

        let sightings = store.all(RecordKind::Sighting).await.unwrap();
        assert_eq!(sightings, vec![osprey, heron]);
    }

    #[tokio::test]
    async fn test_insert_advances_ids() {
        let store = MemoryStore::new();
        store
            .insert(
                RecordKind::Sighting,
                Record {
                    id: 10,
                    label: "Legacy".to_string(),
                    location: None,
                },
            )
            .await;

        let created = store
            .create(RecordKind::Sighting, new_record("Osprey"))
            .await
            .unwrap();

        assert_eq!(created.id, 11);
        assert_eq!(store.all(RecordKind::Sighting).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_kind_lists_nothing() {
        let store = MemoryStore::new();

        assert!(
            store
                .all(RecordKind::ImportantLocation)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
