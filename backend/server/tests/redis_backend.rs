//! Runs only when `REDIS_URL` points at a disposable Redis instance.
use std::time::Duration;

use sightings::{
    cache::{Cache, RedisCache},
    database::init_redis,
    geo::{NewRecord, Point, RecordKind},
    store::{RecordStore, RedisStore},
};

fn redis_url() -> Option<String> {
    std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty())
}

fn unique_prefix(test: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();

    format!("sightings-test-{test}-{nanos}")
}

#[tokio::test]
async fn redis_cache_deletes_matching_value_once_and_expires() {
    let Some(url) = redis_url() else {
        eprintln!("REDIS_URL not set, skipping");
        return;
    };
    let cache = RedisCache::new(init_redis(&url).await.expect("connect redis"));
    let key = format!("otp:{}@example.com", unique_prefix("cache"));

    cache
        .set(&key, "123456", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("123456"));
    assert!(!cache.delete_if_eq(&key, "111111").await.unwrap());
    assert!(cache.delete_if_eq(&key, "123456").await.unwrap());
    assert!(!cache.delete_if_eq(&key, "123456").await.unwrap());

    cache
        .set(&key, "654321", Duration::from_secs(1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(cache.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn redis_store_assigns_ids_and_lists_in_order() {
    let Some(url) = redis_url() else {
        eprintln!("REDIS_URL not set, skipping");
        return;
    };
    let store = RedisStore::new(
        init_redis(&url).await.expect("connect redis"),
        &unique_prefix("store"),
    );

    let mut created = Vec::new();
    for (label, lon) in [("Osprey", -63.5752), ("Heron", -63.58), ("Eagle", -63.59)] {
        created.push(
            store
                .create(
                    RecordKind::Sighting,
                    NewRecord {
                        label: label.to_string(),
                        location: Point::new(lon, 44.6488).unwrap(),
                    },
                )
                .await
                .unwrap(),
        );
    }

    assert_eq!(
        created.iter().map(|record| record.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(store.all(RecordKind::Sighting).await.unwrap(), created);
    assert!(
        store
            .all(RecordKind::ImportantLocation)
            .await
            .unwrap()
            .is_empty()
    );
}
