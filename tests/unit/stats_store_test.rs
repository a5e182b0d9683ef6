use chrono::NaiveDate;
use serde_json::json;
use xeyes::host::MemoryStorage;
use xeyes::managers::stats_store::StatsStore;
use xeyes::messaging::{StatsRequest, StatsResponse};
use xeyes::types::errors::{MessagingError, StorageErrorKind};
use xeyes::types::stats::StatsRecord;

fn sample(total_viewed: u64) -> StatsRecord {
    let mut record = StatsRecord::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    record.total_viewed = total_viewed;
    record.best_streak = 3;
    record.current_streak = 2;
    record
}

#[tokio::test]
async fn test_get_without_record_returns_null() {
    let store = StatsStore::new(MemoryStorage::new(), "stats");
    let response = store.handle(StatsRequest::Get).await;
    assert_eq!(response, StatsResponse::record(None));
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({"record": null}));
}

#[tokio::test]
async fn test_set_then_get_round_trips() {
    let store = StatsStore::new(MemoryStorage::new(), "stats");
    let record = sample(11);
    assert_eq!(
        store.handle(StatsRequest::Set { record: record.clone() }).await,
        StatsResponse::ack(true)
    );
    assert_eq!(
        store.handle(StatsRequest::Get).await,
        StatsResponse::record(Some(record))
    );
}

#[tokio::test]
async fn test_set_replaces_whole_record() {
    let storage = MemoryStorage::new();
    let store = StatsStore::new(storage.clone(), "stats");
    store.save(&sample(5)).await.unwrap();
    let replacement = StatsRecord::new(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    store.save(&replacement).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(replacement));
    assert_eq!(storage.raw("stats").unwrap()["bestStreak"], 0);
}

#[tokio::test]
async fn test_write_failure_reports_unsuccessful_ack() {
    let storage = MemoryStorage::new();
    storage.set_fail_writes(true);
    let store = StatsStore::new(storage, "stats");
    let response = store.handle(StatsRequest::Set { record: sample(1) }).await;
    assert_eq!(
        response,
        StatsResponse::Ack {
            success: false,
            error: Some(StorageErrorKind::Write)
        }
    );
}

#[tokio::test]
async fn test_read_failure_degrades_to_null_record() {
    let storage = MemoryStorage::new();
    let store = StatsStore::new(storage.clone(), "stats");
    store.save(&sample(1)).await.unwrap();
    storage.set_fail_reads(true);

    let response = store.handle(StatsRequest::Get).await;
    assert_eq!(
        response,
        StatsResponse::Record {
            record: None,
            error: Some(StorageErrorKind::Read)
        }
    );
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"record": null, "error": "read"})
    );
}

#[tokio::test]
async fn test_corrupt_record_degrades_to_null_record() {
    let storage = MemoryStorage::new();
    storage.insert_raw("stats", json!({"totalViewed": "many"}));
    let store = StatsStore::new(storage, "stats");
    assert_eq!(
        store.handle(StatsRequest::Get).await.error_kind(),
        Some(StorageErrorKind::Corrupt)
    );
}

#[tokio::test]
async fn test_request_decoded_from_wire_message() {
    let store = StatsStore::new(MemoryStorage::new(), "stats");
    let request: StatsRequest = serde_json::from_value(json!({
        "kind": "set",
        "record": {"totalViewed": 2, "lastDate": "2025-06-01"}
    }))
    .unwrap();
    assert_eq!(store.handle(request).await, StatsResponse::ack(true));
    let record = store.load().await.unwrap().unwrap();
    assert_eq!(record.total_viewed, 2);
}

#[tokio::test]
async fn test_acknowledged_set_is_visible_to_later_get_from_other_client() {
    let (writer, service) = StatsStore::new(MemoryStorage::new(), "stats").spawn(8);
    let reader = writer.clone();

    assert!(writer.set(sample(42)).await.unwrap());
    assert_eq!(reader.get().await.unwrap(), Some(sample(42)));
    service.abort();
}

#[tokio::test]
async fn test_concurrent_sets_are_last_write_wins() {
    let (client, service) = StatsStore::new(MemoryStorage::new(), "stats").spawn(8);
    let a = client.clone();
    let b = client.clone();
    let (ra, rb) = tokio::join!(a.set(sample(1)), b.set(sample(2)));
    assert!(ra.unwrap() && rb.unwrap());

    let stored = client.get().await.unwrap().unwrap();
    assert!(stored == sample(1) || stored == sample(2));
    service.abort();
}

#[tokio::test]
async fn test_many_queued_requests_all_answered() {
    let (client, service) = StatsStore::new(MemoryStorage::new(), "stats").spawn(2);
    let mut handles = Vec::new();
    for i in 0..20 {
        let c = client.clone();
        handles.push(tokio::spawn(async move { c.set(sample(i)).await }));
    }
    for h in handles {
        assert!(h.await.unwrap().unwrap());
    }
    service.abort();
}

#[tokio::test]
async fn test_stopped_service_reports_closed() {
    let (client, service) = StatsStore::new(MemoryStorage::new(), "stats").spawn(8);
    service.abort();
    let _ = service.await;
    assert!(matches!(client.get().await, Err(MessagingError::ServiceClosed)));
}
