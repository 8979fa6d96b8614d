// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn collection_is_ghost_prefixed_basename() {
    assert_eq!(collection_for(Path::new("/work/shop-api")), "ghost-shop-api");
    assert_eq!(collection_for(Path::new("/")), "ghost-repo");
}

#[tokio::test]
async fn fake_records_calls_in_order() {
    let fake = FakeSearchEngine::new();
    fake.index("ghost-x", Path::new("/tmp/completed")).await.unwrap();
    fake.search("ghost-x", "cart rounding", Some("area:cart"))
        .await
        .unwrap();
    fake.delete_collection("ghost-x").await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            "index ghost-x /tmp/completed".to_string(),
            "search ghost-x cart rounding tag=area:cart".to_string(),
            "delete ghost-x".to_string(),
        ]
    );
}

#[tokio::test]
async fn failing_fake_reports_unavailable() {
    let fake = FakeSearchEngine::failing();
    assert!(!fake.available().await);
    let err = fake.index("c", Path::new("/tmp")).await.unwrap_err();
    assert!(matches!(err, SearchError::Unavailable(_)));
}

#[tokio::test]
#[serial(semdex_env)]
async fn missing_binary_is_unavailable() {
    std::env::set_var("GHOST_SEMDEX_BIN", "/nonexistent/semdex");
    let engine = SemdexEngine::new();
    assert!(!engine.available().await);
    let err = engine
        .index("c", Path::new("/tmp"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Unavailable(_)));
    std::env::remove_var("GHOST_SEMDEX_BIN");
}
