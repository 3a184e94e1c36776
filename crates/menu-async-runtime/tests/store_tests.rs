use menu_async_runtime::*;
use tempfile::TempDir;

fn sample_document() -> Document {
    let template = Template::classic();
    let mut document = Document::for_template(&template).unwrap();
    let page = document.pages()[0].id;
    let drinks = document.create_category("Drinks");
    document.assign_category(drinks, Some(page)).unwrap();
    document
        .add_item(drinks, NewItem::new("Lemonade", 3.5).featured())
        .unwrap();
    document
}

#[tokio::test]
async fn test_json_dir_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = JsonDirStore::new(dir.path().join("menus"));
    let document = sample_document();

    assert!(store.list().await.unwrap().is_empty());
    store.save("summer", &document).await.unwrap();
    store.save("winter", &document).await.unwrap();

    assert_eq!(store.load("summer").await.unwrap(), document);
    assert_eq!(
        store.list().await.unwrap(),
        vec!["summer".to_string(), "winter".to_string()]
    );

    let json = std::fs::read_to_string(dir.path().join("menus/summer.json")).unwrap();
    assert!(json.contains("\"Lemonade\""));

    assert!(store.delete("summer").await.unwrap());
    assert!(!store.delete("summer").await.unwrap());
    assert!(matches!(store.load("summer").await, Err(RuntimeError::NotFound(_))));
}

#[tokio::test]
async fn test_json_dir_store_rejects_bad_ids() {
    let dir = TempDir::new().unwrap();
    let store = JsonDirStore::new(dir.path());
    let result = store.save("../outside", &sample_document()).await;
    assert!(matches!(result, Err(RuntimeError::InvalidId(_))));
}

#[tokio::test]
async fn test_json_dir_store_reports_corrupt_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let store = JsonDirStore::new(dir.path());

    match store.load("broken").await {
        Err(RuntimeError::Store(message)) => assert!(message.contains("broken")),
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_open_session_starts_new_document() {
    let store = MemoryStore::new();
    let session = open_session(&store, "fresh", Template::bistro(), SessionOptions::default())
        .await
        .unwrap();
    assert_eq!(session.document().pages().len(), 1);
    assert_eq!(session.document().template_id(), "bistro");
}

#[tokio::test]
async fn test_open_session_normalizes_stored_document() {
    let store = MemoryStore::new();
    let mut document = sample_document();
    document.create_page_with_variant(VariantId::from("retired"));
    store.save("old", &document).await.unwrap();

    let session = open_session(&store, "old", Template::classic(), SessionOptions::default())
        .await
        .unwrap();
    assert_eq!(session.document().pages()[1].variant_id, VariantId::from("cover"));
    assert!(session.is_dirty());
}
