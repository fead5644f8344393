use foodbook_core::{
    sample_food_book, EntityKind, FoodBookStorage, JsonFoodBookStorage, ModelError, ModelManager,
    StorageError,
};
use serde_json::Value;

const TWO_CLIENTS: &str = r#"{
  "clients": [
    { "name": "Alice", "phone": "91234567", "email": "alice@example.com", "address": "1 Food St", "tags": ["regular"] },
    { "name": "Bob", "phone": "98765432", "email": "bob@example.com", "address": "2 Food St" }
  ],
  "deliveries": [
    { "id": 4, "client_name": "Bob", "scheduled_at": "2024-07-01T12:30:00", "remarks": "laksa", "cost": "6.50" }
  ]
}"#;

fn storage_in(dir: &tempfile::TempDir) -> JsonFoodBookStorage {
    JsonFoodBookStorage::new(dir.path().join("data").join("foodbook.json"))
}

#[test]
fn missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);

    assert!(storage.read_food_book().unwrap().is_none());
    assert!(!storage.path().exists());
}

#[test]
fn save_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    let snapshot = sample_food_book();

    storage.save_food_book(&snapshot).unwrap();

    assert_eq!(storage.read_food_book().unwrap(), Some(snapshot));
}

#[test]
fn saved_document_stores_client_names_not_client_copies() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    storage.save_food_book(&sample_food_book()).unwrap();

    let raw = std::fs::read_to_string(storage.path()).unwrap();
    let document: Value = serde_json::from_str(&raw).unwrap();

    let first = &document["deliveries"][0];
    assert_eq!(first["client_name"], "Alex Yeoh");
    assert_eq!(first["cost"], "12.50");
    assert_eq!(first["status"], "delivered");
    assert!(first.get("client").is_none());
    assert_eq!(document["clients"].as_array().unwrap().len(), 3);
}

#[test]
fn hand_written_document_loads_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
    std::fs::write(storage.path(), TWO_CLIENTS).unwrap();

    let snapshot = storage.read_food_book().unwrap().unwrap();
    let manager = ModelManager::from_snapshot(&snapshot, None).unwrap();

    let delivery = manager.find_delivery(4).unwrap();
    assert_eq!(delivery.client, *manager.find_client("Bob").unwrap());
    assert!(!delivery.is_delivered());
    assert!(delivery.tag.is_none());
    assert_eq!(manager.next_delivery_id().unwrap(), 5);
}

#[test]
fn unknown_client_reference_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
    std::fs::write(storage.path(), TWO_CLIENTS.replace("\"Bob\", \"sch", "\"Zed\", \"sch"))
        .unwrap();

    let err = storage.read_food_book().unwrap_err();
    match err {
        StorageError::Model(ModelError::UnknownClientReference { client_name }) => {
            assert_eq!(client_name, "Zed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_client_names_fail_load() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
    std::fs::write(storage.path(), TWO_CLIENTS.replace("\"Bob\"", "\"Alice\"")).unwrap();

    let err = storage.read_food_book().unwrap_err();
    assert!(matches!(
        err,
        StorageError::Model(ModelError::DuplicateIdentity {
            kind: EntityKind::Client,
            ..
        })
    ));
}

#[test]
fn invalid_field_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
    std::fs::write(storage.path(), TWO_CLIENTS.replace("6.50", "6.505")).unwrap();

    let err = storage.read_food_book().unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

#[test]
fn malformed_json_is_an_error_not_an_empty_book() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
    std::fs::write(storage.path(), "{ \"clients\": [").unwrap();

    let err = storage.read_food_book().unwrap_err();
    assert!(matches!(err, StorageError::Json { .. }));
}

#[test]
fn zero_delivery_id_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    std::fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
    std::fs::write(storage.path(), TWO_CLIENTS.replace("\"id\": 4", "\"id\": 0")).unwrap();

    let err = storage.read_food_book().unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}
