use chrono::{NaiveDate, NaiveDateTime};
use foodbook_core::{
    Client, ClientFilter, Cost, DeliveryFilter, DeliveryStatus, EntityKind, FoodBook, ModelError,
    ModelManager, NewDelivery, Tag, ViewFilters,
};
use std::num::NonZeroUsize;

fn client(name: &str) -> Client {
    Client::new(name, "91234567", "client@example.com", "10 Market Road")
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .unwrap()
}

fn order(client_name: &str, cost: &str) -> NewDelivery {
    NewDelivery {
        client_name: client_name.to_string(),
        scheduled_at: at(1, 12),
        remarks: "nasi lemak".to_string(),
        cost: Cost::parse(cost).unwrap(),
        tag: None,
    }
}

fn manager_with(names: &[&str]) -> ModelManager {
    let mut manager = ModelManager::new();
    for name in names {
        manager.add_client(client(name)).unwrap();
    }
    manager
}

#[test]
fn first_delivery_gets_id_one() {
    let mut manager = manager_with(&["Alice"]);

    let id = manager.add_delivery(order("Alice", "10.0")).unwrap();

    assert_eq!(id, 1);
    let delivery = manager.find_delivery(1).unwrap();
    assert_eq!(delivery.cost, Cost::from_cents(1000));
    assert_eq!(delivery.status, DeliveryStatus::Undelivered);
    assert_eq!(delivery.client, client("Alice"));
}

#[test]
fn deleting_client_removes_its_deliveries() {
    let mut manager = manager_with(&["Alice", "Bob"]);
    manager.add_delivery(order("Alice", "5")).unwrap();

    let deleted = manager.delete_client(&client("Alice")).unwrap();

    assert_eq!(deleted.client.name, "Alice");
    assert_eq!(deleted.deliveries.len(), 1);
    assert!(manager.find_delivery(1).is_none());
    assert!(manager.current_delivery_view().is_empty());
    assert_eq!(manager.current_client_view().len(), 1);
}

#[test]
fn cascade_delete_leaves_no_delivery_for_client_under_any_filter() {
    let mut manager = manager_with(&["Alice", "Bob"]);
    manager.add_delivery(order("Alice", "1")).unwrap();
    manager.add_delivery(order("Bob", "2")).unwrap();
    manager.add_delivery(order("Alice", "3")).unwrap();
    manager.mark_delivered(3).unwrap();

    manager.delete_client(&client("Alice")).unwrap();

    for filter in [
        DeliveryFilter::All,
        DeliveryFilter::Client("Alice".to_string()),
        DeliveryFilter::Status(DeliveryStatus::Delivered),
        DeliveryFilter::ClientNameKeywords(vec!["alice".to_string()]),
    ] {
        manager.set_delivery_filter(filter);
        assert!(manager
            .current_delivery_view()
            .iter()
            .all(|delivery| delivery.client_name() != "Alice"));
    }
    assert_eq!(manager.food_book().deliveries().len(), 1);
}

#[test]
fn editing_client_propagates_to_deliveries() {
    let mut manager = manager_with(&["Alice", "Bob"]);
    manager.add_delivery(order("Alice", "4")).unwrap();
    manager.add_delivery(order("Bob", "4")).unwrap();

    let mut same_identity = client("Alice");
    same_identity.phone = "80000000".to_string();
    manager
        .edit_client(&client("Alice"), same_identity.clone())
        .unwrap();
    assert_eq!(manager.find_delivery(1).unwrap().client, same_identity);

    let mut renamed = same_identity.clone();
    renamed.name = "Alice Tan".to_string();
    let updated = manager.edit_client(&same_identity, renamed.clone()).unwrap();
    assert_eq!(updated, 1);
    assert_eq!(manager.find_delivery(1).unwrap().client, renamed);
    assert_eq!(manager.find_delivery(2).unwrap().client, client("Bob"));
    assert!(manager.find_client("Alice").is_none());
}

#[test]
fn editing_client_onto_existing_name_fails_without_changes() {
    let mut manager = manager_with(&["Alice", "Bob"]);
    manager.add_delivery(order("Alice", "4")).unwrap();
    let before = manager.snapshot();

    let err = manager
        .edit_client(&client("Alice"), client("Bob"))
        .unwrap_err();

    assert_eq!(
        err,
        ModelError::DuplicateIdentity {
            kind: EntityKind::Client,
            identity: "Bob".to_string()
        }
    );
    assert_eq!(manager.snapshot(), before);
}

#[test]
fn client_identity_is_case_sensitive() {
    let mut manager = manager_with(&["Alice Tan"]);

    manager.add_client(client("alice tan")).unwrap();
    let err = manager.add_client(client("Alice Tan")).unwrap_err();

    assert!(matches!(
        err,
        ModelError::DuplicateIdentity {
            kind: EntityKind::Client,
            ..
        }
    ));
    assert_eq!(manager.food_book().clients().len(), 2);
}

#[test]
fn undo_restores_book_and_returns_label() {
    let mut manager = manager_with(&["Alice"]);
    let before = manager.snapshot();

    manager.checkpoint("add Carl");
    manager.add_client(client("Carl")).unwrap();
    let label = manager.undo().unwrap();

    assert_eq!(label, "add Carl");
    assert!(manager.find_client("Carl").is_none());
    assert_eq!(manager.snapshot(), before);
}

#[test]
fn undo_restores_filters_captured_at_checkpoint() {
    let mut manager = manager_with(&["Alice", "Bob"]);
    manager.set_client_filter(ClientFilter::NameKeywords(vec!["bob".to_string()]));
    let filters_before = manager.view_filters().clone();

    manager.checkpoint("delete Bob");
    manager.set_client_filter(ClientFilter::All);
    manager.delete_client(&client("Bob")).unwrap();
    manager.undo().unwrap();

    assert_eq!(manager.view_filters(), &filters_before);
    let visible: Vec<&str> = manager
        .current_client_view()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(visible, vec!["Bob"]);
}

#[test]
fn one_checkpoint_covers_a_whole_cascade() {
    let mut manager = manager_with(&["Alice", "Bob"]);
    manager.add_delivery(order("Alice", "1")).unwrap();
    manager.add_delivery(order("Alice", "2")).unwrap();
    let before = manager.snapshot();

    manager
        .record("delete Alice", |m| m.delete_client(&client("Alice")))
        .unwrap();
    assert_eq!(manager.undo_depth(), 1);
    assert_eq!(manager.undo().unwrap(), "delete Alice");

    assert_eq!(manager.snapshot(), before);
    assert!(!manager.can_undo());
}

#[test]
fn reads_never_push_checkpoints_and_undo_stays_lifo() {
    let mut manager = manager_with(&["Alice"]);

    manager
        .record("add Bob", |m| m.add_client(client("Bob")))
        .unwrap();
    manager
        .record("add Carl", |m| m.add_client(client("Carl")))
        .unwrap();
    let _ = manager.find_client("Bob");
    let _ = manager.current_client_view();
    let _ = manager.current_delivery_view();

    assert_eq!(manager.undo_depth(), 2);
    assert_eq!(manager.undo().unwrap(), "add Carl");
    assert!(manager.find_client("Bob").is_some());
    assert_eq!(manager.undo().unwrap(), "add Bob");
    assert!(manager.find_client("Bob").is_none());
}

#[test]
fn add_delivery_for_unknown_client_leaves_store_unchanged() {
    let mut manager = manager_with(&["Alice"]);
    let before = manager.snapshot();

    let err = manager.add_delivery(order("Zed", "3")).unwrap_err();

    assert_eq!(
        err,
        ModelError::UnknownClientReference {
            client_name: "Zed".to_string()
        }
    );
    assert_eq!(manager.snapshot(), before);
    assert_eq!(manager.next_delivery_id().unwrap(), 1);
}

#[test]
fn delivery_ids_are_never_reused() {
    let mut manager = manager_with(&["Alice"]);
    assert_eq!(manager.add_delivery(order("Alice", "1")).unwrap(), 1);
    assert_eq!(manager.add_delivery(order("Alice", "1")).unwrap(), 2);

    let first = manager.find_delivery(1).cloned().unwrap();
    manager.delete_delivery(&first).unwrap();
    assert_eq!(manager.add_delivery(order("Alice", "1")).unwrap(), 3);

    let latest = manager.find_delivery(3).cloned().unwrap();
    manager.delete_delivery(&latest).unwrap();
    assert_eq!(manager.add_delivery(order("Alice", "1")).unwrap(), 4);
}

#[test]
fn undo_with_empty_history_changes_nothing() {
    let mut manager = manager_with(&["Alice"]);
    manager.set_delivery_filter(DeliveryFilter::Status(DeliveryStatus::Delivered));
    let before = manager.snapshot();
    let filters = manager.view_filters().clone();

    assert_eq!(manager.undo().unwrap_err(), ModelError::NoMoreUndo);
    assert_eq!(manager.snapshot(), before);
    assert_eq!(manager.view_filters(), &filters);
}

#[test]
fn mark_and_unmark_delivered_toggle_status() {
    let mut manager = manager_with(&["Alice"]);
    manager.add_delivery(order("Alice", "2.50")).unwrap();

    let marked = manager.mark_delivered(1).unwrap();
    assert!(marked.is_delivered());
    assert!(manager.find_delivery(1).unwrap().is_delivered());

    let unmarked = manager.unmark_delivered(1).unwrap();
    assert_eq!(unmarked.status, DeliveryStatus::Undelivered);

    let err = manager.mark_delivered(42).unwrap_err();
    assert_eq!(
        err,
        ModelError::NotFound {
            kind: EntityKind::Delivery,
            identity: "42".to_string()
        }
    );
}

#[test]
fn edit_delivery_requires_known_client_and_keeps_position() {
    let mut manager = manager_with(&["Alice", "Bob"]);
    manager.add_delivery(order("Alice", "1")).unwrap();
    manager.add_delivery(order("Alice", "2")).unwrap();
    let target = manager.find_delivery(1).cloned().unwrap();

    let mut moved = target.clone();
    moved.client = client("Bob");
    moved.remarks = "switch to Bob".to_string();
    moved.tag = Some(Tag::parse("priority").unwrap());
    manager.edit_delivery(&target, moved.clone()).unwrap();
    assert_eq!(manager.food_book().deliveries()[0], moved);

    let mut dangling = moved.clone();
    dangling.client = client("Ghost");
    let err = manager.edit_delivery(&moved, dangling).unwrap_err();
    assert!(matches!(err, ModelError::UnknownClientReference { .. }));
}

#[test]
fn views_follow_live_data_without_refiltering() {
    let mut manager = manager_with(&["Alice"]);
    manager.set_delivery_filter(DeliveryFilter::Status(DeliveryStatus::Delivered));
    manager.add_delivery(order("Alice", "1")).unwrap();
    assert!(manager.current_delivery_view().is_empty());

    manager.mark_delivered(1).unwrap();
    assert_eq!(manager.current_delivery_view().len(), 1);

    manager.add_client(client("Bob")).unwrap();
    manager.set_client_filter(ClientFilter::NameKeywords(vec!["BOB".to_string()]));
    assert_eq!(manager.current_client_view()[0].name, "Bob");
}

#[test]
fn bounded_history_keeps_newest_checkpoints() {
    let mut manager = ModelManager::with_history_limit(NonZeroUsize::new(2));
    for name in ["Ann", "Ben", "Cat"] {
        manager
            .record(format!("add {name}"), |m| m.add_client(client(name)))
            .unwrap();
    }

    assert_eq!(manager.undo_depth(), 2);
    assert_eq!(manager.undo().unwrap(), "add Cat");
    assert_eq!(manager.undo().unwrap(), "add Ben");
    assert_eq!(manager.undo().unwrap_err(), ModelError::NoMoreUndo);
    assert_eq!(manager.food_book().clients().len(), 1);
}

#[test]
fn reset_data_round_trips_through_fresh_store() {
    let mut original = manager_with(&["Alice", "Bob"]);
    original.add_delivery(order("Bob", "7.25")).unwrap();
    original.add_delivery(order("Alice", "3")).unwrap();
    original.mark_delivered(2).unwrap();

    let mut restored = ModelManager::new();
    restored.reset_data(&original.snapshot()).unwrap();

    assert_eq!(restored.food_book(), original.food_book());
    assert_eq!(restored.next_delivery_id().unwrap(), 3);
    assert_eq!(
        FoodBook::from_snapshot(&restored.snapshot()).unwrap(),
        *original.food_book()
    );
    assert_eq!(restored.view_filters(), &ViewFilters::default());
}

#[test]
fn edit_delivery_cannot_take_over_a_deleted_id() {
    let mut manager = manager_with(&["Alice"]);
    manager.add_delivery(order("Alice", "1")).unwrap();
    manager.add_delivery(order("Alice", "2")).unwrap();
    let first = manager.find_delivery(1).cloned().unwrap();
    manager.delete_delivery(&first).unwrap();
    let before = manager.snapshot();

    let second = manager.find_delivery(2).cloned().unwrap();
    let mut renumbered = second.clone();
    renumbered.id = 1;
    let err = manager.edit_delivery(&second, renumbered).unwrap_err();

    assert_eq!(
        err,
        ModelError::DeliveryIdChanged {
            target: 2,
            edited: 1
        }
    );
    assert_eq!(manager.snapshot(), before);
    assert!(manager.find_delivery(1).is_none());
}

#[test]
fn edit_delivery_stores_the_book_client_value() {
    let mut manager = manager_with(&["Alice"]);
    manager.add_delivery(order("Alice", "1")).unwrap();
    let target = manager.find_delivery(1).cloned().unwrap();

    let mut edited = target.clone();
    edited.client.phone = "99999999".to_string();
    edited.remarks = "extra chilli".to_string();
    manager.edit_delivery(&target, edited).unwrap();

    let stored = manager.find_delivery(1).unwrap();
    assert_eq!(stored.client, *manager.find_client("Alice").unwrap());
    assert_eq!(stored.client.phone, "91234567");
    assert_eq!(stored.remarks, "extra chilli");
}

#[test]
fn failed_record_at_history_limit_keeps_older_checkpoints() {
    let mut manager = ModelManager::with_history_limit(NonZeroUsize::new(2));
    manager
        .record("add Ann", |m| m.add_client(client("Ann")))
        .unwrap();
    manager
        .record("add Ben", |m| m.add_client(client("Ben")))
        .unwrap();
    let labels_before: Vec<String> = manager
        .history()
        .labels()
        .into_iter()
        .map(str::to_string)
        .collect();

    let err = manager
        .record("add Ann again", |m| m.add_client(client("Ann")))
        .unwrap_err();

    assert!(matches!(err, ModelError::DuplicateIdentity { .. }));
    assert_eq!(manager.history().labels(), labels_before);
    assert_eq!(manager.undo().unwrap(), "add Ben");
    assert_eq!(manager.undo().unwrap(), "add Ann");
}
