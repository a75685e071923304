//! Integration tests for TableEditService
//!
//! Drives sessions through the service against a real `TableStore` wrapped
//! in `FlakyRegistry`, with `RecordingHooks` standing in for the alert and
//! modal layer.

mod common;

use pretty_assertions::assert_eq;
use tabula_core::{CellValue, ColumnType, StructuralOp, TableId, TabulaError};
use tabula_services::{ServiceError, TableListFilter};
use tabula_table_editor::{
    AlertLevel, CellWrite, DestructiveAction, DragItem, TableEditorEvent, TableRegistry,
};

use common::{ConfirmPolicy, fixture};

// ============ listing ============

#[tokio::test]
async fn list_tables_all_and_mine() {
    let f = fixture(ConfirmPolicy::Accept);

    let all = f.service.list_tables(TableListFilter::All).await.unwrap();
    assert_eq!(all.len(), 2);

    let mine = f
        .service
        .list_tables(TableListFilter::OwnedBy("alice".into()))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Orders");
}

#[tokio::test]
async fn open_unknown_table_is_not_found() {
    let f = fixture(ConfirmPolicy::Accept);
    let result = f.service.open_table(TableId(42)).await;
    assert!(matches!(result, Err(ServiceError::TableNotFound(_))));
}

// ============ editing ============

#[tokio::test]
async fn locked_columns_reject_add_and_notify() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    f.service.edit(session, |s| s.enter_edit()).unwrap();
    f.service.edit(session, |s| s.set_columns_locked(true)).unwrap();
    f.hooks.clear();

    let result = f.service.edit(session, |s| s.add_column("X", ColumnType::Text));

    assert!(matches!(
        result,
        Err(ServiceError::Rejected(TabulaError::StructureLocked(StructuralOp::AddColumn)))
    ));
    let notifications = f.hooks.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, AlertLevel::Warning);
    assert_eq!(notifications[0].timer_secs, 3);

    let view = f.service.view(session).unwrap();
    assert_eq!(view.columns.len(), 2);
    assert!(view.columns_locked);
}

#[tokio::test]
async fn cell_edits_ignore_column_lock_and_respect_row_disable() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    let (row, name) = f
        .service
        .inspect(session, |s| (s.table().rows()[0].id, s.table().columns()[1].id))
        .unwrap();

    f.service.edit(session, |s| s.enter_edit()).unwrap();
    f.service.edit(session, |s| s.set_columns_locked(true)).unwrap();
    let write = f
        .service
        .edit(session, |s| s.set_cell(row, name, "B".into()))
        .unwrap();
    assert_eq!(write, CellWrite::Stored);

    f.service.edit(session, |s| s.toggle_row_disabled(row)).unwrap();
    let write = f
        .service
        .edit(session, |s| s.set_cell(row, name, "C".into()))
        .unwrap();
    assert_eq!(write, CellWrite::Disabled);

    let view = f.service.view(session).unwrap();
    assert_eq!(view.rows[0].cells[1].text, "B");
    assert!(view.rows[0].disabled);
    assert!(view.rows[0].cells[1].disabled);
}

#[tokio::test]
async fn viewing_session_rejects_edits() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();

    let result = f.service.edit(session, |s| s.add_row());

    assert!(matches!(result, Err(ServiceError::Rejected(TabulaError::ReadOnly))));
    assert!(!f.service.view(session).unwrap().dirty);
}

#[tokio::test]
async fn reorder_reports_success_alert() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    let name = f
        .service
        .inspect(session, |s| s.table().columns()[1].id)
        .unwrap();
    f.service.edit(session, |s| s.enter_edit()).unwrap();

    f.service
        .edit(session, |s| {
            s.begin_drag(DragItem::Column(name))?;
            s.drop_at(0)
        })
        .unwrap();

    let view = f.service.view(session).unwrap();
    assert_eq!(view.columns[0].name, "Name");
    let alert = f.hooks.notifications().pop().unwrap();
    assert_eq!(alert.title, "Reordered");
    assert_eq!(alert.timer_secs, 2);
}

#[tokio::test]
async fn sorted_view_leaves_stored_order() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    let name = f
        .service
        .inspect(session, |s| s.table().columns()[1].id)
        .unwrap();
    f.service.edit(session, |s| s.enter_edit()).unwrap();
    f.service
        .edit(session, |s| {
            let row = s.add_row()?;
            s.set_cell(row, name, CellValue::text("0"))
        })
        .unwrap();

    f.service.edit(session, |s| s.toggle_sort(name)).unwrap();
    let view = f.service.view(session).unwrap();
    let names: Vec<_> = view.rows.iter().map(|r| r.cells[1].text.clone()).collect();
    assert_eq!(names, vec!["0", "A"]);

    let stored_first = f
        .service
        .inspect(session, |s| s.table().rows()[0].get(name).to_string())
        .unwrap();
    assert_eq!(stored_first, "A");
}

// ============ save ============

#[tokio::test]
async fn save_new_table_registers_it() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.new_table();
    f.service.edit(session, |s| s.rename_table("Inventory")).unwrap();

    let id = f.service.save(session).await.unwrap();

    assert_eq!(id, TableId(3));
    let stored = f.registry.get(id).await.unwrap();
    assert_eq!(stored.name, "Inventory");
    assert_eq!(stored.owner, "alice");

    let view = f.service.view(session).unwrap();
    assert_eq!(view.table_id, Some(id));
    assert!(!view.editing);
    assert!(!view.dirty);
    assert!(f.hooks.events().contains(&TableEditorEvent::Saved {
        table_id: id,
        created: true,
    }));
}

#[tokio::test]
async fn save_existing_overwrites_record_with_overlay() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    let (row, id_col) = f
        .service
        .inspect(session, |s| (s.table().rows()[0].id, s.table().columns()[0].id))
        .unwrap();
    f.service.edit(session, |s| s.enter_edit()).unwrap();
    f.service
        .edit(session, |s| s.toggle_cell_disabled(row, id_col))
        .unwrap();
    let working = f
        .service
        .inspect(session, |s| s.table().clone())
        .unwrap();

    f.service.save(session).await.unwrap();

    assert_eq!(f.registry.get(TableId(1)).await.unwrap(), working);
    assert!(f.registry.call_log().contains(&"replace 1".to_string()));
    assert_eq!(f.registry.get(TableId(2)).await.unwrap().name, "Stock");
}

#[tokio::test]
async fn failed_save_keeps_session_editing() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    f.service.edit(session, |s| s.enter_edit()).unwrap();
    f.service
        .edit(session, |s| s.add_column("Notes", ColumnType::Text))
        .unwrap();
    f.registry.set_failing(true);

    let result = f.service.save(session).await;

    assert!(matches!(result, Err(ServiceError::SaveFailed(TabulaError::Storage(_)))));
    let view = f.service.view(session).unwrap();
    assert!(view.editing);
    assert!(view.dirty);
    assert!(!view.saving);
    assert_eq!(view.columns.len(), 3);
    let alert = f.hooks.notifications().pop().unwrap();
    assert_eq!(alert.level, AlertLevel::Error);

    f.registry.set_failing(false);
    f.service.save(session).await.unwrap();
    assert_eq!(f.registry.get(TableId(1)).await.unwrap().columns().len(), 3);
}

#[tokio::test]
async fn save_in_viewing_mode_is_rejected() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    let result = f.service.save(session).await;
    assert!(matches!(result, Err(ServiceError::Rejected(TabulaError::ReadOnly))));
    assert!(!f.registry.call_log().iter().any(|c| c.starts_with("replace")));
}

// ============ close ============

#[tokio::test]
async fn clean_session_closes_without_prompt() {
    let f = fixture(ConfirmPolicy::Decline);
    let session = f.service.open_table(TableId(1)).await.unwrap();

    f.service.close_session(session).await.unwrap();

    assert_eq!(f.hooks.prompt_count(), 0);
    assert!(matches!(
        f.service.view(session),
        Err(ServiceError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn dirty_session_requires_discard_confirmation() {
    let f = fixture(ConfirmPolicy::Decline);
    let session = f.service.new_table();

    let declined = f.service.close_session(session).await;
    assert!(matches!(declined, Err(ServiceError::Cancelled)));
    assert!(f.service.view(session).is_ok());

    f.hooks.set_policy(ConfirmPolicy::AcceptImmediately);
    f.service.close_session(session).await.unwrap();

    assert!(f.service.session_ids().is_empty());
    assert!(f.hooks.events().contains(&TableEditorEvent::Discarded));
    assert_eq!(f.registry.inner.len(), 2);
}

// ============ delete ============

#[tokio::test]
async fn delete_waits_for_cooldown() {
    let f = fixture(ConfirmPolicy::AcceptImmediately);

    let result = f.service.delete_table(TableId(2)).await;

    assert!(matches!(result, Err(ServiceError::Cancelled)));
    assert!(f.registry.get(TableId(2)).await.is_ok());
    let prompt = f.hooks.prompts.lock()[0].clone();
    assert_eq!(prompt.cooldown.as_secs(), 5);
    assert!(matches!(
        prompt.action,
        DestructiveAction::DeleteTable { id: TableId(2), ref name } if name == "Stock"
    ));
}

#[tokio::test]
async fn confirmed_delete_removes_table() {
    let f = fixture(ConfirmPolicy::Accept);

    f.service.delete_table(TableId(2)).await.unwrap();

    assert!(matches!(
        f.registry.get(TableId(2)).await,
        Err(TabulaError::NotFound(_))
    ));
    let alert = f.hooks.notifications().pop().unwrap();
    assert_eq!(alert.title, "Deleted");
    assert_eq!(alert.level, AlertLevel::Success);
}

#[tokio::test]
async fn delete_unknown_table_does_not_prompt() {
    let f = fixture(ConfirmPolicy::Accept);
    let result = f.service.delete_table(TableId(9)).await;
    assert!(matches!(result, Err(ServiceError::TableNotFound(_))));
    assert_eq!(f.hooks.prompt_count(), 0);
}

#[tokio::test]
async fn save_after_table_deleted_reports_not_found() {
    let f = fixture(ConfirmPolicy::Accept);
    let session = f.service.open_table(TableId(1)).await.unwrap();
    f.service.edit(session, |s| s.enter_edit()).unwrap();
    f.service.delete_table(TableId(1)).await.unwrap();

    let result = f.service.save(session).await;

    assert!(matches!(result, Err(ServiceError::SaveFailed(TabulaError::NotFound(_)))));
    assert!(f.service.view(session).unwrap().editing);
}
