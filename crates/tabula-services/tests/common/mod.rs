//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tabula_core::{ColumnType, Result, TableId, TabulaError};
use tabula_registry::TableStore;
use tabula_services::{ServiceSettings, TableEditService};
use tabula_table_editor::{
    ConfirmRequest, Confirmed, EditorHooks, Notification, Table, TableDraft, TableEditorEvent,
    TableRegistry, TableSummary,
};

/// How the mock user answers confirmation prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// Wait out the cooldown, then accept
    Accept,
    /// Click accept as soon as the prompt opens
    AcceptImmediately,
    Decline,
}

/// Hooks that record everything they are told
pub struct RecordingHooks {
    pub policy: Mutex<ConfirmPolicy>,
    pub prompts: Mutex<Vec<ConfirmRequest>>,
    pub events: Mutex<Vec<(TableEditorEvent, Option<Notification>)>>,
}

impl RecordingHooks {
    pub fn new(policy: ConfirmPolicy) -> Self {
        Self {
            policy: Mutex::new(policy),
            prompts: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn set_policy(&self, policy: ConfirmPolicy) {
        *self.policy.lock() = policy;
    }

    pub fn events(&self) -> Vec<TableEditorEvent> {
        self.events.lock().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .lock()
            .iter()
            .filter_map(|(_, n)| n.clone())
            .collect()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.prompts.lock().clear();
    }
}

#[async_trait]
impl EditorHooks for RecordingHooks {
    async fn on_before_destructive(&self, request: &ConfirmRequest) -> Option<Confirmed> {
        self.prompts.lock().push(request.clone());
        let gate = request.open_gate();
        let policy = *self.policy.lock();
        match policy {
            ConfirmPolicy::Accept => gate.confirm_at(Instant::now() + request.cooldown).ok(),
            ConfirmPolicy::AcceptImmediately => gate.confirm().ok(),
            ConfirmPolicy::Decline => None,
        }
    }

    fn on_after_mutation(&self, event: &TableEditorEvent, notification: Option<&Notification>) {
        self.events
            .lock()
            .push((event.clone(), notification.cloned()));
    }
}

/// Registry wrapper whose writes can be made to fail, with a call log
pub struct FlakyRegistry {
    pub inner: TableStore,
    pub fail_writes: Mutex<bool>,
    pub call_log: Arc<Mutex<Vec<String>>>,
}

impl FlakyRegistry {
    pub fn new(inner: TableStore) -> Self {
        Self {
            inner,
            fail_writes: Mutex::new(false),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        *self.fail_writes.lock() = failing;
    }

    pub fn call_log(&self) -> Vec<String> {
        self.call_log.lock().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.call_log.lock().push(call.into());
    }

    fn check_writable(&self) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(TabulaError::Storage("registry unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TableRegistry for FlakyRegistry {
    async fn list(&self) -> Result<Vec<TableSummary>> {
        self.log("list");
        self.inner.list().await
    }

    async fn get(&self, id: TableId) -> Result<Table> {
        self.log(format!("get {}", id));
        self.inner.get(id).await
    }

    async fn create(&self, draft: TableDraft) -> Result<Table> {
        self.log("create");
        self.check_writable()?;
        self.inner.create(draft).await
    }

    async fn replace(&self, id: TableId, table: Table) -> Result<Table> {
        self.log(format!("replace {}", id));
        self.check_writable()?;
        self.inner.replace(id, table).await
    }

    async fn delete(&self, id: TableId) -> Result<()> {
        self.log(format!("delete {}", id));
        self.check_writable()?;
        self.inner.delete(id).await
    }
}

/// `Orders` (alice) with `ID:number`, `Name:text` and one row `{1, "A"}`,
/// plus `Stock` (bob)
pub fn seed_tables() -> Vec<Table> {
    let mut orders = Table::with_columns(
        "Orders",
        "alice",
        [("ID", ColumnType::Number), ("Name", ColumnType::Text)],
    )
    .unwrap();
    let row = orders.add_row();
    let id_col = orders.columns()[0].id;
    let name_col = orders.columns()[1].id;
    orders.set_cell(row, id_col, 1i64.into()).unwrap();
    orders.set_cell(row, name_col, "A".into()).unwrap();

    vec![orders, Table::starter("Stock", "bob")]
}

pub struct Fixture {
    pub registry: Arc<FlakyRegistry>,
    pub hooks: Arc<RecordingHooks>,
    pub service: TableEditService,
}

pub fn fixture(policy: ConfirmPolicy) -> Fixture {
    let registry = Arc::new(FlakyRegistry::new(TableStore::with_tables(seed_tables())));
    let hooks = Arc::new(RecordingHooks::new(policy));
    let settings = ServiceSettings {
        default_owner: "alice".to_string(),
        ..ServiceSettings::default()
    };
    let service = TableEditService::new(registry.clone(), hooks.clone(), settings);
    Fixture {
        registry,
        hooks,
        service,
    }
}
