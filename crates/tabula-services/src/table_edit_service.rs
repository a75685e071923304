//! Table editing service
//!
//! Owns the open edit sessions and wires them to the table registry and the
//! notification hooks.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tabula_core::{TableId, TabulaError};
use tabula_table_editor::{
    AlertTimers, ConfirmRequest, DestructiveAction, EditSession, EditorHooks, Notification,
    TableEditorEvent, TableLoader, TableRegistry, TableSummary,
};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::view_models::TableView;

/// Settings consumed by [`TableEditService`]
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub alerts: AlertTimers,
    /// Reject cell values that do not fit their column's type
    pub strict_types: bool,
    /// Owner recorded on tables created through this service
    pub default_owner: String,
    /// Name given to new tables
    pub new_table_name: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            alerts: AlertTimers::default(),
            strict_types: false,
            default_owner: "local".to_string(),
            new_table_name: "New table".to_string(),
        }
    }
}

/// Which tables to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableListFilter {
    All,
    OwnedBy(String),
}

/// Service for viewing and editing tables
///
/// Handles:
/// - Table listing ("all tables" and "my tables")
/// - Opening sessions on stored or new tables
/// - Routing mutations and reporting them through [`EditorHooks`]
/// - Serialised saves and confirmed destructive actions
pub struct TableEditService {
    registry: Arc<dyn TableRegistry>,
    hooks: Arc<dyn EditorHooks>,
    settings: ServiceSettings,
    sessions: Mutex<HashMap<Uuid, EditSession>>,
}

impl TableEditService {
    /// Create a new table edit service
    pub fn new(
        registry: Arc<dyn TableRegistry>,
        hooks: Arc<dyn EditorHooks>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            registry,
            hooks,
            settings,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<dyn TableRegistry> {
        &self.registry
    }

    /// List stored tables
    #[tracing::instrument(skip(self))]
    pub async fn list_tables(&self, filter: TableListFilter) -> ServiceResult<Vec<TableSummary>> {
        let tables = match filter {
            TableListFilter::All => self.registry.list().await,
            TableListFilter::OwnedBy(ref owner) => self.registry.list_owned_by(owner).await,
        }
        .map_err(ServiceError::RegistryFailed)?;

        tracing::debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }

    /// Open a session on a stored table, in viewing mode
    #[tracing::instrument(skip(self), fields(table_id = %id))]
    pub async fn open_table(&self, id: TableId) -> ServiceResult<Uuid> {
        let session = TableLoader::open(self.registry.as_ref(), id)
            .await
            .map_err(ServiceError::from_lookup)?
            .with_strict_types(self.settings.strict_types);
        Ok(self.insert_session(session))
    }

    /// Open a session on a new table from the template, in editing mode
    pub fn new_table(&self) -> Uuid {
        let session = TableLoader::new_table(
            self.settings.new_table_name.clone(),
            self.settings.default_owner.clone(),
        )
        .with_strict_types(self.settings.strict_types);
        self.insert_session(session)
    }

    fn insert_session(&self, session: EditSession) -> Uuid {
        let id = session.id();
        tracing::debug!(session_id = %id, table_id = ?session.origin(), "session opened");
        self.sessions.lock().insert(id, session);
        id
    }

    /// Ids of all open sessions
    pub fn session_ids(&self) -> Vec<Uuid> {
        self.sessions.lock().keys().copied().collect()
    }

    /// Render-ready snapshot of a session
    pub fn view(&self, session_id: Uuid) -> ServiceResult<TableView> {
        self.inspect(session_id, |s| TableView::from(s))
    }

    /// Read a session without changing it
    pub fn inspect<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&EditSession) -> R,
    ) -> ServiceResult<R> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(&session_id)
            .ok_or(ServiceError::SessionNotFound(session_id))?;
        Ok(f(session))
    }

    /// Run one operation against a session.
    ///
    /// Events the operation records are passed to the hooks once the session
    /// is released. An error is reported as a rejection and returned; the
    /// session is left as it was before the call.
    pub fn edit<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut EditSession) -> tabula_core::Result<R>,
    ) -> ServiceResult<R> {
        let (result, events) = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .get_mut(&session_id)
                .ok_or(ServiceError::SessionNotFound(session_id))?;
            let result = f(session);
            (result, session.take_events())
        };

        self.dispatch(&events);
        result.map_err(|e| {
            tracing::debug!(session_id = %session_id, error = %e, "edit rejected");
            self.notify(&TableEditorEvent::rejected(&e));
            ServiceError::Rejected(e)
        })
    }

    /// Save a session's working copy.
    ///
    /// The session is locked only to start and finish the save; while the
    /// registry round trip is pending, further edits and saves on the
    /// session fail with `SaveInFlight`.
    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn save(&self, session_id: Uuid) -> ServiceResult<TableId> {
        let request = self.edit(session_id, |session| session.begin_save())?;

        let result = request.execute(self.registry.as_ref()).await;

        let (finished, events) = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .get_mut(&session_id)
                .ok_or(ServiceError::SessionNotFound(session_id))?;
            let finished = session.finish_save(result);
            (finished, session.take_events())
        };

        self.dispatch(&events);
        finished.map_err(|e| {
            if e.is_persistence_failure() {
                tracing::error!(error = %e, "save failed");
            } else {
                tracing::warn!(error = %e, "save rejected by registry");
            }
            let message = format!("Failed to save table: {}", e);
            self.hooks.on_after_mutation(
                &TableEditorEvent::Rejected {
                    message: message.clone(),
                },
                Some(&Notification::error(message, &self.settings.alerts)),
            );
            ServiceError::SaveFailed(e)
        })
    }

    /// Close a session.
    ///
    /// A session with unsaved changes asks the hooks to confirm discarding
    /// them first. Declining keeps the session open and returns `Cancelled`.
    #[tracing::instrument(skip(self), fields(session_id = %session_id))]
    pub async fn close_session(&self, session_id: Uuid) -> ServiceResult<()> {
        let action = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .get(&session_id)
                .ok_or(ServiceError::SessionNotFound(session_id))?;
            if session.is_saving() {
                return Err(ServiceError::Rejected(TabulaError::SaveInFlight));
            }
            if !session.is_dirty() {
                sessions.remove(&session_id);
                tracing::debug!("clean session closed");
                return Ok(());
            }
            DestructiveAction::DiscardChanges {
                session_id,
                table_name: session.table().name.clone(),
            }
        };

        self.confirm(action, Duration::ZERO).await?;

        let removed = self.sessions.lock().remove(&session_id);
        if removed.is_none() {
            return Err(ServiceError::SessionNotFound(session_id));
        }
        tracing::info!("unsaved changes discarded");
        self.notify(&TableEditorEvent::Discarded);
        Ok(())
    }

    /// Delete a stored table after a confirmation with cooldown
    #[tracing::instrument(skip(self), fields(table_id = %table_id))]
    pub async fn delete_table(&self, table_id: TableId) -> ServiceResult<()> {
        let table = self
            .registry
            .get(table_id)
            .await
            .map_err(ServiceError::from_lookup)?;

        let action = DestructiveAction::DeleteTable {
            id: table_id,
            name: table.name.clone(),
        };
        let cooldown = Duration::from_secs(self.settings.alerts.delete_cooldown_secs);
        self.confirm(action, cooldown).await?;

        if let Err(e) = self.registry.delete(table_id).await {
            tracing::error!(error = %e, "delete failed");
            self.hooks.on_after_mutation(
                &TableEditorEvent::rejected(&e),
                Some(&Notification::error(
                    format!("Failed to delete table: {}", e),
                    &self.settings.alerts,
                )),
            );
            return Err(match e {
                TabulaError::NotFound(what) => ServiceError::TableNotFound(what),
                other => ServiceError::DeleteFailed(other),
            });
        }

        tracing::info!("table deleted");
        self.notify(&TableEditorEvent::Deleted {
            table_id,
            name: table.name,
        });
        Ok(())
    }

    /// Ask the hooks to confirm `action`; only a token for this exact action
    /// counts as consent.
    async fn confirm(&self, action: DestructiveAction, cooldown: Duration) -> ServiceResult<()> {
        let request = ConfirmRequest::new(action, cooldown);
        match self.hooks.on_before_destructive(&request).await {
            Some(token) if token.authorizes(&request.action) => Ok(()),
            Some(_) => {
                tracing::warn!(action = request.action.title(), "confirmation for another action");
                Err(ServiceError::Cancelled)
            }
            None => {
                tracing::debug!(action = request.action.title(), "destructive action declined");
                Err(ServiceError::Cancelled)
            }
        }
    }

    fn dispatch(&self, events: &[TableEditorEvent]) {
        for event in events {
            self.notify(event);
        }
    }

    fn notify(&self, event: &TableEditorEvent) {
        let notification = event.notification(&self.settings.alerts);
        self.hooks.on_after_mutation(event, notification.as_ref());
    }
}
