//! Application initialization
//!
//! Builds the table store and the editing service from settings.

use anyhow::Context;
use std::sync::Arc;
use tabula_registry::TableStore;
use tabula_services::{EditorHooks, ServiceSettings, TableEditService};
use tabula_settings::TabulaSettings;

/// Application-wide state shared by every command
pub struct AppState {
    /// Settings the application was started with
    pub settings: TabulaSettings,

    /// Persistent table registry
    pub store: Arc<TableStore>,

    /// Table editing service
    pub service: Arc<TableEditService>,
}

/// Translate user settings into service settings
pub fn service_settings(settings: &TabulaSettings) -> ServiceSettings {
    ServiceSettings {
        alerts: settings.alerts.clone(),
        strict_types: settings.editor.strict_types,
        default_owner: settings.editor.default_owner.clone(),
        new_table_name: settings.editor.new_table_name.clone(),
    }
}

/// Load the tables file and wire up the service
#[tracing::instrument(skip_all)]
pub async fn bootstrap(
    settings: TabulaSettings,
    hooks: Arc<dyn EditorHooks>,
) -> anyhow::Result<AppState> {
    let tables_file = settings.storage.resolve_tables_file()?;
    let store = Arc::new(TableStore::with_storage_path(tables_file.clone()));
    store
        .load_from_storage()
        .await
        .with_context(|| format!("Failed to load tables from {:?}", tables_file))?;

    tracing::info!(
        tables = store.len(),
        path = %tables_file.display(),
        "table store ready"
    );

    let service = Arc::new(TableEditService::new(
        store.clone(),
        hooks,
        service_settings(&settings),
    ));

    Ok(AppState {
        settings,
        store,
        service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::ConsoleHooks;
    use pretty_assertions::assert_eq;
    use tabula_services::TableListFilter;

    fn settings_in(dir: &tempfile::TempDir) -> TabulaSettings {
        let mut settings = TabulaSettings::default();
        settings.storage.tables_file = Some(dir.path().join("tables.json"));
        settings.editor.default_owner = "alice".into();
        settings
    }

    #[tokio::test]
    async fn test_bootstrap_without_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = bootstrap(settings_in(&dir), Arc::new(ConsoleHooks::new(true)))
            .await
            .unwrap();

        assert!(state.store.is_empty());
        assert_eq!(state.service.settings().default_owner, "alice");
    }

    #[tokio::test]
    async fn test_saved_table_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let state = bootstrap(settings_in(&dir), Arc::new(ConsoleHooks::new(true)))
            .await
            .unwrap();
        let session = state.service.new_table();
        state
            .service
            .edit(session, |s| s.rename_table("Inventory"))
            .unwrap();
        state.service.save(session).await.unwrap();

        let restarted = bootstrap(settings_in(&dir), Arc::new(ConsoleHooks::new(true)))
            .await
            .unwrap();
        let tables = restarted
            .service
            .list_tables(TableListFilter::OwnedBy("alice".into()))
            .await
            .unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "Inventory");
    }

    #[tokio::test]
    async fn test_corrupt_tables_file_fails_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tables.json"), "{ broken").unwrap();

        let result = bootstrap(settings_in(&dir), Arc::new(ConsoleHooks::new(true))).await;

        let err = result.err().unwrap();
        assert!(err.to_string().contains("Failed to load tables"));
    }
}
