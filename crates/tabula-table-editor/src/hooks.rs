//! Notification hooks
//!
//! The editing core never renders UI. Destructive actions ask
//! [`EditorHooks::on_before_destructive`] for a [`Confirmed`] token, and
//! completed mutations are reported through
//! [`EditorHooks::on_after_mutation`].

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tabula_core::{Result, TableId, TabulaError};
use uuid::Uuid;

use crate::events::{Notification, TableEditorEvent};

/// An action that loses data and needs explicit confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestructiveAction {
    /// Remove a table from the registry
    DeleteTable { id: TableId, name: String },
    /// Abandon a session's unsaved working copy
    DiscardChanges { session_id: Uuid, table_name: String },
}

impl DestructiveAction {
    pub fn title(&self) -> &'static str {
        match self {
            DestructiveAction::DeleteTable { .. } => "Delete table",
            DestructiveAction::DiscardChanges { .. } => "Discard changes",
        }
    }

    pub fn message(&self) -> String {
        match self {
            DestructiveAction::DeleteTable { name, .. } => format!(
                "Are you sure you want to delete \"{}\"? This cannot be undone.",
                name
            ),
            DestructiveAction::DiscardChanges { table_name, .. } => format!(
                "\"{}\" has unsaved changes. Leave without saving?",
                table_name
            ),
        }
    }
}

/// What the hook is asked to confirm
#[derive(Debug, Clone)]
pub struct ConfirmRequest {
    pub action: DestructiveAction,
    /// How long the confirm control stays disabled after the prompt opens
    pub cooldown: Duration,
}

impl ConfirmRequest {
    pub fn new(action: DestructiveAction, cooldown: Duration) -> Self {
        Self { action, cooldown }
    }

    /// Start the countdown for this request
    pub fn open_gate(&self) -> ConfirmationGate {
        ConfirmationGate::open(self.action.clone(), self.cooldown)
    }
}

/// Proof that the user accepted a destructive action.
///
/// Only obtainable from a [`ConfirmationGate`] whose cooldown has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    action: DestructiveAction,
}

impl Confirmed {
    pub fn action(&self) -> &DestructiveAction {
        &self.action
    }

    pub fn authorizes(&self, action: &DestructiveAction) -> bool {
        &self.action == action
    }
}

/// A confirmation prompt whose accept control unlocks after a cooldown
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    action: DestructiveAction,
    cooldown: Duration,
    opened_at: Instant,
}

impl ConfirmationGate {
    pub fn open(action: DestructiveAction, cooldown: Duration) -> Self {
        Self::open_at(action, cooldown, Instant::now())
    }

    pub fn open_at(action: DestructiveAction, cooldown: Duration, opened_at: Instant) -> Self {
        Self {
            action,
            cooldown,
            opened_at,
        }
    }

    pub fn action(&self) -> &DestructiveAction {
        &self.action
    }

    /// Time left before the prompt can be accepted
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.cooldown
            .saturating_sub(now.saturating_duration_since(self.opened_at))
    }

    pub fn can_confirm_at(&self, now: Instant) -> bool {
        self.remaining_at(now).is_zero()
    }

    pub fn confirm(&self) -> Result<Confirmed> {
        self.confirm_at(Instant::now())
    }

    pub fn confirm_at(&self, now: Instant) -> Result<Confirmed> {
        let remaining = self.remaining_at(now);
        if !remaining.is_zero() {
            return Err(TabulaError::CooldownActive { remaining });
        }
        Ok(Confirmed {
            action: self.action.clone(),
        })
    }
}

/// Notification collaborator
#[async_trait]
pub trait EditorHooks: Send + Sync {
    /// Ask the user to confirm a destructive action. `None` means declined.
    async fn on_before_destructive(&self, request: &ConfirmRequest) -> Option<Confirmed>;

    /// Called after each recorded event, with the alert it maps to
    fn on_after_mutation(&self, event: &TableEditorEvent, notification: Option<&Notification>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete_action() -> DestructiveAction {
        DestructiveAction::DeleteTable {
            id: TableId(7),
            name: "Orders".into(),
        }
    }

    #[test]
    fn test_gate_blocks_until_cooldown_elapsed() {
        let start = Instant::now();
        let gate = ConfirmationGate::open_at(delete_action(), Duration::from_secs(5), start);

        let early = start + Duration::from_secs(2);
        assert!(!gate.can_confirm_at(early));
        assert_eq!(gate.remaining_at(early), Duration::from_secs(3));
        assert!(matches!(
            gate.confirm_at(early),
            Err(TabulaError::CooldownActive { remaining }) if remaining == Duration::from_secs(3)
        ));

        let later = start + Duration::from_secs(5);
        let token = gate.confirm_at(later).unwrap();
        assert!(token.authorizes(&delete_action()));
    }

    #[test]
    fn test_zero_cooldown_confirms_immediately() {
        let request = ConfirmRequest::new(
            DestructiveAction::DiscardChanges {
                session_id: Uuid::new_v4(),
                table_name: "T".into(),
            },
            Duration::ZERO,
        );
        assert!(request.open_gate().confirm().is_ok());
    }

    #[test]
    fn test_token_only_authorizes_its_action() {
        let start = Instant::now();
        let token = ConfirmationGate::open_at(delete_action(), Duration::ZERO, start)
            .confirm_at(start)
            .unwrap();
        let other = DestructiveAction::DeleteTable {
            id: TableId(8),
            name: "Orders".into(),
        };
        assert!(!token.authorizes(&other));
    }

    #[test]
    fn test_messages_name_the_table() {
        assert!(delete_action().message().contains("\"Orders\""));
        assert_eq!(delete_action().title(), "Delete table");
    }
}
