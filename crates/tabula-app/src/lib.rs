//! Tabula application crate
//!
//! Wires the table store, the editing service and the terminal hooks
//! together behind the `tabula` command line.

pub mod app_init;
pub mod commands;
pub mod hooks;
pub mod logging;

pub use app_init::{AppState, bootstrap, service_settings};
pub use commands::{Cli, Command};
pub use hooks::ConsoleHooks;
