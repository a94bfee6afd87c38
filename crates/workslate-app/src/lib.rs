//! Workslate Application
//!
//! The native shell: window, Vello surface, keyboard and pointer mapping
//! onto the editor, file dialogs, slide export and the HTTP assistant.

mod app;
mod event_handler;
mod export;
mod file_ops;
mod net;
mod shortcuts;

pub use app::{App, AppConfig, AppError, UserEvent};
pub use event_handler::{Command, EventHandler, TextInput};
pub use net::{AssistantJob, AssistantReply, AssistantWorker, HttpAssistant};
pub use shortcuts::{Shortcut, ShortcutRegistry};
