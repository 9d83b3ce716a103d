pub mod clipboard;
pub mod config;
pub mod display;
pub mod history;
pub mod llm;
pub mod shell;

// Re-export commonly used types
pub use clipboard::ClipboardError;
pub use config::{ConfigError, ConfigStore};
pub use history::{HistoryEntry, HistoryStore};
pub use llm::{LlmClient, LlmError, LlmOptions};
pub use shell::ShellKind;
