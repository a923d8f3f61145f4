//! Application constants
//!
//! Centralized location for endpoint defaults and UI timings.

/// Default user-management endpoint (profiles, contacts, login)
pub const DEFAULT_USERS_API: &str = "https://functions.poehali.dev/f32bef91-79c0-41e6-b236-f2d74386b62b";

/// Default chat-management endpoint (chats, messages)
pub const DEFAULT_CHATS_API: &str = "https://functions.poehali.dev/e9e36b17-1a5b-4d67-8ed3-1e6ae69577a9";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name of the per-user configuration directory under $HOME
pub const CONFIG_DIR_NAME: &str = ".messenger-tui";

/// Default log file name (relative to the config directory)
pub const DEFAULT_LOG_FILE: &str = "messenger.log";

/// How long a toast stays on the status line
pub const TOAST_TTL_MS: u64 = 4000;

/// Application name
pub const APP_NAME: &str = "Messenger TUI";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
