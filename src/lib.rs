//! # Messenger TUI
//!
//! A terminal client for a small messenger backend.
//!
//! ## Features
//! - Sign in or register with a phone number
//! - Chat list with direct, group and community chats
//! - Chat window with message history and compose box
//! - Contacts with add-by-id
//! - Dial pad that opens a chat with the matching contact
//! - Voice assistant panel
//! - Profile editor
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod messages;
pub mod models;
pub mod network;
pub mod phone;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use config::Config;
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{Chat, ChatKind, Message, User};
pub use network::{ApiClient, ApiError, NetworkActor};
