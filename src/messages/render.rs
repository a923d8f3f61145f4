//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::{AuthForm, Popup, Toast};
use crate::messages::ui_events::{InputMode, ProfileField, Screen, Section};
use crate::models::{Chat, Message, ProfileForm, User, UserId};

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub screen: Screen,
    pub auth: AuthForm,

    // Session
    pub user_id: Option<UserId>,
    pub profile: Option<User>,

    // Navigation
    pub active_section: Section,
    pub input_mode: InputMode,

    // Chats (already filtered for the active section)
    pub chats: Vec<Chat>,
    pub chat_cursor: usize,
    pub selected_chat: Option<Chat>,
    pub messages: Vec<Message>,
    pub message_scroll: u16,
    pub compose: String,

    // Contacts
    pub contacts: Vec<User>,
    pub contact_cursor: usize,

    // Dial pad
    pub dial_display: String,

    // Assistant
    pub assistant_listening: bool,

    // Profile editor
    pub profile_form: ProfileForm,
    pub profile_field: ProfileField,

    // Popups
    pub popup: Option<Popup>,
    pub show_help: bool,
    pub toast: Option<Toast>,
    pub is_loading: bool,

    // Settings
    pub users_api: String,
    pub chats_api: String,
    pub config_path: String,
    pub log_path: String,
}
