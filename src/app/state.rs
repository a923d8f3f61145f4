//! App state - pure data structure with no I/O logic

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::constants::TOAST_TTL_MS;
use crate::messages::network::{ApiAction, ApiCall};
use crate::messages::ui_events::{AuthField, InputMode, ProfileField, Screen, Section};
use crate::messages::{NetworkCommand, RenderState};
use crate::models::{Chat, ChatId, ChatKind, Message, ProfileForm, User, UserId};
use crate::phone;
use crate::storage::Storage;

/// Login / registration form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthForm {
    /// Masked phone number as displayed
    pub phone: String,
    pub username: String,
    pub is_registration: bool,
    pub loading: bool,
    pub field: AuthField,
}

/// Modal input popups
#[derive(Clone, Debug, PartialEq)]
pub enum Popup {
    NewChat { name: String, kind: ChatKind },
    AddContact { input: String },
}

/// A chat being created that opens once the backend assigns its id
#[derive(Clone, Debug, PartialEq)]
pub struct PendingChat {
    pub request_id: u64,
    pub name: String,
    pub kind: ChatKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToastKind {
    Info,
    Error,
}

/// A transient notification shown on the status line
#[derive(Clone, Debug)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub screen: Screen,
    pub auth: AuthForm,

    // Session
    pub user_id: Option<UserId>,
    pub profile: Option<User>,

    // Navigation
    pub active_section: Section,
    pub input_mode: InputMode,

    // Chats
    pub chats: Vec<Chat>,
    pub chat_cursor: usize,
    pub selected_chat: Option<ChatId>,
    pub messages: Vec<Message>,
    /// Lines scrolled up from the newest message
    pub message_scroll: u16,
    pub compose: String,

    // Contacts
    pub contacts: Vec<User>,
    pub contact_cursor: usize,

    // Dial pad (raw keys as typed)
    pub dial: String,

    // Assistant
    pub assistant_listening: bool,

    // Profile editor
    pub profile_form: ProfileForm,
    pub profile_field: ProfileField,

    // Popups and notifications
    pub popup: Option<Popup>,
    pub show_help: bool,
    pub toast: Option<Toast>,

    // Request bookkeeping
    pub next_request_id: u64,
    pub in_flight: HashMap<u64, ApiAction>,
    /// Newest request id per read action; older replies are stale
    pub latest_reads: HashMap<ApiAction, u64>,
    /// create_chat request whose new chat should be opened
    pub pending_open_chat: Option<PendingChat>,
    outbox: Vec<NetworkCommand>,

    // Storage (config + persisted session)
    pub storage: Storage,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        AppState {
            screen: Screen::Auth,
            auth: AuthForm::default(),
            user_id: None,
            profile: None,
            active_section: Section::Chats,
            input_mode: InputMode::Normal,
            chats: Vec::new(),
            chat_cursor: 0,
            selected_chat: None,
            messages: Vec::new(),
            message_scroll: 0,
            compose: String::new(),
            contacts: Vec::new(),
            contact_cursor: 0,
            dial: String::new(),
            assistant_listening: false,
            profile_form: ProfileForm::default(),
            profile_field: ProfileField::Username,
            popup: None,
            show_help: false,
            toast: None,
            next_request_id: 1,
            in_flight: HashMap::new(),
            latest_reads: HashMap::new(),
            pending_open_chat: None,
            outbox: Vec::new(),
            storage,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Queue a backend call and return its request id
    pub fn request(&mut self, call: ApiCall) -> u64 {
        let id = self.next_id();
        let action = call.action();
        if action.is_read() {
            self.latest_reads.insert(action, id);
        }
        self.in_flight.insert(id, action);
        self.outbox.push(NetworkCommand::Execute { id, call });
        id
    }

    /// Commands queued since the last drain
    pub fn drain_commands(&mut self) -> Vec<NetworkCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Chats shown in the active section
    pub fn visible_chats(&self) -> Vec<&Chat> {
        let wanted = match self.active_section {
            Section::Groups => Some(ChatKind::Group),
            Section::Communities => Some(ChatKind::Community),
            _ => None,
        };
        self.chats
            .iter()
            .filter(|chat| wanted.as_ref().map_or(true, |kind| &chat.kind() == kind))
            .collect()
    }

    pub fn selected_chat_record(&self) -> Option<&Chat> {
        let id = self.selected_chat?;
        self.chats.iter().find(|chat| chat.id == id)
    }

    /// The text field that receives typed characters while editing
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        if self.active_section.shows_chats() {
            return Some(&mut self.compose);
        }
        if self.active_section == Section::Profile {
            let form = &mut self.profile_form;
            return Some(match self.profile_field {
                ProfileField::Username => &mut form.username,
                ProfileField::Phone => &mut form.phone,
                ProfileField::Bio => &mut form.bio,
                ProfileField::AvatarUrl => &mut form.avatar_url,
            });
        }
        None
    }

    // ========================
    // Toasts
    // ========================

    pub fn toast_info(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.show_toast(ToastKind::Info, title.into(), description.into());
    }

    pub fn toast_error(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.show_toast(ToastKind::Error, title.into(), description.into());
    }

    fn show_toast(&mut self, kind: ToastKind, title: String, description: String) {
        self.toast = Some(Toast {
            title,
            description,
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Drop the toast once it outlived its TTL; true when something changed
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        let expired = self
            .toast
            .as_ref()
            .is_some_and(|t| now.duration_since(t.shown_at) >= Duration::from_millis(TOAST_TTL_MS));
        if expired {
            self.toast = None;
        }
        expired
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let dial_display = if self.dial.contains(['*', '#']) {
            self.dial.clone()
        } else {
            phone::format_phone(&self.dial)
        };

        RenderState {
            screen: self.screen,
            auth: self.auth.clone(),
            user_id: self.user_id,
            profile: self.profile.clone(),
            active_section: self.active_section,
            input_mode: self.input_mode,
            chats: self.visible_chats().into_iter().cloned().collect(),
            chat_cursor: self.chat_cursor,
            selected_chat: self.selected_chat_record().cloned(),
            messages: self.messages.clone(),
            message_scroll: self.message_scroll,
            compose: self.compose.clone(),
            contacts: self.contacts.clone(),
            contact_cursor: self.contact_cursor,
            dial_display,
            assistant_listening: self.assistant_listening,
            profile_form: self.profile_form.clone(),
            profile_field: self.profile_field,
            popup: self.popup.clone(),
            show_help: self.show_help,
            toast: self.toast.clone(),
            is_loading: self.is_loading(),
            users_api: self.storage.config.users_api.clone(),
            chats_api: self.storage.config.chats_api.clone(),
            config_path: self.storage.config_path().display().to_string(),
            log_path: self.storage.log_path().display().to_string(),
        }
    }
}
