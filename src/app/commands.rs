//! Command handlers - business logic for processing UI events and replies

use crate::app::state::{AppState, PendingChat, Popup};
use crate::messages::network::{ApiAction, ApiCall, ApiReply};
use crate::messages::ui_events::{AuthField, InputMode, Screen, Section};
use crate::messages::NetworkResponse;
use crate::models::{Chat, ChatId, ChatKind, ProfileForm, User, UserId};
use crate::network::client::LoginOutcome;
use crate::phone;
use crate::storage::Session;

const MAX_DIAL_LEN: usize = 16;

impl AppState {
    // ========================
    // Session
    // ========================

    /// Resume the saved login, if any
    pub fn restore_session(&mut self) {
        if let Some(session) = self.storage.load_session() {
            tracing::info!(user_id = session.user_id, "Restoring saved session");
            self.enter_session(session.user_id, None);
        }
    }

    fn enter_session(&mut self, user_id: UserId, profile: Option<User>) {
        self.user_id = Some(user_id);
        self.screen = Screen::Main;
        self.active_section = Section::Chats;
        self.auth = Default::default();

        if let Err(e) = self.storage.save_session(Session { user_id }) {
            tracing::warn!(error = %e, "Could not persist session");
        }

        match profile {
            Some(user) => self.set_profile(user),
            None => {
                self.request(ApiCall::GetProfile { user_id });
            }
        }
        self.request(ApiCall::GetChats { user_id });
        self.request(ApiCall::GetContacts { user_id });
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.storage.clear_session() {
            tracing::warn!(error = %e, "Could not remove saved session");
        }
        tracing::info!(user_id = ?self.user_id, "Logged out");

        self.screen = Screen::Auth;
        self.auth = Default::default();
        self.user_id = None;
        self.profile = None;
        self.active_section = Section::Chats;
        self.input_mode = InputMode::Normal;
        self.chats.clear();
        self.chat_cursor = 0;
        self.selected_chat = None;
        self.messages.clear();
        self.message_scroll = 0;
        self.compose.clear();
        self.contacts.clear();
        self.contact_cursor = 0;
        self.dial.clear();
        self.assistant_listening = false;
        self.profile_form = ProfileForm::default();
        self.popup = None;
        // Replies to the old session's requests are dropped on arrival
        self.in_flight.clear();
        self.latest_reads.clear();
        self.pending_open_chat = None;
    }

    fn set_profile(&mut self, user: User) {
        let editing_profile = self.active_section == Section::Profile && self.input_mode == InputMode::Editing;
        if !editing_profile {
            self.profile_form = ProfileForm::from_user(&user);
        }
        self.profile = Some(user);
    }

    // ========================
    // Auth screen
    // ========================

    pub fn auth_char(&mut self, c: char) {
        match self.auth.field {
            AuthField::Phone => {
                let typed = format!("{}{}", self.auth.phone, c);
                self.auth.phone = phone::format_phone(&typed);
            }
            AuthField::Username => self.auth.username.push(c),
        }
    }

    pub fn auth_backspace(&mut self) {
        match self.auth.field {
            AuthField::Phone => {
                let mut digits = phone::digits(&self.auth.phone);
                digits.pop();
                self.auth.phone = phone::format_phone(&digits);
            }
            AuthField::Username => {
                self.auth.username.pop();
            }
        }
    }

    pub fn auth_next_field(&mut self) {
        self.auth.field = match (self.auth.is_registration, self.auth.field) {
            (true, AuthField::Phone) => AuthField::Username,
            _ => AuthField::Phone,
        };
    }

    pub fn auth_toggle_mode(&mut self) {
        self.auth.is_registration = !self.auth.is_registration;
        self.auth.username.clear();
        self.auth.field = if self.auth.is_registration {
            AuthField::Username
        } else {
            AuthField::Phone
        };
    }

    pub fn auth_submit(&mut self) {
        if self.auth.loading {
            return;
        }
        if phone::digits(&self.auth.phone).is_empty() {
            self.toast_error("Error", "Enter a phone number");
            return;
        }
        let clean = phone::clean_phone(&self.auth.phone);

        if self.auth.is_registration {
            let username = self.auth.username.trim().to_string();
            if username.is_empty() {
                self.toast_error("Error", "Enter a user name");
                return;
            }
            self.request(ApiCall::CreateUser { username, phone: clean });
        } else {
            self.request(ApiCall::Login { phone: clean });
        }
        self.auth.loading = true;
    }

    // ========================
    // Navigation
    // ========================

    pub fn switch_section(&mut self, section: Section) {
        self.active_section = section;
        self.input_mode = InputMode::Normal;
        self.chat_cursor = self.chat_cursor.min(self.visible_chats().len().saturating_sub(1));

        // Each view re-fetches what it shows
        let Some(user_id) = self.user_id else { return };
        match section {
            Section::Chats | Section::Groups | Section::Communities => {
                self.request(ApiCall::GetChats { user_id });
            }
            Section::Contacts | Section::Calls => {
                self.request(ApiCall::GetContacts { user_id });
            }
            Section::Profile => {
                self.request(ApiCall::GetProfile { user_id });
            }
            Section::Assistant | Section::Settings => {}
        }
    }

    pub fn next_section(&mut self) {
        self.switch_section(self.active_section.next());
    }

    pub fn prev_section(&mut self) {
        self.switch_section(self.active_section.prev());
    }

    pub fn cursor_up(&mut self) {
        match self.active_section {
            s if s.shows_chats() => self.chat_cursor = self.chat_cursor.saturating_sub(1),
            Section::Contacts => self.contact_cursor = self.contact_cursor.saturating_sub(1),
            Section::Profile => self.profile_field = self.profile_field.prev(),
            _ => {}
        }
    }

    pub fn cursor_down(&mut self) {
        match self.active_section {
            s if s.shows_chats() => {
                if self.chat_cursor + 1 < self.visible_chats().len() {
                    self.chat_cursor += 1;
                }
            }
            Section::Contacts => {
                if self.contact_cursor + 1 < self.contacts.len() {
                    self.contact_cursor += 1;
                }
            }
            Section::Profile => self.profile_field = self.profile_field.next(),
            _ => {}
        }
    }

    pub fn select_item(&mut self) {
        match self.active_section {
            s if s.shows_chats() => {
                let chat_id = self.visible_chats().get(self.chat_cursor).map(|chat| chat.id);
                if let Some(chat_id) = chat_id {
                    self.open_chat(chat_id);
                }
            }
            Section::Contacts => {
                if let Some(contact) = self.contacts.get(self.contact_cursor).cloned() {
                    self.open_direct_chat(&contact);
                }
            }
            _ => {}
        }
    }

    pub fn scroll_up(&mut self) {
        self.message_scroll = self.message_scroll.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.message_scroll = self.message_scroll.saturating_sub(1);
    }

    pub fn refresh(&mut self) {
        let Some(user_id) = self.user_id else { return };
        match self.active_section {
            s if s.shows_chats() => {
                self.request(ApiCall::GetChats { user_id });
                if let Some(chat_id) = self.selected_chat {
                    self.request(ApiCall::GetMessages { chat_id });
                }
            }
            Section::Contacts | Section::Calls => {
                self.request(ApiCall::GetContacts { user_id });
            }
            Section::Profile => {
                self.request(ApiCall::GetProfile { user_id });
            }
            _ => {}
        }
    }

    // ========================
    // Chats
    // ========================

    pub fn open_chat(&mut self, chat_id: ChatId) {
        if self.selected_chat != Some(chat_id) {
            self.messages.clear();
            self.compose.clear();
        }
        self.selected_chat = Some(chat_id);
        self.message_scroll = 0;
        if let Some(pos) = self.visible_chats().iter().position(|chat| chat.id == chat_id) {
            self.chat_cursor = pos;
        }
        self.request(ApiCall::GetMessages { chat_id });
    }

    /// Open the direct chat named after `contact`, creating it when missing
    pub fn open_direct_chat(&mut self, contact: &User) {
        let existing = self
            .chats
            .iter()
            .find(|chat| chat.kind() == ChatKind::Direct && chat.name == contact.username)
            .map(|chat| chat.id);

        if let Some(chat_id) = existing {
            self.active_section = Section::Chats;
            self.input_mode = InputMode::Normal;
            self.open_chat(chat_id);
            return;
        }

        let Some(user_id) = self.user_id else { return };
        self.create_chat(contact.username.clone(), ChatKind::Direct, user_id);
    }

    /// Ask the backend for a new chat and open it once it exists
    fn create_chat(&mut self, name: String, kind: ChatKind, user_id: UserId) {
        let request_id = self.request(ApiCall::CreateChat {
            name: name.clone(),
            kind: kind.clone(),
            user_id,
        });
        self.pending_open_chat = Some(PendingChat { request_id, name, kind });
    }

    pub fn send_message(&mut self) {
        let text = self.compose.trim();
        if text.is_empty() {
            return;
        }
        let (Some(chat_id), Some(user_id)) = (self.selected_chat, self.user_id) else {
            return;
        };
        let text = text.to_string();
        self.request(ApiCall::SendMessage { chat_id, user_id, text });
        self.compose.clear();
        self.message_scroll = 0;
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if self.active_section.shows_chats() && self.selected_chat_record().is_none() {
            self.toast_error("No chat selected", "Pick a chat with Enter first");
            return;
        }
        if self.current_input_mut().is_some() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_char(&mut self, c: char) {
        if let Some(input) = self.current_input_mut() {
            input.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(input) = self.current_input_mut() {
            input.pop();
        }
    }

    /// Enter while editing: send in a chat, finish the field in the profile
    pub fn submit(&mut self) {
        if self.active_section.shows_chats() {
            self.send_message();
        } else {
            self.stop_editing();
        }
    }

    // ========================
    // Popups
    // ========================

    pub fn open_new_chat(&mut self) {
        self.popup = Some(Popup::NewChat {
            name: String::new(),
            kind: ChatKind::Direct,
        });
    }

    pub fn open_add_contact(&mut self) {
        self.popup = Some(Popup::AddContact { input: String::new() });
    }

    pub fn popup_char(&mut self, c: char) {
        match &mut self.popup {
            Some(Popup::NewChat { name, .. }) => name.push(c),
            Some(Popup::AddContact { input }) => input.push(c),
            None => {}
        }
    }

    pub fn popup_backspace(&mut self) {
        match &mut self.popup {
            Some(Popup::NewChat { name, .. }) => {
                name.pop();
            }
            Some(Popup::AddContact { input }) => {
                input.pop();
            }
            None => {}
        }
    }

    pub fn popup_cycle(&mut self) {
        if let Some(Popup::NewChat { kind, .. }) = &mut self.popup {
            *kind = kind.next();
        }
    }

    pub fn popup_cancel(&mut self) {
        self.popup = None;
    }

    pub fn popup_submit(&mut self) {
        let Some(user_id) = self.user_id else {
            self.popup = None;
            return;
        };

        match self.popup.clone() {
            Some(Popup::NewChat { name, kind }) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return;
                }
                self.create_chat(name, kind, user_id);
                self.popup = None;
            }
            Some(Popup::AddContact { input }) => {
                let contact_user_id = match input.trim().parse::<UserId>() {
                    Ok(id) => id,
                    Err(_) => {
                        self.toast_error("Invalid user id", "Enter the numeric id of the user");
                        return;
                    }
                };
                if contact_user_id == user_id {
                    self.toast_error("Invalid user id", "You cannot add yourself");
                    return;
                }
                self.request(ApiCall::AddContact { user_id, contact_user_id });
                self.popup = None;
            }
            None => {}
        }
    }

    // ========================
    // Dial pad
    // ========================

    pub fn dial_digit(&mut self, c: char) {
        if self.dial.chars().count() < MAX_DIAL_LEN {
            self.dial.push(c);
        }
    }

    pub fn dial_backspace(&mut self) {
        self.dial.pop();
    }

    pub fn dial_clear(&mut self) {
        self.dial.clear();
    }

    /// Resolve the dialed number against contacts and open a chat with the match
    pub fn dial_call(&mut self) {
        if phone::digits(&self.dial).is_empty() {
            return;
        }
        let number = phone::clean_phone(&self.dial);
        let contact = self
            .contacts
            .iter()
            .find(|c| c.phone.as_deref().map(phone::clean_phone).as_deref() == Some(number.as_str()))
            .cloned();

        match contact {
            Some(contact) => {
                tracing::info!(contact_id = contact.id, "Dialed number matches a contact");
                self.open_direct_chat(&contact);
            }
            None => {
                let shown = phone::format_phone(&number);
                self.toast_error("Unknown number", format!("{} is not in your contacts", shown));
            }
        }
    }

    // ========================
    // Assistant
    // ========================

    pub fn toggle_listening(&mut self) {
        self.assistant_listening = !self.assistant_listening;
    }

    // ========================
    // Profile
    // ========================

    pub fn save_profile(&mut self) {
        self.input_mode = InputMode::Normal;
        let (Some(user_id), Some(profile)) = (self.user_id, self.profile.as_ref()) else {
            return;
        };
        if self.profile_form.username.trim().is_empty() {
            self.toast_error("Error", "Name cannot be empty");
            return;
        }
        let update = self.profile_form.diff(profile);
        if update.is_empty() {
            self.toast_info("Profile", "No changes to save");
            return;
        }
        self.request(ApiCall::UpdateProfile { user_id, update });
    }

    // ========================
    // Help popup and toasts
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    // ========================
    // Network responses
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        let id = response.id();
        let Some(action) = self.in_flight.remove(&id) else {
            tracing::debug!(id, "Dropping reply to a request from an earlier session");
            return;
        };
        if action.is_read() && self.latest_reads.get(&action) != Some(&id) {
            tracing::debug!(id, action = action.as_str(), "Dropping stale reply");
            return;
        }

        match response {
            NetworkResponse::Completed { id, reply } => self.apply_reply(id, reply),
            NetworkResponse::Failed {
                id,
                action,
                message,
                not_found,
            } => self.apply_failure(id, action, message, not_found),
        }
    }

    fn apply_reply(&mut self, id: u64, reply: ApiReply) {
        match reply {
            ApiReply::LoggedIn(LoginOutcome::Found(user)) => {
                self.auth.loading = false;
                self.toast_info("Signed in", "Welcome!");
                self.enter_session(user.id, Some(user));
            }
            ApiReply::LoggedIn(LoginOutcome::NotFound) => {
                self.auth.loading = false;
                self.toast_error("User not found", "Register to continue");
                self.auth.is_registration = true;
                self.auth.field = AuthField::Username;
            }
            ApiReply::UserCreated(user_id) => {
                self.auth.loading = false;
                self.toast_info("Registered", "Welcome!");
                self.enter_session(user_id, None);
            }
            ApiReply::Profile(user) => self.set_profile(user),
            ApiReply::ProfileUpdated(true) => {
                self.toast_info("Profile", "Saved");
                if let Some(user_id) = self.user_id {
                    self.request(ApiCall::GetProfile { user_id });
                }
            }
            ApiReply::ProfileUpdated(false) => self.toast_error("Profile", "The server did not save the changes"),
            ApiReply::Contacts(contacts) => {
                self.contacts = contacts;
                self.contact_cursor = self.contact_cursor.min(self.contacts.len().saturating_sub(1));
            }
            ApiReply::ContactAdded(true) => {
                self.toast_info("Contacts", "Contact added");
                if let Some(user_id) = self.user_id {
                    self.request(ApiCall::GetContacts { user_id });
                }
            }
            ApiReply::ContactAdded(false) => self.toast_error("Contacts", "Could not add contact"),
            ApiReply::Chats(chats) => {
                self.chats = chats;
                let selected = self
                    .selected_chat
                    .and_then(|chat_id| self.visible_chats().iter().position(|chat| chat.id == chat_id));
                self.chat_cursor = match selected {
                    Some(pos) => pos,
                    None => self.chat_cursor.min(self.visible_chats().len().saturating_sub(1)),
                };
            }
            ApiReply::Messages { chat_id, messages } => {
                if self.selected_chat == Some(chat_id) {
                    self.messages = messages;
                }
            }
            ApiReply::ChatCreated(chat_id) => {
                let ours = self.pending_open_chat.as_ref().is_some_and(|pending| pending.request_id == id);
                let pending = if ours { self.pending_open_chat.take() } else { None };
                if let Some(pending) = pending {
                    // Shown until the chat list refetch brings the real record
                    if !self.chats.iter().any(|chat| chat.id == chat_id) {
                        self.chats.insert(
                            0,
                            Chat {
                                id: chat_id,
                                name: pending.name,
                                kind: pending.kind.as_str().to_string(),
                                avatar_url: None,
                                last_message: None,
                                last_message_time: None,
                                unread_count: None,
                            },
                        );
                    }
                    self.active_section = Section::Chats;
                    self.input_mode = InputMode::Normal;
                    self.open_chat(chat_id);
                }
                if let Some(user_id) = self.user_id {
                    self.request(ApiCall::GetChats { user_id });
                }
            }
            ApiReply::MessageSent { chat_id, .. } => {
                if self.selected_chat == Some(chat_id) {
                    self.request(ApiCall::GetMessages { chat_id });
                }
                if let Some(user_id) = self.user_id {
                    self.request(ApiCall::GetChats { user_id });
                }
            }
        }
    }

    fn apply_failure(&mut self, id: u64, action: ApiAction, message: String, not_found: bool) {
        match action {
            ApiAction::Login | ApiAction::CreateUser => {
                self.auth.loading = false;
                self.toast_error("Error", "Something went wrong. Try again.");
            }
            ApiAction::CreateChat => {
                if self.pending_open_chat.as_ref().is_some_and(|pending| pending.request_id == id) {
                    self.pending_open_chat = None;
                }
                self.toast_error("Could not create chat", message);
            }
            ApiAction::SendMessage => self.toast_error("Message not sent", message),
            ApiAction::GetChats => self.toast_error("Could not load chats", message),
            ApiAction::GetMessages => self.toast_error("Could not load messages", message),
            ApiAction::GetContacts => self.toast_error("Could not load contacts", message),
            ApiAction::AddContact => self.toast_error("Could not add contact", message),
            ApiAction::GetProfile if not_found => {
                // The saved account is gone on the backend
                tracing::warn!(user_id = ?self.user_id, "Profile not found, ending session");
                self.logout();
                self.toast_error("Account not found", "Sign in or register again");
            }
            ApiAction::GetProfile => self.toast_error("Could not load profile", message),
            ApiAction::UpdateProfile => self.toast_error("Could not save profile", message),
        }
    }
}
