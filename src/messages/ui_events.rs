//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::messages::RenderState;

/// Top-level screen
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Screen {
    #[default]
    Auth,
    Main,
}

/// Sidebar destinations of the main window
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Section {
    #[default]
    Chats,
    Calls,
    Contacts,
    Communities,
    Groups,
    Assistant,
    Settings,
    Profile,
}

impl Section {
    /// Sidebar order; the last two sit in the bottom group
    pub const ALL: [Section; 8] = [
        Section::Chats,
        Section::Calls,
        Section::Contacts,
        Section::Communities,
        Section::Groups,
        Section::Assistant,
        Section::Settings,
        Section::Profile,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Chats => "Chats",
            Section::Calls => "Calls",
            Section::Contacts => "Contacts",
            Section::Communities => "Communities",
            Section::Groups => "Groups",
            Section::Assistant => "Assistant",
            Section::Settings => "Settings",
            Section::Profile => "Profile",
        }
    }

    pub fn index(&self) -> usize {
        Section::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Section {
        Section::ALL[(self.index() + 1) % Section::ALL.len()]
    }

    pub fn prev(&self) -> Section {
        Section::ALL[(self.index() + Section::ALL.len() - 1) % Section::ALL.len()]
    }

    /// Sections that show the chat list and chat window
    pub fn shows_chats(&self) -> bool {
        matches!(self, Section::Chats | Section::Groups | Section::Communities)
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Focused field on the auth screen
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum AuthField {
    #[default]
    Phone,
    Username,
}

/// Field of the profile editor
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum ProfileField {
    #[default]
    Username,
    Phone,
    Bio,
    AvatarUrl,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Username,
        ProfileField::Phone,
        ProfileField::Bio,
        ProfileField::AvatarUrl,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Username => "Name",
            ProfileField::Phone => "Phone",
            ProfileField::Bio => "Bio",
            ProfileField::AvatarUrl => "Avatar URL",
        }
    }

    pub fn next(&self) -> ProfileField {
        match self {
            ProfileField::Username => ProfileField::Phone,
            ProfileField::Phone => ProfileField::Bio,
            ProfileField::Bio => ProfileField::AvatarUrl,
            ProfileField::AvatarUrl => ProfileField::Username,
        }
    }

    pub fn prev(&self) -> ProfileField {
        match self {
            ProfileField::Username => ProfileField::AvatarUrl,
            ProfileField::Phone => ProfileField::Username,
            ProfileField::Bio => ProfileField::Phone,
            ProfileField::AvatarUrl => ProfileField::Bio,
        }
    }
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Auth screen
    AuthChar(char),
    AuthBackspace,
    AuthNextField,
    AuthSubmit,
    AuthToggleMode,

    // Sidebar
    SwitchSection(Section),
    NextSection,
    PrevSection,

    // Lists
    CursorUp,
    CursorDown,
    SelectItem,
    ScrollUp,
    ScrollDown,
    Refresh,

    // Input editing (compose box, profile fields)
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    Submit,

    // Popups
    OpenNewChat,
    OpenAddContact,
    PopupChar(char),
    PopupBackspace,
    PopupCycle,
    PopupSubmit,
    PopupCancel,

    // Dial pad
    DialDigit(char),
    DialBackspace,
    DialClear,
    DialCall,

    // Assistant
    ToggleListening,

    // Profile / settings
    SaveProfile,
    Logout,

    // Help and notifications
    ToggleHelp,
    CloseHelp,
    DismissToast,

    // System
    Quit,
}

/// Convert a key event to a UiEvent based on the last rendered state
pub fn key_to_ui_event(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('r') if state.screen == Screen::Auth => return Some(UiEvent::AuthToggleMode),
            _ => return None,
        }
    }

    if state.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if state.popup.is_some() {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::PopupCancel),
            KeyCode::Enter => Some(UiEvent::PopupSubmit),
            KeyCode::Tab => Some(UiEvent::PopupCycle),
            KeyCode::Backspace => Some(UiEvent::PopupBackspace),
            KeyCode::Char(c) => Some(UiEvent::PopupChar(c)),
            _ => None,
        };
    }

    match state.screen {
        Screen::Auth => handle_auth_keys(key),
        Screen::Main => match state.input_mode {
            InputMode::Editing => handle_editing_keys(key),
            InputMode::Normal => handle_main_keys(key, state.active_section),
        },
    }
}

fn handle_auth_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::DismissToast),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => Some(UiEvent::AuthNextField),
        KeyCode::Enter => Some(UiEvent::AuthSubmit),
        KeyCode::Backspace => Some(UiEvent::AuthBackspace),
        KeyCode::Char(c) => Some(UiEvent::AuthChar(c)),
        _ => None,
    }
}

fn handle_editing_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Enter => Some(UiEvent::Submit),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn handle_main_keys(key: KeyEvent, section: Section) -> Option<UiEvent> {
    // The dial pad owns the digit keys
    if section == Section::Calls {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '*' || c == '#' || c == '+' => {
                return Some(UiEvent::DialDigit(c))
            }
            KeyCode::Backspace => return Some(UiEvent::DialBackspace),
            KeyCode::Delete | KeyCode::Char('x') => return Some(UiEvent::DialClear),
            KeyCode::Enter => return Some(UiEvent::DialCall),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Esc => return Some(UiEvent::DismissToast),
        KeyCode::Tab => return Some(UiEvent::NextSection),
        KeyCode::BackTab => return Some(UiEvent::PrevSection),
        KeyCode::Char(c @ '1'..='8') => {
            let index = c as usize - '1' as usize;
            return Some(UiEvent::SwitchSection(Section::ALL[index]));
        }
        _ => {}
    }

    match section {
        Section::Chats | Section::Groups | Section::Communities => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::CursorDown),
            KeyCode::Enter => Some(UiEvent::SelectItem),
            KeyCode::PageUp => Some(UiEvent::ScrollUp),
            KeyCode::PageDown => Some(UiEvent::ScrollDown),
            KeyCode::Char('e') | KeyCode::Char('i') => Some(UiEvent::StartEditing),
            KeyCode::Char('n') => Some(UiEvent::OpenNewChat),
            KeyCode::Char('r') => Some(UiEvent::Refresh),
            _ => None,
        },
        Section::Contacts => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::CursorDown),
            KeyCode::Enter => Some(UiEvent::SelectItem),
            KeyCode::Char('a') => Some(UiEvent::OpenAddContact),
            KeyCode::Char('r') => Some(UiEvent::Refresh),
            _ => None,
        },
        Section::Assistant => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(UiEvent::ToggleListening),
            _ => None,
        },
        Section::Profile => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::CursorDown),
            KeyCode::Enter | KeyCode::Char('e') => Some(UiEvent::StartEditing),
            KeyCode::Char('s') => Some(UiEvent::SaveProfile),
            KeyCode::Char('r') => Some(UiEvent::Refresh),
            _ => None,
        },
        Section::Settings => match key.code {
            KeyCode::Char('l') => Some(UiEvent::Logout),
            _ => None,
        },
        Section::Calls => None,
    }
}
