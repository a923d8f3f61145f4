//! Per-screen drawing: auth form and the main-area sections

use ratatui::{prelude::*, widgets::*};

use super::{centered_rect, initials, render_input, set_input_cursor};
use crate::messages::ui_events::{AuthField, InputMode, ProfileField};
use crate::constants::{APP_NAME, APP_VERSION};
use crate::messages::RenderState;
use crate::models::format_time;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Keys laid out on the dial pad, row by row
const DIAL_KEYS: [[char; 3]; 4] = [['1', '2', '3'], ['4', '5', '6'], ['7', '8', '9'], ['*', '0', '#']];

pub fn draw_auth(f: &mut Frame, state: &RenderState, area: Rect) {
    let auth = &state.auth;
    let panel = centered_rect(50, 60, area);

    let title = if auth.is_registration { " Registration " } else { " Sign in " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    let inner = block.inner(panel);
    f.render_widget(block, panel);

    let mut constraints = vec![
        Constraint::Length(2), // Subtitle
        Constraint::Length(3), // Phone
    ];
    if auth.is_registration {
        constraints.push(Constraint::Length(3)); // Username
    }
    constraints.push(Constraint::Length(2)); // Submit
    constraints.push(Constraint::Min(0)); // Mode switch hint

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    let subtitle = if auth.is_registration {
        "Create an account to start messaging"
    } else {
        "Enter your phone number to sign in"
    };
    f.render_widget(
        Paragraph::new(subtitle).style(Style::default().fg(Color::Gray)).alignment(Alignment::Center),
        chunks[0],
    );

    let phone_focused = auth.field == AuthField::Phone;
    f.render_widget(
        render_input(&auth.phone, "+7 (999) 123-45-67", " Phone number ", phone_focused),
        chunks[1],
    );

    let mut next = 2;
    if auth.is_registration {
        let name_focused = auth.field == AuthField::Username;
        f.render_widget(render_input(&auth.username, "Your name", " User name ", name_focused), chunks[2]);
        if name_focused && !auth.loading {
            set_input_cursor(f, chunks[2], &auth.username);
        }
        next = 3;
    }
    if phone_focused && !auth.loading {
        set_input_cursor(f, chunks[1], &auth.phone);
    }

    let submit = match (auth.loading, auth.is_registration) {
        (true, _) => "Please wait...",
        (false, true) => "[ Enter ] Create account",
        (false, false) => "[ Enter ] Sign in",
    };
    f.render_widget(
        Paragraph::new(submit).style(Style::default().fg(Color::Green).bold()).alignment(Alignment::Center),
        chunks[next],
    );

    let switch = if auth.is_registration {
        "Already have an account? Ctrl+R to sign in"
    } else {
        "No account yet? Ctrl+R to register"
    };
    f.render_widget(
        Paragraph::new(switch).style(Style::default().fg(Color::DarkGray)).alignment(Alignment::Center),
        chunks[next + 1],
    );
}

pub fn draw_chats(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    draw_chat_list(f, state, chunks[0]);
    draw_chat_window(f, state, chunks[1]);
}

fn draw_chat_list(f: &mut Frame, state: &RenderState, area: Rect) {
    let focused = state.input_mode == InputMode::Normal;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", state.active_section.label()));

    if state.chats.is_empty() {
        let empty = Paragraph::new("No chats yet. Press n to start one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(empty, area);
        return;
    }

    let selected_id = state.selected_chat.as_ref().map(|chat| chat.id);
    let items: Vec<ListItem> = state
        .chats
        .iter()
        .map(|chat| {
            let time = chat.last_message_time.as_deref().map(format_time).unwrap_or_default();
            let mut header = vec![
                Span::styled(format!("[{}] ", initials(&chat.name)), Style::default().fg(Color::Magenta)),
                Span::styled(
                    chat.name.clone(),
                    if Some(chat.id) == selected_id {
                        Style::default().fg(Color::Yellow).bold()
                    } else {
                        Style::default().bold()
                    },
                ),
            ];
            if !time.is_empty() {
                header.push(Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)));
            }
            if chat.unread() > 0 {
                header.push(Span::styled(format!(" ({})", chat.unread()), Style::default().fg(Color::Green).bold()));
            }

            let preview = chat.last_message.clone().unwrap_or_else(|| "No messages".to_string());
            ListItem::new(vec![
                Line::from(header),
                Line::styled(format!("     {}", preview), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.chat_cursor.min(state.chats.len() - 1)));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_chat_window(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(chat) = &state.selected_chat else {
        let block = Block::default().borders(Borders::ALL).title(" Messages ");
        let hint = Paragraph::new("Select a chat to start messaging")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Messages
            Constraint::Length(3), // Compose
        ])
        .split(area);

    let title = format!(" {} · {} ", chat.name, chat.kind().as_str());
    let block = Block::default().borders(Borders::ALL).title(title);
    let width = chunks[0].width.saturating_sub(2) as usize;
    let height = chunks[0].height.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    if state.messages.is_empty() {
        lines.push(Line::styled("No messages yet. Say hello!", Style::default().fg(Color::DarkGray)));
    }
    for message in &state.messages {
        let own = Some(message.user_id) == state.user_id;
        let author = if own { "You" } else { message.author.as_str() };
        let header = Line::from(vec![
            Span::styled(
                author.to_string(),
                Style::default().fg(if own { Color::Cyan } else { Color::Magenta }).bold(),
            ),
            Span::styled(format!("  {}", format_time(&message.created_at)), Style::default().fg(Color::DarkGray)),
        ]);
        lines.push(if own { header.right_aligned() } else { header });
        for chunk in wrap_text(&message.text, width.saturating_sub(4).max(1)) {
            let line = Line::raw(chunk);
            lines.push(if own { line.right_aligned() } else { line });
        }
        lines.push(Line::raw(""));
    }

    // Scroll is counted upwards from the newest line
    let max_offset = lines.len().saturating_sub(height);
    let offset = max_offset.saturating_sub(state.message_scroll as usize);
    let history = Paragraph::new(lines).block(block).scroll((offset as u16, 0));
    f.render_widget(history, chunks[0]);

    let editing = state.input_mode == InputMode::Editing;
    f.render_widget(
        render_input(&state.compose, "Press e to write a message", " Message ", editing),
        chunks[1],
    );
    if editing {
        set_input_cursor(f, chunks[1], &state.compose);
    }
}

pub fn draw_dial_pad(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Calls ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let pad = centered_rect(60, 90, inner);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Number
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2), // Hint
            Constraint::Min(0),
        ])
        .split(pad);

    let display = if state.dial_display.is_empty() {
        Line::styled("Enter a number", Style::default().fg(Color::DarkGray))
    } else {
        Line::styled(state.dial_display.as_str(), Style::default().fg(Color::White).bold())
    };
    f.render_widget(
        Paragraph::new(display)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    for (row, keys) in DIAL_KEYS.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(chunks[row + 1]);
        for (col, key) in keys.iter().enumerate() {
            let button = Paragraph::new(key.to_string())
                .alignment(Alignment::Center)
                .style(Style::default().bold())
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
            f.render_widget(button, cells[col]);
        }
    }

    let hint = if state.dial_display.is_empty() {
        ""
    } else {
        "Enter: open chat with this number"
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::Green)).alignment(Alignment::Center),
        chunks[5],
    );
}

pub fn draw_contacts(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Contacts ({}) ", state.contacts.len()));

    if state.contacts.is_empty() {
        let empty = Paragraph::new("No contacts yet. Press a to add one by user id.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .contacts
        .iter()
        .map(|contact| {
            let (dot, dot_style) = if contact.online() {
                ("● ", Style::default().fg(Color::Green))
            } else {
                ("○ ", Style::default().fg(Color::DarkGray))
            };
            let mut spans = vec![
                Span::styled(dot, dot_style),
                Span::styled(contact.username.clone(), Style::default().bold()),
                Span::styled(format!("  #{}", contact.id), Style::default().fg(Color::DarkGray)),
            ];
            if let Some(phone) = &contact.phone {
                spans.push(Span::styled(format!("  {}", phone), Style::default().fg(Color::Gray)));
            }
            let mut lines = vec![Line::from(spans)];
            if let Some(bio) = contact.bio.as_deref().filter(|bio| !bio.is_empty()) {
                lines.push(Line::styled(format!("   {}", bio), Style::default().fg(Color::DarkGray)));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.contact_cursor.min(state.contacts.len() - 1)));
    f.render_stateful_widget(list, area, &mut list_state);
}

pub fn draw_assistant(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Assistant ");

    let (indicator, status, color) = if state.assistant_listening {
        ("( ◉ )", "Listening... press Enter to stop", Color::Red)
    } else {
        ("( ○ )", "Press Enter to talk to the assistant", Color::Gray)
    };

    let text = vec![
        Line::raw(""),
        Line::styled("Voice assistant", Style::default().bold()),
        Line::raw(""),
        Line::styled(indicator, Style::default().fg(color).bold()),
        Line::raw(""),
        Line::styled(status, Style::default().fg(color)),
    ];
    let panel = Paragraph::new(text).alignment(Alignment::Center).block(block);
    f.render_widget(panel, area);
}

pub fn draw_settings(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Settings ");

    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));
    let user = match (&state.profile, state.user_id) {
        (Some(profile), _) => format!("{} (#{})", profile.username, profile.id),
        (None, Some(id)) => format!("#{}", id),
        (None, None) => "-".to_string(),
    };

    let text = vec![
        Line::from(vec![label("Signed in as  "), Span::raw(user)]),
        Line::raw(""),
        Line::from(vec![label("Users API     "), Span::raw(state.users_api.as_str())]),
        Line::from(vec![label("Chats API     "), Span::raw(state.chats_api.as_str())]),
        Line::raw(""),
        Line::from(vec![label("Config file   "), Span::raw(state.config_path.as_str())]),
        Line::from(vec![label("Log file      "), Span::raw(state.log_path.as_str())]),
        Line::raw(""),
        Line::from(vec![label("Version       "), Span::raw(format!("{} {}", APP_NAME, APP_VERSION))]),
        Line::raw(""),
        Line::styled("Press l to log out", Style::default().fg(Color::Red)),
    ];
    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: false }), area);
}

pub fn draw_profile(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Profile ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(profile) = &state.profile else {
        f.render_widget(
            Paragraph::new("Loading profile...").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };

    let mut constraints = vec![Constraint::Length(2)]; // Header
    constraints.extend(ProfileField::ALL.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    let mut header = vec![
        Span::styled(format!("[{}] ", initials(&profile.username)), Style::default().fg(Color::Magenta).bold()),
        Span::styled(format!("User id #{}", profile.id), Style::default().fg(Color::Gray)),
    ];
    if let Some(created) = &profile.created_at {
        header.push(Span::styled(format!("  since {}", created), Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let editing = state.input_mode == InputMode::Editing;
    for (i, field) in ProfileField::ALL.iter().enumerate() {
        let form = &state.profile_form;
        let value = match field {
            ProfileField::Username => &form.username,
            ProfileField::Phone => &form.phone,
            ProfileField::Bio => &form.bio,
            ProfileField::AvatarUrl => &form.avatar_url,
        };
        let focused = *field == state.profile_field;
        let title = format!(" {} ", field.label());
        let border = match (focused, editing) {
            (true, true) => Style::default().fg(Color::Yellow),
            (true, false) => Style::default().fg(Color::Cyan),
            _ => Style::default().fg(Color::DarkGray),
        };
        let input = Paragraph::new(value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
        f.render_widget(input, chunks[i + 1]);
        if focused && editing {
            set_input_cursor(f, chunks[i + 1], value);
        }
    }
}

/// Break text into lines at most `width` terminal columns wide, keeping explicit newlines
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        for word in raw_line.split(' ') {
            if !current.is_empty() && current.width() + 1 + word.width() > width {
                out.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            // Words wider than a line get hard-split
            if current.width() > width {
                let mut line = String::new();
                let mut line_width = 0;
                for c in current.chars() {
                    let char_width = c.width().unwrap_or(0);
                    if !line.is_empty() && line_width + char_width > width {
                        out.push(std::mem::take(&mut line));
                        line_width = 0;
                    }
                    line.push(c);
                    line_width += char_width;
                }
                current = line;
            }
        }
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_breaks_on_words() {
        assert_eq!(wrap_text("hello big world", 9), vec!["hello big", "world"]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_text_counts_wide_characters() {
        assert_eq!(wrap_text("你好世界", 4), vec!["你好", "世界"]);
        assert_eq!(wrap_text("ab 你好", 4), vec!["ab", "你好"]);
        for line in wrap_text("привет 你好世界 hello", 5) {
            assert!(line.width() <= 5, "{line:?} is too wide");
        }
    }
}
