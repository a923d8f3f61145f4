//! Terminal rendering - draws a `RenderState` snapshot, never mutates anything

mod views;

use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use crate::app::state::{Popup, ToastKind};
use crate::constants::APP_NAME;
use crate::messages::ui_events::{InputMode, Screen, Section};
use crate::messages::RenderState;

pub use views::wrap_text;

/// Draw the whole frame
pub fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    match state.screen {
        Screen::Auth => views::draw_auth(f, state, main_chunks[0]),
        Screen::Main => draw_main(f, state, main_chunks[0]),
    }

    draw_status_bar(f, state, main_chunks[1]);

    if let Some(popup) = &state.popup {
        draw_popup(f, popup, area);
    }
    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_main(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(0)])
        .split(area);

    draw_sidebar(f, state, chunks[0]);

    match state.active_section {
        Section::Chats | Section::Groups | Section::Communities => views::draw_chats(f, state, chunks[1]),
        Section::Calls => views::draw_dial_pad(f, state, chunks[1]),
        Section::Contacts => views::draw_contacts(f, state, chunks[1]),
        Section::Assistant => views::draw_assistant(f, state, chunks[1]),
        Section::Settings => views::draw_settings(f, state, chunks[1]),
        Section::Profile => views::draw_profile(f, state, chunks[1]),
    }
}

fn draw_sidebar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, section) in Section::ALL.iter().enumerate() {
        // Settings and Profile sit at the bottom of the sidebar
        if *section == Section::Settings {
            let filler = area.height.saturating_sub(2 + Section::ALL.len() as u16);
            for _ in 0..filler {
                lines.push(Line::raw(""));
            }
        }
        let style = if *section == state.active_section {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!(" {}:{:<12}", i + 1, section.label()), style)));
    }

    let sidebar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", APP_NAME))
            .title_style(Style::default().fg(Color::Cyan).bold()),
    );
    f.render_widget(sidebar, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    if let Some(toast) = &state.toast {
        let color = match toast.kind {
            ToastKind::Info => Color::Green,
            ToastKind::Error => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled(format!(" {} ", toast.title), Style::default().fg(Color::Black).bg(color).bold()),
            Span::styled(format!(" {}", toast.description), Style::default().fg(color)),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints = if state.is_loading {
        " Loading... "
    } else {
        hints_for(state)
    };
    let bar = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn hints_for(state: &RenderState) -> &'static str {
    if state.screen == Screen::Auth {
        return " Enter:submit | Tab:next field | Ctrl+R:login/register | Ctrl+C:quit ";
    }
    if state.input_mode == InputMode::Editing {
        return " Enter:send/confirm | Esc:stop editing ";
    }
    match state.active_section {
        Section::Chats | Section::Groups | Section::Communities => {
            " ↑/↓:move | Enter:open | e:write | n:new chat | r:refresh | PgUp/PgDn:scroll | ?:help "
        }
        Section::Calls => " 0-9 * #:dial | Enter:call | Backspace:delete | x:clear | Tab:section ",
        Section::Contacts => " ↑/↓:move | Enter:chat | a:add contact | r:refresh | ?:help ",
        Section::Assistant => " Enter/Space:start or stop | ?:help ",
        Section::Settings => " l:log out | ?:help | q:quit ",
        Section::Profile => " ↑/↓:field | e:edit | s:save | r:reload | ?:help ",
    }
}

fn draw_popup(f: &mut Frame, popup: &Popup, area: Rect) {
    let popup_area = centered_rect(50, 25, area);

    let (title, lines) = match popup {
        Popup::NewChat { name, kind } => (
            " New chat (Enter:create Tab:type Esc:cancel) ",
            vec![
                Line::from(vec![Span::styled("Name: ", Style::default().fg(Color::Gray)), Span::raw(name.as_str())]),
                Line::from(vec![
                    Span::styled("Type: ", Style::default().fg(Color::Gray)),
                    Span::styled(kind.as_str().to_string(), Style::default().fg(Color::Yellow)),
                ]),
            ],
        ),
        Popup::AddContact { input } => (
            " Add contact (Enter:add Esc:cancel) ",
            vec![
                Line::from(vec![Span::styled("User id: ", Style::default().fg(Color::Gray)), Span::raw(input.as_str())]),
                Line::styled("Ask your contact for their numeric id", Style::default().fg(Color::DarkGray)),
            ],
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title)
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 MESSENGER - Keyboard Shortcuts

 NAVIGATION
   1-8                Jump to section (not on the dial pad)
   Tab / Shift+Tab    Next / previous section
   ↑ / ↓  (j / k)     Move in lists and forms

 CHATS
   Enter              Open selected chat
   e / i              Write a message (Enter sends, Esc stops)
   n                  New chat
   r                  Refresh
   PgUp / PgDn        Scroll messages

 CONTACTS
   Enter              Open direct chat
   a                  Add contact by user id

 DIAL PAD
   0-9 * #            Dial
   Enter              Open chat with the matching contact

 PROFILE
   e / Enter          Edit field
   s                  Save changes

 GENERAL
   Esc                Dismiss notification
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

/// Bordered input field; focused fields get a yellow border
pub fn render_input<'a>(content: &'a str, placeholder: &'a str, title: &'a str, is_focused: bool) -> Paragraph<'a> {
    let style = if is_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title);

    let text = if content.is_empty() {
        Line::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Line::raw(content)
    };
    Paragraph::new(text).block(block)
}

/// Place the terminal cursor at the end of a single-line input
pub fn set_input_cursor(f: &mut Frame, area: Rect, content: &str) {
    let text_width = u16::try_from(content.width()).unwrap_or(u16::MAX);
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    let cursor_x = area.x.saturating_add(text_width).saturating_add(1).min(max_x);
    f.set_cursor_position(Position::new(cursor_x, area.y.saturating_add(1)));
}

/// First letters of up to two words, used as an avatar stand-in
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters.to_uppercase()
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chat;
    use ratatui::backend::TestBackend;

    fn render(state: &RenderState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|f| draw_ui(f, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("anna smirnova"), "AS");
        assert_eq!(initials("Work chat team"), "WC");
        assert_eq!(initials("  "), "?");
    }

    fn cursor_after(content: &str) -> Position {
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        terminal
            .draw(|f| set_input_cursor(f, Rect::new(2, 1, 20, 3), content))
            .unwrap();
        terminal.get_cursor_position().unwrap()
    }

    #[test]
    fn test_input_cursor_uses_display_width() {
        assert_eq!(cursor_after(""), Position::new(3, 2));
        assert_eq!(cursor_after("ab"), Position::new(5, 2));
        assert_eq!(cursor_after("你好"), Position::new(7, 2));
    }

    #[test]
    fn test_input_cursor_stays_inside_long_input() {
        let long = "x".repeat(70_000);
        assert_eq!(cursor_after(&long), Position::new(20, 2));
    }

    #[test]
    fn test_auth_screen_renders_mode() {
        let mut state = RenderState::default();
        assert!(render(&state).contains("Sign in"));

        state.auth.is_registration = true;
        let screen = render(&state);
        assert!(screen.contains("Registration"));
        assert!(screen.contains("User name"));
    }

    #[test]
    fn test_chat_list_renders_names_and_unread() {
        let state = RenderState {
            screen: Screen::Main,
            user_id: Some(1),
            chats: vec![Chat {
                id: 1,
                name: "Work chat".into(),
                kind: "group".into(),
                avatar_url: None,
                last_message: Some("Hello there".into()),
                last_message_time: Some("2024-05-01 12:45:00".into()),
                unread_count: Some(3),
            }],
            ..RenderState::default()
        };
        let screen = render(&state);
        assert!(screen.contains("Work chat"));
        assert!(screen.contains("12:45"));
        assert!(screen.contains("(3)"));
        assert!(screen.contains("Select a chat"));
    }

    #[test]
    fn test_toast_replaces_hints() {
        let state = RenderState {
            toast: Some(crate::app::state::Toast {
                title: "User not found".into(),
                description: "Register to continue".into(),
                kind: ToastKind::Error,
                shown_at: std::time::Instant::now(),
            }),
            ..RenderState::default()
        };
        let screen = render(&state);
        assert!(screen.contains("Register to continue"));
        assert!(!screen.contains("Ctrl+C:quit"));
    }
}
