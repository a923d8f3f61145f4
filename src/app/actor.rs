//! App actor - message loop processing UI events and network responses

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use crate::storage::Storage;

/// How often toast expiry is checked
const TICK: Duration = Duration::from_millis(250);

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        storage: Storage,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        let mut state = AppState::new(storage);
        state.restore_session();
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let mut tick = tokio::time::interval(TICK);

        // Requests queued by session restore, then the first frame
        self.flush_commands();
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    self.flush_commands();
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    self.flush_commands();
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                _ = tick.tick() => {
                    if self.state.expire_toast(Instant::now()) {
                        let _ = self.render_tx.send(self.state.to_render_state());
                    }
                }
                else => break,
            }
        }
    }

    fn flush_commands(&mut self) {
        for cmd in self.state.drain_commands() {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Auth screen
            UiEvent::AuthChar(c) => self.state.auth_char(c),
            UiEvent::AuthBackspace => self.state.auth_backspace(),
            UiEvent::AuthNextField => self.state.auth_next_field(),
            UiEvent::AuthSubmit => self.state.auth_submit(),
            UiEvent::AuthToggleMode => self.state.auth_toggle_mode(),

            // Sidebar
            UiEvent::SwitchSection(section) => self.state.switch_section(section),
            UiEvent::NextSection => self.state.next_section(),
            UiEvent::PrevSection => self.state.prev_section(),

            // Lists
            UiEvent::CursorUp => self.state.cursor_up(),
            UiEvent::CursorDown => self.state.cursor_down(),
            UiEvent::SelectItem => self.state.select_item(),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),
            UiEvent::Refresh => self.state.refresh(),

            // Input editing
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::Submit => self.state.submit(),

            // Popups
            UiEvent::OpenNewChat => self.state.open_new_chat(),
            UiEvent::OpenAddContact => self.state.open_add_contact(),
            UiEvent::PopupChar(c) => self.state.popup_char(c),
            UiEvent::PopupBackspace => self.state.popup_backspace(),
            UiEvent::PopupCycle => self.state.popup_cycle(),
            UiEvent::PopupSubmit => self.state.popup_submit(),
            UiEvent::PopupCancel => self.state.popup_cancel(),

            // Dial pad
            UiEvent::DialDigit(c) => self.state.dial_digit(c),
            UiEvent::DialBackspace => self.state.dial_backspace(),
            UiEvent::DialClear => self.state.dial_clear(),
            UiEvent::DialCall => self.state.dial_call(),

            // Assistant
            UiEvent::ToggleListening => self.state.toggle_listening(),

            // Profile / settings
            UiEvent::SaveProfile => self.state.save_profile(),
            UiEvent::Logout => self.state.logout(),

            // Help and notifications
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),
            UiEvent::DismissToast => self.state.dismiss_toast(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::network::ApiCall;
    use crate::messages::ui_events::Screen;

    #[tokio::test]
    async fn test_submit_login_reaches_network_and_quit_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::with_dir(dir.path().to_path_buf());

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (net_cmd_tx, mut net_cmd_rx) = mpsc::unbounded_channel();
        let (_net_resp_tx, net_resp_rx) = mpsc::unbounded_channel();
        let (render_tx, mut render_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(AppActor::new(storage, net_cmd_tx, render_tx).run(ui_rx, net_resp_rx));

        let first = render_rx.recv().await.unwrap();
        assert_eq!(first.screen, Screen::Auth);

        ui_tx.send(UiEvent::AuthChar('7')).unwrap();
        ui_tx.send(UiEvent::AuthSubmit).unwrap();
        match net_cmd_rx.recv().await.unwrap() {
            NetworkCommand::Execute { call, .. } => assert_eq!(call, ApiCall::Login { phone: "+7".into() }),
            other => panic!("unexpected command {:?}", other),
        }

        ui_tx.send(UiEvent::Quit).unwrap();
        assert_eq!(net_cmd_rx.recv().await, Some(NetworkCommand::Shutdown));
        handle.await.unwrap();
    }
}
