use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::input::{Command, map_key};
use crate::model::Buffer;
use crate::navigator::{NavError, Navigator};
use crate::report::format_size;

/// Interactive session state on top of a [`Navigator`].
///
/// `App` turns key presses into navigator commands, guards deletion behind a
/// confirmation popup and keeps the last failure on screen until a key is
/// pressed. The buffer drawn each frame is refreshed through [`App::view`].
pub struct App {
    navigator: Navigator,
    confirm_delete: bool,
    pending_delete: Option<String>,
    error_popup: Option<String>,
    notice: Option<String>,
    should_quit: bool,
    buffer: Buffer,
}

impl App {
    pub fn new(navigator: Navigator, confirm_delete: bool) -> Self {
        Self {
            navigator,
            confirm_delete,
            pending_delete: None,
            error_popup: None,
            notice: None,
            should_quit: false,
            buffer: Buffer::default(),
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Name of the entry waiting for confirmation, if the popup is open.
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn error_popup(&self) -> Option<&str> {
        self.error_popup.as_deref()
    }

    /// Outcome of the last deletion.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Folds in finished sizes; returns true when something changed.
    pub fn poll_results(&mut self) -> bool {
        self.navigator.poll_results() > 0
    }

    /// Recomputes the visible rows for `max_rows` and returns them.
    pub fn view(&mut self, max_rows: usize) -> &Buffer {
        self.buffer = self.navigator.view(max_rows);
        &self.buffer
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // any key closes the error popup
        if self.error_popup.is_some() {
            self.error_popup = None;
            return;
        }

        if self.pending_delete.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.pending_delete = None;
                    self.run(Command::DeleteSelected);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.pending_delete = None;
                }
                _ => {}
            }
            return;
        }

        let Some(command) = map_key(key) else {
            return;
        };
        match command {
            Command::Quit => self.should_quit = true,
            Command::DeleteSelected if self.confirm_delete => self.prepare_delete(),
            command => self.run(command),
        }
    }

    fn prepare_delete(&mut self) {
        match self.navigator.selected_entry() {
            Some(entry) => self.pending_delete = Some(entry.name.clone()),
            None => self.show_error(NavError::NothingSelected),
        }
    }

    fn run(&mut self, command: Command) {
        if command == Command::DeleteSelected {
            self.delete();
            return;
        }
        if let Err(err) = command.apply(&mut self.navigator) {
            self.show_error(err);
        } else if matches!(command, Command::EnterSelected | Command::AscendToParent) {
            self.notice = None;
        }
    }

    fn delete(&mut self) {
        match self.navigator.delete_selected() {
            Ok(entry) => {
                self.notice = Some(if entry.size_known {
                    format!("Deleted {} ({})", entry.name, format_size(entry.size_bytes))
                } else {
                    format!("Deleted {}", entry.name)
                });
            }
            Err(err) => self.show_error(err),
        }
    }

    fn show_error(&mut self, err: NavError) {
        tracing::warn!("{err}");
        self.error_popup = Some(err.to_string());
    }
}
