use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::navigator::{NavError, Navigator};

/// Everything the keyboard can ask for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    SelectNext,
    SelectPrevious,
    SelectFirst,
    SelectLast,
    EnterSelected,
    AscendToParent,
    DeleteSelected,
    Quit,
}

impl Command {
    /// Runs a navigator command. `Quit` is left to the host loop and does nothing here.
    pub fn apply(self, navigator: &mut Navigator) -> Result<(), NavError> {
        match self {
            Command::SelectNext => navigator.select_next(),
            Command::SelectPrevious => navigator.select_previous(),
            Command::SelectFirst => navigator.select_first(),
            Command::SelectLast => navigator.select_last(),
            Command::EnterSelected => navigator.enter_selected()?,
            Command::AscendToParent => navigator.ascend_to_parent()?,
            Command::DeleteSelected => {
                navigator.delete_selected()?;
            }
            Command::Quit => {}
        }
        Ok(())
    }
}

/// Maps a key press to its command. Releases and repeats map to nothing.
///
/// ```rust
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
/// use purge::input::{Command, map_key};
///
/// let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
/// assert_eq!(map_key(key), Some(Command::SelectNext));
/// ```
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let command = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char('j') | KeyCode::Down => Command::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => Command::SelectPrevious,
        KeyCode::Char('g') | KeyCode::Home => Command::SelectFirst,
        KeyCode::Char('G') | KeyCode::End => Command::SelectLast,
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Command::EnterSelected,
        KeyCode::Char('h') | KeyCode::Backspace | KeyCode::Left => Command::AscendToParent,
        KeyCode::Char('x') | KeyCode::Delete => Command::DeleteSelected,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}
