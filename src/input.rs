//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the key hints in `crate::ui::draw_status_bar`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;
use crate::routes::Route;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match (app.route, key.code) {
        (_, KeyCode::Char('q')) => app.quit = true,
        (Route::Listing, KeyCode::Esc) => app.quit = true,
        (Route::Article(_), KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h')) => app.back(),
        (_, KeyCode::Down | KeyCode::Char('j')) => app.select_next(),
        (_, KeyCode::Up | KeyCode::Char('k')) => app.select_previous(),
        (_, KeyCode::Home | KeyCode::Char('g') | KeyCode::Char('t')) => app.select_first(),
        (_, KeyCode::End | KeyCode::Char('G')) => app.select_last(),
        (Route::Listing, KeyCode::Enter | KeyCode::Char('l')) => app.open_selected(),
        (Route::Listing, KeyCode::Char('m')) => app.load_more(),
        (Route::Article(_), KeyCode::Char('r')) => app.retry(),
        _ => {}
    }
}
