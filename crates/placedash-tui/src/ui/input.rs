//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use placedash_core::ResourceKind;

use crate::app::{App, AppState, View};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            false
        }
        AppState::ConfirmingQuit => handle_quit_confirmation(app, key),
        AppState::EditingSearch => {
            handle_search_input(app, key);
            false
        }
        AppState::EditingUserId => {
            handle_user_id_input(app, key);
            false
        }
        AppState::Quitting => true,
        AppState::Normal => {
            handle_normal_input(app, key);
            false
        }
    }
}

fn handle_quit_confirmation(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.state = AppState::Quitting;
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
            false
        }
        _ => false,
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('u') => app.refresh(),

        // Tabs
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.select_tab(ResourceKind::ALL[index]);
        }
        KeyCode::Right => app.select_tab(app.current_tab.next()),
        KeyCode::Left => app.select_tab(app.current_tab.prev()),

        _ => match app.view {
            View::List => handle_list_input(app, key),
            View::Detail { .. } => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
                    app.back_to_list();
                }
            }
        },
    }
}

fn handle_list_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('/') => app.state = AppState::EditingSearch,
        KeyCode::Char('f') => app.state = AppState::EditingUserId,
        KeyCode::Char('x') => app.reset_filters(),
        KeyCode::Char('n') | KeyCode::PageDown => app.next_page(),
        KeyCode::Char('p') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Enter => app.open_selected(),
        _ => {}
    }
}

/// Esc clears the search, Enter keeps it
fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_search();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
}

fn handle_user_id_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_user_id();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Backspace => app.pop_user_id_char(),
        KeyCode::Char(c) => app.push_user_id_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use crate::app::tests::test_app;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_search_editing_keeps_or_clears() {
        let mut app = test_app(3);

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.state, AppState::EditingSearch);
        type_str(&mut app, "ana q");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.view_state.filters.search, "ana ");

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert!(app.view_state.filters.search.is_empty());
    }

    #[tokio::test]
    async fn test_user_id_accepts_digits_only() {
        let mut app = test_app(3);

        press(&mut app, KeyCode::Char('f'));
        type_str(&mut app, "4a2");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view_state.filters.user_id, "42");

        press(&mut app, KeyCode::Char('x'));
        assert!(app.view_state.filters.is_empty());
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let mut app = test_app(3);

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_number_keys_switch_tabs_with_fresh_filters() {
        let mut app = test_app(3);
        press(&mut app, KeyCode::Char('f'));
        type_str(&mut app, "2");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.current_tab, ResourceKind::Albums);
        assert!(app.view_state.filters.is_empty());

        press(&mut app, KeyCode::Right);
        assert_eq!(app.current_tab, ResourceKind::Users);
    }
}
