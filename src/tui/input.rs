//! Keyboard and mouse routing for the terminal front end.

use crate::app::{App, ScreenId};
use crate::error::AppError;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::viewport::Viewport;

pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<(), AppError> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return Ok(());
    }
    match key.code {
        KeyCode::Esc => app.back()?,
        KeyCode::Char('q') if app.screen_id() == ScreenId::Menu => app.request_quit(),
        KeyCode::Tab | KeyCode::Down | KeyCode::Right => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up | KeyCode::Left => app.focus_prev(),
        KeyCode::Enter => app.activate_focused()?,
        _ => {}
    }
    Ok(())
}

/// Only primary presses reach the application; drags and hovers are ignored.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, viewport: &Viewport) -> Result<(), AppError> {
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        app.handle_pointer(viewport.to_virtual(mouse.column, mouse.row))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentAudio;
    use crate::config::{HexConfig, Settings};
    use crate::factory::SessionFactory;
    use hex_engine::{AiStrategy, Cell, Difficulty, HexBoard, Player};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct NoMove;

    impl AiStrategy for NoMove {
        fn select_move(
            &self,
            _board: &HexBoard,
            _player: Player,
            _difficulty: Difficulty,
        ) -> Option<Cell> {
            None
        }
    }

    fn app() -> App {
        let factory = SessionFactory::new(Some(5), Arc::new(NoMove), Arc::new(SilentAudio));
        App::new(HexConfig::default(), Settings::default(), factory)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    #[test]
    fn test_q_quits_only_from_menu() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen_id(), ScreenId::PlayModeSelect);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = app();
        app.apply(crate::widgets::Action::StartPvp).unwrap();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn test_escape_leaves_game() {
        let mut app = app();
        app.change_state("game").unwrap();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen_id(), ScreenId::Menu);
    }

    #[test]
    fn test_mouse_press_is_scaled() {
        let mut app = app();
        // 128x48 terminal: 8 px per column, 15 px per row. Column 64 row 21
        // lands at (516, 322.5), inside the Play button.
        let viewport = Viewport::new(128, 48, &app.config().system);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 64,
            row: 21,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, click, &viewport).unwrap();
        assert_eq!(app.screen_id(), ScreenId::PlayModeSelect);

        let release = MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            ..click
        };
        handle_mouse(&mut app, release, &viewport).unwrap();
        assert_eq!(app.screen_id(), ScreenId::PlayModeSelect);
    }
}
