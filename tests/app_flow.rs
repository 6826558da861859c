//! Click-driven walks through the screen state machine.

use hex_engine::{AiStrategy, Cell, Difficulty, HexBoard, Player};
use hexgame::audio::{RecordingAudio, SoundEvent};
use hexgame::layout::Point;
use hexgame::widgets::Action;
use hexgame::{App, AppError, HexConfig, ScreenId, SessionFactory, SessionStatus, Settings};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Always answers with the first empty cell.
struct FirstEmpty;

impl AiStrategy for FirstEmpty {
    fn select_move(
        &self,
        board: &HexBoard,
        _player: Player,
        _difficulty: Difficulty,
    ) -> Option<Cell> {
        board.legal_moves().first().map(|&idx| board.coord_of(idx))
    }
}

fn app(board_size: usize, seed: u64) -> (App, Arc<RecordingAudio>) {
    let audio = Arc::new(RecordingAudio::new());
    let factory = SessionFactory::new(Some(seed), Arc::new(FirstEmpty), audio.clone());
    let settings = Settings {
        board_size,
        ..Settings::default()
    };
    (App::new(HexConfig::default(), settings, factory), audio)
}

fn click_cell(app: &mut App, row: usize, col: usize) {
    let center = app.game().unwrap().layout.cell_center(row, col);
    app.handle_pointer(center).unwrap();
}

#[test]
fn pvp_game_from_menu_to_rematch() {
    let (mut app, audio) = app(7, 1);

    // Play, then Player vs Player.
    app.handle_pointer(Point::new(512.0, 330.0)).unwrap();
    app.handle_pointer(Point::new(512.0, 320.0)).unwrap();
    assert_eq!(app.screen_id(), ScreenId::Game);
    assert_eq!(audio.count(SoundEvent::Click), 2);

    for col in 0..7 {
        click_cell(&mut app, 0, col);
        if col < 6 {
            click_cell(&mut app, 2, col);
        }
    }
    let session = app.session().unwrap();
    assert_eq!(session.status(), SessionStatus::Won(Player::One));
    assert_eq!(session.outcome_banner().as_deref(), Some("Red Wins!"));
    assert_eq!(audio.count(SoundEvent::Win), 1);
    assert_eq!(audio.count(SoundEvent::Move), 13);

    // Rematch sits below the centre once the game is over.
    app.handle_pointer(Point::new(512.0, 440.0)).unwrap();
    let session = app.session().unwrap();
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert_eq!(session.move_count(), 0);
    assert_eq!(session.turn(), Player::One);

    // Menu button.
    app.handle_pointer(Point::new(30.0, 30.0)).unwrap();
    assert_eq!(app.screen_id(), ScreenId::Menu);
    assert!(app.session().is_none());
}

#[test]
fn pvai_game_runs_through_ticks() {
    let (mut app, _) = app(7, 2);
    app.apply(Action::OpenPlayMenu).unwrap();
    app.apply(Action::OpenDifficulty).unwrap();
    app.apply(Action::StartPvai(Difficulty::Hard)).unwrap();

    let seat = app.session().unwrap().human_seat().unwrap();
    if seat == Player::Two {
        for _ in 0..5_000 {
            app.tick();
            if app.session().unwrap().turn() == Player::Two {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
    let session = app.session().unwrap();
    assert_eq!(session.turn(), seat);
    assert_eq!(session.difficulty(), Difficulty::Hard);

    click_cell(&mut app, 6, 6);
    let session = app.session().unwrap();
    assert_eq!(session.board().get(6, 6), Some(seat));
    assert!(session.is_ai_turn());
}

#[test]
fn settings_clicks_feed_the_next_game() {
    let (mut app, _) = app(11, 3);
    app.handle_pointer(Point::new(512.0, 400.0)).unwrap();
    assert_eq!(app.screen_id(), ScreenId::Settings);

    // Right arrow of the size selector: 11 -> 13.
    app.handle_pointer(Point::new(750.0, 210.0)).unwrap();
    // Music slider at three quarters.
    app.handle_pointer(Point::new(712.0, 295.0)).unwrap();
    assert_eq!(app.settings().board_size, 13);
    assert_eq!(app.settings().music_volume, 0.75);

    // Back, Play, Player vs Player.
    app.handle_pointer(Point::new(512.0, 520.0)).unwrap();
    app.handle_pointer(Point::new(512.0, 330.0)).unwrap();
    app.handle_pointer(Point::new(512.0, 320.0)).unwrap();
    let game = app.game().unwrap();
    assert_eq!(game.session.board().rows(), 13);
    assert_eq!(game.layout.tile_size(), 22.0);
}

#[test]
fn unknown_screen_is_fatal() {
    let (mut app, _) = app(7, 4);
    app.change_state("settings").unwrap();
    let err = app.change_state("unknown_screen").unwrap_err();
    assert!(matches!(err, AppError::UnknownScreen(_)));
    assert_eq!(err.to_string(), "unknown screen: unknown_screen");
    assert_eq!(app.screen_id(), ScreenId::Settings);
}

#[test]
fn dead_zone_clicks_are_ignored() {
    let (mut app, audio) = app(7, 5);
    app.apply(Action::StartPvp).unwrap();
    app.handle_pointer(Point::new(1000.0, 700.0)).unwrap();
    let session = app.session().unwrap();
    assert_eq!(session.move_count(), 0);
    assert!(audio.events().is_empty());
}
