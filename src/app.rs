//! # Application State Machine
//!
//! Screen-level flow of the client:
//!
//! ```text
//! Menu ──► PlayModeSelect ──► Game (PvP)
//!  │  ▲          │  ▲
//!  │  │          ▼  │
//!  │  │     DifficultySelect ──► Game (PvAI)
//!  ▼  │
//! Settings            Game ──► Menu (session discarded)
//! ```
//!
//! Exactly one screen is active. The game screen owns its session; leaving
//! it drops the session together with any AI computation still in flight.

use crate::audio::SoundEvent;
use crate::config::{HexConfig, Settings};
use crate::error::AppError;
use crate::factory::SessionFactory;
use crate::layout::{HexLayout, Point};
use crate::session::{GameMode, GameSession};
use crate::widgets::{self, Action, VolumeChannel, Widget};
use hex_engine::Difficulty;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// The live game together with the geometry used to draw and hit-test it.
#[derive(Debug)]
pub struct GameScreen {
    pub session: GameSession,
    pub layout: HexLayout,
}

#[derive(Debug)]
pub enum Screen {
    Menu,
    PlayModeSelect,
    DifficultySelect,
    Settings,
    Game(Box<GameScreen>),
}

/// Names of the screens, as used by [`App::change_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    Menu,
    PlayModeSelect,
    DifficultySelect,
    Settings,
    Game,
}

impl ScreenId {
    pub fn name(self) -> &'static str {
        match self {
            ScreenId::Menu => "main_menu",
            ScreenId::PlayModeSelect => "play_menu",
            ScreenId::DifficultySelect => "difficulty_menu",
            ScreenId::Settings => "settings",
            ScreenId::Game => "game",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScreenId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main_menu" => Ok(ScreenId::Menu),
            "play_menu" => Ok(ScreenId::PlayModeSelect),
            "difficulty_menu" => Ok(ScreenId::DifficultySelect),
            "settings" => Ok(ScreenId::Settings),
            "game" => Ok(ScreenId::Game),
            other => Err(AppError::UnknownScreen(other.to_string())),
        }
    }
}

impl Screen {
    pub fn id(&self) -> ScreenId {
        match self {
            Screen::Menu => ScreenId::Menu,
            Screen::PlayModeSelect => ScreenId::PlayModeSelect,
            Screen::DifficultySelect => ScreenId::DifficultySelect,
            Screen::Settings => ScreenId::Settings,
            Screen::Game(_) => ScreenId::Game,
        }
    }
}

pub struct App {
    config: HexConfig,
    settings: Settings,
    factory: SessionFactory,
    screen: Screen,
    /// Index into the current screen's buttons for keyboard activation.
    focus: Option<usize>,
    should_quit: bool,
}

impl App {
    pub fn new(config: HexConfig, settings: Settings, factory: SessionFactory) -> Self {
        let audio = factory.audio();
        audio.set_music_volume(settings.music_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        App {
            config,
            settings,
            factory,
            screen: Screen::Menu,
            focus: None,
            should_quit: false,
        }
    }

    pub fn config(&self) -> &HexConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_id(&self) -> ScreenId {
        self.screen.id()
    }

    pub fn game(&self) -> Option<&GameScreen> {
        match &self.screen {
            Screen::Game(game) => Some(game),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.game().map(|game| &game.session)
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        match &mut self.screen {
            Screen::Game(game) => Some(&mut game.session),
            _ => None,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        info!("quit requested");
        self.should_quit = true;
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Widgets of the active screen, in hit-test order.
    pub fn widgets(&self) -> Vec<Widget> {
        let system = &self.config.system;
        match &self.screen {
            Screen::Menu => widgets::main_menu(system),
            Screen::PlayModeSelect => widgets::play_modes(system),
            Screen::DifficultySelect => widgets::difficulties(system),
            Screen::Settings => widgets::settings(system, &self.settings),
            Screen::Game(game) => widgets::game(system, game.session.winner().is_some()),
        }
    }

    /// Switches to the screen called `name`. Unknown names are a programming
    /// error and are reported, not ignored.
    pub fn change_state(&mut self, name: &str) -> Result<(), AppError> {
        let id: ScreenId = name.parse()?;
        self.enter(id)
    }

    pub fn enter(&mut self, id: ScreenId) -> Result<(), AppError> {
        match id {
            ScreenId::Game => return self.start_game(GameMode::PlayerVsPlayer, Difficulty::Easy),
            ScreenId::Menu => self.screen = Screen::Menu,
            ScreenId::PlayModeSelect => self.screen = Screen::PlayModeSelect,
            ScreenId::DifficultySelect => self.screen = Screen::DifficultySelect,
            ScreenId::Settings => self.screen = Screen::Settings,
        }
        self.focus = None;
        info!(screen = %id, "screen changed");
        Ok(())
    }

    /// Replaces the active screen with a fresh game using the configured
    /// board size.
    pub fn start_game(&mut self, mode: GameMode, difficulty: Difficulty) -> Result<(), AppError> {
        let board_size = self.settings.board_size;
        let session = self.factory.create(mode, difficulty, board_size)?;
        let layout = HexLayout::for_board(&self.config.system, board_size);
        self.screen = Screen::Game(Box::new(GameScreen { session, layout }));
        self.focus = None;
        info!(screen = %ScreenId::Game, %mode, "screen changed");
        Ok(())
    }

    /// Primary button press at `p` in virtual pixels.
    pub fn handle_pointer(&mut self, p: Point) -> Result<(), AppError> {
        if let Some((action, from_button)) = widgets::hit_test(&self.widgets(), p) {
            if from_button {
                self.factory.audio().play(SoundEvent::Click);
            }
            return self.apply(action);
        }
        if let Screen::Game(game) = &mut self.screen {
            let board = game.session.board();
            if let Some(cell) = game.layout.nearest_cell(p, board.rows(), board.cols()) {
                game.session.attempt_human_move(cell);
            }
        }
        Ok(())
    }

    pub fn apply(&mut self, action: Action) -> Result<(), AppError> {
        debug!(?action, "apply");
        match action {
            Action::OpenPlayMenu | Action::BackToModes => self.enter(ScreenId::PlayModeSelect),
            Action::OpenSettings => self.enter(ScreenId::Settings),
            Action::OpenDifficulty => self.enter(ScreenId::DifficultySelect),
            Action::BackToMenu => self.enter(ScreenId::Menu),
            Action::Quit => {
                self.request_quit();
                Ok(())
            }
            Action::StartPvp => self.start_game(GameMode::PlayerVsPlayer, Difficulty::Easy),
            Action::StartPvai(difficulty) => self.start_game(GameMode::PlayerVsAi, difficulty),
            Action::Rematch => {
                if let Some(session) = self.session_mut() {
                    session.reset();
                }
                Ok(())
            }
            Action::SetBoardSize(size) => {
                self.settings.board_size = size;
                info!(board_size = size, "board size changed");
                Ok(())
            }
            Action::SetVolume(channel, volume) => {
                let audio = self.factory.audio();
                match channel {
                    VolumeChannel::Music => {
                        self.settings.music_volume = volume;
                        audio.set_music_volume(volume);
                    }
                    VolumeChannel::Sfx => {
                        self.settings.sfx_volume = volume;
                        audio.set_sfx_volume(volume);
                    }
                }
                Ok(())
            }
        }
    }

    /// One screen back; from the menu this does nothing.
    pub fn back(&mut self) -> Result<(), AppError> {
        match self.screen_id() {
            ScreenId::Menu => Ok(()),
            ScreenId::DifficultySelect => self.enter(ScreenId::PlayModeSelect),
            ScreenId::PlayModeSelect | ScreenId::Settings | ScreenId::Game => {
                self.enter(ScreenId::Menu)
            }
        }
    }

    /// Per-frame update.
    pub fn tick(&mut self) {
        if let Some(session) = self.session_mut() {
            session.tick();
        }
    }

    fn button_actions(&self) -> Vec<Action> {
        self.widgets()
            .into_iter()
            .filter_map(|w| match w {
                Widget::Button { action, .. } => Some(action),
                _ => None,
            })
            .collect()
    }

    pub fn focus_next(&mut self) {
        let count = self.button_actions().len();
        if count > 0 {
            self.focus = Some(self.focus.map_or(0, |i| (i + 1) % count));
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.button_actions().len();
        if count > 0 {
            self.focus = Some(self.focus.map_or(count - 1, |i| (i + count - 1) % count));
        }
    }

    /// Presses the focused button, as a click would.
    pub fn activate_focused(&mut self) -> Result<(), AppError> {
        let Some(index) = self.focus else {
            return Ok(());
        };
        match self.button_actions().get(index).copied() {
            Some(action) => {
                self.factory.audio().play(SoundEvent::Click);
                self.apply(action)
            }
            None => {
                self.focus = None;
                Ok(())
            }
        }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("settings", &self.settings)
            .field("focus", &self.focus)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use hex_engine::{AiStrategy, Cell, HexBoard, Player};
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

    fn app() -> (App, Arc<RecordingAudio>) {
        let audio = Arc::new(RecordingAudio::new());
        let factory = SessionFactory::new(Some(11), Arc::new(NoMove), audio.clone());
        let mut settings = Settings::default();
        settings.board_size = 7;
        (App::new(HexConfig::default(), settings, factory), audio)
    }

    #[test]
    fn test_starts_on_menu() {
        let (app, _) = app();
        assert_eq!(app.screen_id(), ScreenId::Menu);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_unknown_screen_is_an_error() {
        let (mut app, _) = app();
        let err = app.change_state("unknown_screen").unwrap_err();
        assert!(matches!(err, AppError::UnknownScreen(name) if name == "unknown_screen"));
        assert_eq!(app.screen_id(), ScreenId::Menu);
    }

    #[test]
    fn test_screen_names_round_trip() {
        for id in [
            ScreenId::Menu,
            ScreenId::PlayModeSelect,
            ScreenId::DifficultySelect,
            ScreenId::Settings,
        ] {
            let (mut app, _) = app();
            app.change_state(id.name()).unwrap();
            assert_eq!(app.screen_id(), id);
        }
    }

    #[test]
    fn test_game_by_name_is_pvp() {
        let (mut app, _) = app();
        app.change_state("game").unwrap();
        let session = app.session().unwrap();
        assert_eq!(session.mode(), GameMode::PlayerVsPlayer);
        assert_eq!(session.board().rows(), 7);
    }

    #[test]
    fn test_navigation_and_back() {
        let (mut app, audio) = app();
        app.apply(Action::OpenPlayMenu).unwrap();
        app.apply(Action::OpenDifficulty).unwrap();
        assert_eq!(app.screen_id(), ScreenId::DifficultySelect);
        app.back().unwrap();
        assert_eq!(app.screen_id(), ScreenId::PlayModeSelect);
        app.back().unwrap();
        assert_eq!(app.screen_id(), ScreenId::Menu);
        app.back().unwrap();
        assert_eq!(app.screen_id(), ScreenId::Menu);
        // Applying actions directly makes no sound.
        assert!(audio.events().is_empty());
    }

    #[test]
    fn test_click_plays_cue_and_navigates() {
        let (mut app, audio) = app();
        app.handle_pointer(Point::new(512.0, 330.0)).unwrap();
        assert_eq!(app.screen_id(), ScreenId::PlayModeSelect);
        assert_eq!(audio.events(), vec![SoundEvent::Click]);
    }

    #[test]
    fn test_board_click_places_stone() {
        let (mut app, audio) = app();
        app.apply(Action::StartPvp).unwrap();
        let center = app.game().unwrap().layout.cell_center(3, 3);
        app.handle_pointer(center).unwrap();
        let session = app.session().unwrap();
        assert_eq!(session.last_move(), Some(Cell::new(3, 3)));
        assert_eq!(session.turn(), Player::Two);
        assert_eq!(audio.events(), vec![SoundEvent::Move]);
    }

    #[test]
    fn test_leaving_game_drops_session() {
        let (mut app, _) = app();
        app.apply(Action::StartPvai(Difficulty::Hard)).unwrap();
        app.tick();
        app.back().unwrap();
        assert_eq!(app.screen_id(), ScreenId::Menu);
        assert!(app.session().is_none());
    }

    #[test]
    fn test_settings_changes_apply() {
        let (mut app, _) = app();
        app.apply(Action::OpenSettings).unwrap();
        app.apply(Action::SetBoardSize(13)).unwrap();
        app.apply(Action::SetVolume(VolumeChannel::Sfx, 0.2)).unwrap();
        assert_eq!(app.settings().board_size, 13);
        assert_eq!(app.settings().sfx_volume, 0.2);
        app.apply(Action::BackToMenu).unwrap();
        app.apply(Action::StartPvp).unwrap();
        assert_eq!(app.session().unwrap().board().rows(), 13);
    }

    #[test]
    fn test_keyboard_focus_wraps_and_activates() {
        let (mut app, _) = app();
        app.focus_prev();
        assert_eq!(app.focus(), Some(2));
        app.activate_focused().unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn test_focus_resets_on_screen_change() {
        let (mut app, _) = app();
        app.focus_next();
        assert_eq!(app.focus(), Some(0));
        app.activate_focused().unwrap();
        assert_eq!(app.screen_id(), ScreenId::PlayModeSelect);
        assert_eq!(app.focus(), None);
    }
}
