//! Screen widgets and their layout in virtual pixels.
//!
//! Widgets are plain data: a closed set of variants that hit-test a pointer
//! press and answer with an [`Action`]. The application state machine applies
//! actions; the renderer draws the same list.

use crate::config::{Settings, SystemConfig, SUPPORTED_BOARD_SIZES};
use crate::layout::Point;
use hex_engine::Difficulty;

const BUTTON_W: f64 = 250.0;
const BUTTON_H: f64 = 50.0;
const MENU_GAP: f64 = 70.0;
const SELECTOR_ARROW_W: f64 = 40.0;
/// Vertical grab margin around slider tracks.
const SLIDER_GRAB: f64 = 5.0;

/// Axis-aligned rectangle; `contains` is inclusive of the top-left edge only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeChannel {
    Music,
    Sfx,
}

/// Everything a widget can ask the application to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    OpenPlayMenu,
    OpenSettings,
    Quit,
    StartPvp,
    OpenDifficulty,
    StartPvai(Difficulty),
    BackToModes,
    BackToMenu,
    Rematch,
    SetBoardSize(usize),
    SetVolume(VolumeChannel, f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Title { text: String, center: Point },
    Label { text: String, at: Point },
    Button { label: String, rect: Rect, action: Action },
    /// Left and right arrows step through `options`, wrapping at both ends.
    Selector { rect: Rect, options: Vec<usize>, value: usize },
    Slider { rect: Rect, channel: VolumeChannel, value: f32 },
}

impl Widget {
    fn button(label: &str, rect: Rect, action: Action) -> Self {
        Widget::Button {
            label: label.to_string(),
            rect,
            action,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self, Widget::Button { .. })
    }

    /// The action a primary press at `p` triggers, if any.
    pub fn hit(&self, p: Point) -> Option<Action> {
        match self {
            Widget::Title { .. } | Widget::Label { .. } => None,
            Widget::Button { rect, action, .. } => rect.contains(p).then_some(*action),
            Widget::Selector { rect, options, value } => {
                if !rect.contains(p) || options.is_empty() {
                    return None;
                }
                let index = options.iter().position(|o| o == value).unwrap_or(0);
                let len = options.len();
                if p.x < rect.x + SELECTOR_ARROW_W {
                    Some(Action::SetBoardSize(options[(index + len - 1) % len]))
                } else if p.x >= rect.x + rect.w - SELECTOR_ARROW_W {
                    Some(Action::SetBoardSize(options[(index + 1) % len]))
                } else {
                    None
                }
            }
            Widget::Slider { rect, channel, .. } => {
                let grab = Rect::new(
                    rect.x,
                    rect.y - SLIDER_GRAB,
                    rect.w,
                    rect.h + 2.0 * SLIDER_GRAB,
                );
                if !grab.contains(p) {
                    return None;
                }
                let ratio = ((p.x - rect.x) / rect.w).clamp(0.0, 1.0);
                Some(Action::SetVolume(*channel, ratio as f32))
            }
        }
    }
}

fn center_of(system: &SystemConfig) -> (f64, f64) {
    (
        f64::from(system.width / 2),
        f64::from(system.height / 2),
    )
}

pub fn main_menu(system: &SystemConfig) -> Vec<Widget> {
    let (cx, cy) = center_of(system);
    let left = cx - BUTTON_W / 2.0;
    vec![
        Widget::Title {
            text: system.caption.to_uppercase(),
            center: Point::new(cx, 150.0),
        },
        Widget::button(
            "Play",
            Rect::new(left, cy - 50.0, BUTTON_W, BUTTON_H),
            Action::OpenPlayMenu,
        ),
        Widget::button(
            "Settings",
            Rect::new(left, cy - 50.0 + MENU_GAP, BUTTON_W, BUTTON_H),
            Action::OpenSettings,
        ),
        Widget::button(
            "Quit",
            Rect::new(left, cy - 50.0 + 2.0 * MENU_GAP, BUTTON_W, BUTTON_H),
            Action::Quit,
        ),
    ]
}

pub fn play_modes(system: &SystemConfig) -> Vec<Widget> {
    let (cx, cy) = center_of(system);
    let left = cx - BUTTON_W / 2.0;
    vec![
        Widget::Title {
            text: "Select Mode".to_string(),
            center: Point::new(cx, 100.0),
        },
        Widget::button(
            "Player vs Player",
            Rect::new(left, cy - 60.0, BUTTON_W, BUTTON_H),
            Action::StartPvp,
        ),
        Widget::button(
            "Player vs AI",
            Rect::new(left, cy + 10.0, BUTTON_W, BUTTON_H),
            Action::OpenDifficulty,
        ),
        Widget::button(
            "Back",
            Rect::new(left, cy + 150.0, BUTTON_W, BUTTON_H),
            Action::BackToMenu,
        ),
    ]
}

pub fn difficulties(system: &SystemConfig) -> Vec<Widget> {
    let (cx, cy) = center_of(system);
    let left = cx - BUTTON_W / 2.0;
    let mut widgets = vec![Widget::Title {
        text: "Select Mode".to_string(),
        center: Point::new(cx, 100.0),
    }];
    for (i, difficulty) in Difficulty::ALL.into_iter().enumerate() {
        widgets.push(Widget::button(
            difficulty.label(),
            Rect::new(left, cy - 60.0 + MENU_GAP * i as f64, BUTTON_W, BUTTON_H),
            Action::StartPvai(difficulty),
        ));
    }
    widgets.push(Widget::button(
        "Back",
        Rect::new(left, cy + 180.0, BUTTON_W, BUTTON_H),
        Action::BackToModes,
    ));
    widgets
}

pub fn settings(system: &SystemConfig, current: &Settings) -> Vec<Widget> {
    let (cx, _) = center_of(system);
    vec![
        Widget::Title {
            text: "Settings".to_string(),
            center: Point::new(cx, 100.0),
        },
        Widget::Label {
            text: "Board Size:".to_string(),
            at: Point::new(cx - 150.0, 200.0),
        },
        Widget::Label {
            text: "Music:".to_string(),
            at: Point::new(cx - 150.0, 280.0),
        },
        Widget::Label {
            text: "SFX:".to_string(),
            at: Point::new(cx - 150.0, 340.0),
        },
        Widget::Selector {
            rect: Rect::new(cx + 50.0, 195.0, 200.0, 40.0),
            options: SUPPORTED_BOARD_SIZES.to_vec(),
            value: current.board_size,
        },
        Widget::Slider {
            rect: Rect::new(cx + 50.0, 285.0, 200.0, 20.0),
            channel: VolumeChannel::Music,
            value: current.music_volume,
        },
        Widget::Slider {
            rect: Rect::new(cx + 50.0, 345.0, 200.0, 20.0),
            channel: VolumeChannel::Sfx,
            value: current.sfx_volume,
        },
        Widget::button("Back", Rect::new(cx - 100.0, 500.0, 200.0, 50.0), Action::BackToMenu),
    ]
}

/// Buttons over the board. Rematch only appears once the game is decided.
pub fn game(system: &SystemConfig, finished: bool) -> Vec<Widget> {
    let (cx, cy) = center_of(system);
    let mut widgets = vec![Widget::button(
        "Menu",
        Rect::new(20.0, 20.0, 100.0, 40.0),
        Action::BackToMenu,
    )];
    if finished {
        widgets.push(Widget::button(
            "Rematch",
            Rect::new(cx - 100.0, cy + 60.0, 200.0, 50.0),
            Action::Rematch,
        ));
    }
    widgets
}

/// First action hit by `p`, and whether it came from a button.
pub fn hit_test(widgets: &[Widget], p: Point) -> Option<(Action, bool)> {
    widgets
        .iter()
        .find_map(|w| w.hit(p).map(|action| (action, w.is_button())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn system() -> SystemConfig {
        SystemConfig::default()
    }

    #[test]
    fn test_menu_buttons_hit() {
        let widgets = main_menu(&system());
        // Play spans (387, 310) to (637, 360).
        let at = |x, y| hit_test(&widgets, Point::new(x, y));
        assert_eq!(at(400.0, 320.0), Some((Action::OpenPlayMenu, true)));
        assert_eq!(at(500.0, 400.0), Some((Action::OpenSettings, true)));
        assert_eq!(at(500.0, 470.0), Some((Action::Quit, true)));
        assert_eq!(hit_test(&widgets, Point::new(500.0, 365.0)), None);
    }

    #[test]
    fn test_difficulty_buttons_in_order() {
        let widgets = difficulties(&system());
        assert_eq!(
            hit_test(&widgets, Point::new(512.0, 310.0)),
            Some((Action::StartPvai(Difficulty::Easy), true))
        );
        assert_eq!(
            hit_test(&widgets, Point::new(512.0, 380.0)),
            Some((Action::StartPvai(Difficulty::Medium), true))
        );
        assert_eq!(
            hit_test(&widgets, Point::new(512.0, 450.0)),
            Some((Action::StartPvai(Difficulty::Hard), true))
        );
        assert_eq!(
            hit_test(&widgets, Point::new(512.0, 550.0)),
            Some((Action::BackToModes, true))
        );
    }

    #[test]
    fn test_selector_wraps() {
        let mut current = Settings::default();
        current.board_size = 15;
        let widgets = settings(&system(), &current);
        // Right arrow sits at x in [722, 762).
        let at = |x, y| hit_test(&widgets, Point::new(x, y));
        assert_eq!(at(750.0, 210.0), Some((Action::SetBoardSize(7), false)));
        assert_eq!(at(570.0, 210.0), Some((Action::SetBoardSize(13), false)));
        // Between the arrows.
        assert_eq!(hit_test(&widgets, Point::new(650.0, 210.0)), None);
    }

    #[test]
    fn test_slider_sets_ratio() {
        let widgets = settings(&system(), &Settings::default());
        assert_eq!(
            hit_test(&widgets, Point::new(612.0, 290.0)),
            Some((Action::SetVolume(VolumeChannel::Music, 0.25), false))
        );
        assert_eq!(
            hit_test(&widgets, Point::new(562.0, 342.0)),
            Some((Action::SetVolume(VolumeChannel::Sfx, 0.0), false))
        );
    }

    #[test]
    fn test_rematch_only_when_finished() {
        let running = game(&system(), false);
        let finished = game(&system(), true);
        let p = Point::new(512.0, 440.0);
        assert_eq!(hit_test(&running, p), None);
        assert_eq!(hit_test(&finished, p), Some((Action::Rematch, true)));
        assert_eq!(hit_test(&running, Point::new(30.0, 30.0)), Some((Action::BackToMenu, true)));
    }
}
