//! Draws the active screen into the terminal buffer.

use crate::app::{App, GameScreen};
use crate::layout::Point;
use crate::widgets::Widget;
use hex_engine::{Cell, Player};
use ratatui::{
    buffer::Buffer,
    layout::Rect as Area,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
    Frame,
};

use super::viewport::Viewport;

pub fn draw(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.config().system.caption));
    frame.render_widget(block, area);

    let viewport = Viewport::new(area.width, area.height, &app.config().system);
    let buf = frame.buffer_mut();
    if let Some(game) = app.game() {
        draw_game(buf, area, &viewport, game);
    }
    let mut button_index = 0;
    for widget in app.widgets() {
        let focused = widget.is_button() && app.focus() == Some(button_index);
        if widget.is_button() {
            button_index += 1;
        }
        draw_widget(buf, area, &viewport, &widget, focused);
    }
}

/// Writes `text` starting at the cell holding `at`, clipped to `area`.
fn put(buf: &mut Buffer, area: Area, viewport: &Viewport, at: Point, text: &str, style: Style) {
    let Some((x, y)) = viewport.to_terminal(at) else {
        return;
    };
    if y >= area.bottom() || x >= area.right() {
        return;
    }
    buf.set_stringn(x, y, text, usize::from(area.right() - x), style);
}

/// Writes `text` centred on `center`.
fn put_centered(
    buf: &mut Buffer,
    area: Area,
    viewport: &Viewport,
    center: Point,
    text: &str,
    style: Style,
) {
    let shift = text.chars().count() as f64 / 2.0 * viewport.scale_x();
    put(buf, area, viewport, Point::new(center.x - shift, center.y), text, style);
}

fn draw_widget(buf: &mut Buffer, area: Area, viewport: &Viewport, widget: &Widget, focused: bool) {
    match widget {
        Widget::Title { text, center } => {
            let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
            put_centered(buf, area, viewport, *center, text, style);
        }
        Widget::Label { text, at } => put(buf, area, viewport, *at, text, Style::default()),
        Widget::Button { label, rect, .. } => {
            let mut style = Style::default().fg(Color::Cyan);
            if focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            put_centered(buf, area, viewport, rect.center(), &format!("[ {label} ]"), style);
        }
        Widget::Selector { rect, value, .. } => {
            let style = Style::default().fg(Color::Cyan);
            put(buf, area, viewport, Point::new(rect.x, rect.center().y), "<", style);
            let right = Point::new(rect.x + rect.w - 1.0, rect.center().y);
            put(buf, area, viewport, right, ">", style);
            put_centered(buf, area, viewport, rect.center(), &value.to_string(), Style::default());
        }
        Widget::Slider { rect, value, .. } => {
            let cols = usize::from(viewport.columns_for(rect.w));
            let filled = ((f64::from(*value) * cols as f64).round() as usize).min(cols);
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(cols - filled));
            let at = Point::new(rect.x, rect.center().y);
            put(buf, area, viewport, at, &bar, Style::default().fg(Color::Magenta));
        }
    }
}

fn draw_game(buf: &mut Buffer, area: Area, viewport: &Viewport, game: &GameScreen) {
    let session = &game.session;
    let board = session.board();
    let path = session.winning_path();

    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let cell = Cell::new(row, col);
            let (glyph, mut style) = match board.get(row, col) {
                Some(Player::One) => ("●", Style::default().fg(Color::Red)),
                Some(Player::Two) => ("●", Style::default().fg(Color::Blue)),
                None => ("·", Style::default().fg(Color::DarkGray)),
            };
            if path.contains(&cell) {
                style = style.bg(Color::Yellow);
            } else if session.last_move() == Some(cell) {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            put(buf, area, viewport, game.layout.cell_center(row, col), glyph, style);
        }
    }

    let banner_y = (game.layout.offset().y - 2.0 * game.layout.tile_size()).max(0.0);
    let (text, style) = match session.outcome_banner() {
        Some(outcome) => (outcome, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        None => (session.turn_banner(), Style::default()),
    };
    put_centered(buf, area, viewport, Point::new(viewport.width() / 2.0, banner_y), &text, style);
}
