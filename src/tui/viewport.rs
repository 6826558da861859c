//! Terminal cells to virtual pixels and back.
//!
//! The game speaks in a fixed virtual screen (1024×720 by default). A
//! terminal cell maps to the virtual point at its centre, so a click on the
//! cell a stone is drawn in resolves to that stone's hexagon.

use crate::config::SystemConfig;
use crate::layout::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    cols: u16,
    rows: u16,
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, system: &SystemConfig) -> Self {
        Viewport {
            cols: cols.max(1),
            rows: rows.max(1),
            width: f64::from(system.width),
            height: f64::from(system.height),
        }
    }

    /// Width of the virtual screen in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Virtual pixels covered by one terminal column.
    pub fn scale_x(&self) -> f64 {
        self.width / f64::from(self.cols)
    }

    fn scale_y(&self) -> f64 {
        self.height / f64::from(self.rows)
    }

    /// Virtual point at the centre of terminal cell (`col`, `row`).
    pub fn to_virtual(&self, col: u16, row: u16) -> Point {
        Point::new(
            (f64::from(col) + 0.5) * self.scale_x(),
            (f64::from(row) + 0.5) * self.scale_y(),
        )
    }

    /// Terminal cell containing `p`, or `None` off screen.
    pub fn to_terminal(&self, p: Point) -> Option<(u16, u16)> {
        if p.x < 0.0 || p.y < 0.0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        let col = (p.x / self.scale_x()).floor() as u16;
        let row = (p.y / self.scale_y()).floor() as u16;
        Some((col.min(self.cols - 1), row.min(self.rows - 1)))
    }

    /// Terminal columns covered by a virtual width.
    pub fn columns_for(&self, width: f64) -> u16 {
        (width / self.scale_x()).round().max(1.0) as u16
    }
}
