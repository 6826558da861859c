//! Board geometry: mapping between board cells and virtual pixels.
//!
//! Hexagons are pointy-top and rows are offset: every odd row shifts half a
//! hexagon to the right. All coordinates live in the virtual screen space
//! described by [`SystemConfig`]; the terminal front end scales them.

use crate::config::SystemConfig;
use hex_engine::Cell;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Extra vertical offset that leaves room for the banner above the board.
const BANNER_HEIGHT: f64 = 100.0;

/// A position in virtual pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    fn distance_squared(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Tile size and board offset for one board size on one screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    tile_size: f64,
    offset_x: f64,
    offset_y: f64,
}

impl HexLayout {
    pub const fn new(tile_size: f64, offset_x: f64, offset_y: f64) -> Self {
        HexLayout {
            tile_size,
            offset_x,
            offset_y,
        }
    }

    /// Centres a `board_size` board on the configured screen, shrinking tiles
    /// for large boards.
    pub fn for_board(system: &SystemConfig, board_size: usize) -> Self {
        let mut tile_size = system.tile_size;
        if board_size > 15 {
            tile_size -= 12.0;
        } else if board_size > 11 {
            tile_size -= 8.0;
        }

        let hex_w = tile_size * SQRT_3;
        let hex_h = 2.0 * tile_size;
        let size = board_size as f64;
        let board_px_w = 0.75 * hex_w * size + hex_w;
        let board_px_h = hex_h * size;

        let offset_x = ((f64::from(system.width) - board_px_w) / 2.0).floor();
        let offset_y = ((f64::from(system.height) - board_px_h) / 2.0).floor() + BANNER_HEIGHT;
        HexLayout::new(tile_size, offset_x, offset_y)
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    /// Distance between neighbouring centres in a row.
    pub fn horizontal_spacing(&self) -> f64 {
        self.tile_size * SQRT_3
    }

    /// Distance between consecutive rows.
    pub fn vertical_spacing(&self) -> f64 {
        self.tile_size * 2.0 * 0.75
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Point {
        let shift = (row % 2) as f64 / 2.0;
        Point::new(
            (col as f64 + shift) * self.horizontal_spacing() + self.offset_x,
            row as f64 * self.vertical_spacing() + self.offset_y,
        )
    }

    /// The cell with the closest centre, if that centre lies strictly within
    /// one tile radius of `point`.
    ///
    /// Cells are scanned in row-major order and only a strictly smaller
    /// distance replaces the best so far, so points equidistant from two
    /// centres resolve to the earlier cell.
    pub fn nearest_cell(&self, point: Point, rows: usize, cols: usize) -> Option<Cell> {
        let mut best_dist = self.tile_size * self.tile_size;
        let mut best = None;
        for row in 0..rows {
            for col in 0..cols {
                let dist = point.distance_squared(self.cell_center(row, col));
                if dist < best_dist {
                    best_dist = dist;
                    best = Some(Cell::new(row, col));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SUPPORTED_BOARD_SIZES;
    use pretty_assertions::assert_eq;

    fn layout_11() -> HexLayout {
        HexLayout::for_board(&SystemConfig::default(), 11)
    }

    #[test]
    fn test_layout_for_default_board() {
        let layout = layout_11();
        assert_eq!(layout.tile_size(), 30.0);
        // 0.75 * 51.96 * 11 + 51.96 = 480.6; (1024 - 480.6) / 2 = 271.7
        assert_eq!(layout.offset(), Point::new(271.0, 130.0));
    }

    #[test]
    fn test_large_boards_shrink_tiles() {
        let system = SystemConfig::default();
        assert_eq!(HexLayout::for_board(&system, 13).tile_size(), 22.0);
        assert_eq!(HexLayout::for_board(&system, 15).tile_size(), 22.0);
        assert_eq!(HexLayout::for_board(&system, 17).tile_size(), 18.0);
        assert_eq!(HexLayout::for_board(&system, 9).tile_size(), 30.0);
    }

    #[test]
    fn test_odd_rows_are_shifted() {
        let layout = HexLayout::new(10.0, 0.0, 0.0);
        let even = layout.cell_center(0, 0);
        let odd = layout.cell_center(1, 0);
        assert_eq!(even, Point::new(0.0, 0.0));
        assert!((odd.x - 10.0 * SQRT_3 / 2.0).abs() < 1e-9);
        assert_eq!(odd.y, 15.0);
    }

    #[test]
    fn test_centres_map_back_to_their_cell() {
        let system = SystemConfig::default();
        for size in SUPPORTED_BOARD_SIZES {
            let layout = HexLayout::for_board(&system, size);
            for row in 0..size {
                for col in 0..size {
                    let center = layout.cell_center(row, col);
                    assert_eq!(
                        layout.nearest_cell(center, size, size),
                        Some(Cell::new(row, col)),
                        "size {size} cell ({row}, {col})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_far_points_hit_nothing() {
        let layout = layout_11();
        assert_eq!(layout.nearest_cell(Point::new(5.0, 5.0), 11, 11), None);
        let last = layout.cell_center(10, 10);
        let outside = Point::new(last.x + 200.0, last.y + 200.0);
        assert_eq!(layout.nearest_cell(outside, 11, 11), None);
    }

    #[test]
    fn test_radius_is_exclusive() {
        let layout = HexLayout::new(10.0, 100.0, 100.0);
        let edge = Point::new(100.0, 90.0);
        assert_eq!(layout.nearest_cell(edge, 1, 1), None);
        let inside = Point::new(100.0, 90.5);
        assert_eq!(layout.nearest_cell(inside, 1, 1), Some(Cell::new(0, 0)));
    }

    #[test]
    fn test_overlapping_radii_pick_the_closer_centre() {
        let layout = HexLayout::new(10.0, 0.0, 0.0);
        // (0,0) is 9 px away and (0,1) about 8.3 px; both are inside the radius.
        let p = Point::new(9.0, 0.0);
        assert_eq!(layout.nearest_cell(p, 2, 2), Some(Cell::new(0, 1)));
        // Across rows: (0,0) is 89 px² away, (1,0) at (8.66, 15) about 62 px².
        let q = Point::new(5.0, 8.0);
        assert_eq!(layout.nearest_cell(q, 2, 2), Some(Cell::new(1, 0)));
    }

    #[test]
    fn test_ties_go_to_first_cell_in_row_major_order() {
        let layout = HexLayout::new(10.0, 0.0, 0.0);
        let a = layout.cell_center(0, 0);
        let b = layout.cell_center(0, 1);
        let midpoint = Point::new((a.x + b.x) / 2.0, a.y);
        assert_eq!(layout.nearest_cell(midpoint, 2, 2), Some(Cell::new(0, 0)));
    }
}
