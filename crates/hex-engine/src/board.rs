//! # Hex Board Engine
//!
//! The authoritative board representation. Cells are addressed either by
//! `(row, col)` or by the flat index `row * cols + col`. Four virtual nodes
//! (one per board edge) sit after the physical cells so that "has this
//! player joined its two edges" becomes a single union-find query.
//!
//! Layout convention: pointy-top hexagons, odd rows shifted half a cell to
//! the right. This must agree with the pixel mapping used by the client.

use crate::dsu::Dsu;
use colored::Colorize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Returned by [`HexBoard::shortest_distance`] when the opponent has sealed
/// every route between a player's edges.
pub const UNREACHABLE: usize = usize::MAX;

const EVEN_ROW_OFFSETS: [(isize, isize); 6] =
    [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];
const ODD_ROW_OFFSETS: [(isize, isize); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

/// One of the two seats at the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// Red, moves first, connects left and right.
    One,
    /// Blue, connects top and bottom.
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Colour name shown to players.
    pub fn name(self) -> &'static str {
        match self {
            Player::One => "Red",
            Player::Two => "Blue",
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A Hex board with incremental connectivity tracking.
///
/// Cloning is cheap enough for search: the adjacency table is shared, only
/// the stones and the two union-find forests are copied.
#[derive(Debug, Clone)]
pub struct HexBoard {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Player>>,
    /// One forest per player, indexed by `Player::slot`.
    unions: [Dsu; 2],
    adjacency: Arc<Vec<Vec<usize>>>,
}

impl HexBoard {
    /// Creates an empty board.
    pub fn new(rows: usize, cols: usize) -> Self {
        let len = rows * cols;
        HexBoard {
            rows,
            cols,
            cells: vec![None; len],
            unions: [Dsu::new(len + 4), Dsu::new(len + 4)],
            adjacency: Arc::new(build_adjacency(rows, cols)),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of physical cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.is_valid(cell.row, cell.col)
            .then(|| cell.row * self.cols + cell.col)
    }

    /// Converts a flat index back to a coordinate.
    pub fn coord_of(&self, index: usize) -> Cell {
        Cell::new(index / self.cols, index % self.cols)
    }

    /// Stone at `(row, col)`; `None` for empty and out-of-range cells alike.
    pub fn get(&self, row: usize, col: usize) -> Option<Player> {
        if self.is_valid(row, col) {
            self.cells[row * self.cols + col]
        } else {
            None
        }
    }

    pub fn stone_at(&self, index: usize) -> Option<Player> {
        self.cells.get(index).copied().flatten()
    }

    /// Neighbours of a physical cell. Indices `>= len()` are virtual edge nodes.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    /// Empty cells in ascending index order.
    pub fn legal_moves(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, stone)| stone.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Places a stone. Returns `false` and leaves the board untouched when the
    /// cell is out of range or already occupied.
    pub fn make_move(&mut self, row: usize, col: usize, player: Player) -> bool {
        if !self.is_valid(row, col) {
            return false;
        }
        let idx = row * self.cols + col;
        if self.cells[idx].is_some() {
            return false;
        }

        let (edge_a, edge_b) = self.edges(player);
        let len = self.cells.len();
        let HexBoard { cells, unions, adjacency, .. } = self;
        cells[idx] = Some(player);

        let forest = &mut unions[player.slot()];
        for &nb in &adjacency[idx] {
            if nb >= len {
                if nb == edge_a || nb == edge_b {
                    forest.unite(idx, nb);
                }
            } else if cells[nb] == Some(player) {
                forest.unite(idx, nb);
            }
        }
        true
    }

    /// The player whose edges are joined, if any.
    pub fn check_win(&self) -> Option<Player> {
        [Player::One, Player::Two].into_iter().find(|&p| {
            let (a, b) = self.edges(p);
            self.unions[p.slot()].connected(a, b)
        })
    }

    /// Chain of `player`'s stones from its starting edge to the opposite one,
    /// in walking order. Empty when no such chain exists.
    pub fn winning_path(&self, player: Player) -> Vec<Cell> {
        let mut visited = vec![false; self.cells.len()];
        let mut path = Vec::new();

        let starts: Vec<usize> = match player {
            Player::One => (0..self.rows).map(|r| r * self.cols).collect(),
            Player::Two => (0..self.cols).collect(),
        };
        for start in starts {
            if self.cells[start] == Some(player)
                && !visited[start]
                && self.trace(start, player, &mut visited, &mut path)
            {
                return path.into_iter().map(|i| self.coord_of(i)).collect();
            }
        }
        Vec::new()
    }

    /// Minimum number of stones `player` still needs to join its edges, or
    /// [`UNREACHABLE`] when the opponent has cut every route. The client logs
    /// both players' distances after each move.
    pub fn shortest_distance(&self, player: Player) -> usize {
        let len = self.cells.len();
        let (start, end) = self.edges(player);
        let mut dist = vec![UNREACHABLE; len + 4];
        let mut queue = VecDeque::new();
        dist[start] = 0;
        queue.push_back((start, 0usize));

        while let Some((u, d)) = queue.pop_front() {
            if u == end {
                return d;
            }
            if d > dist[u] {
                continue;
            }
            for &v in &self.adjacency[u] {
                let weight = if v >= len {
                    if v != start && v != end {
                        continue;
                    }
                    0
                } else {
                    match self.cells[v] {
                        Some(p) if p == player => 0,
                        Some(_) => continue,
                        None => 1,
                    }
                };
                if d + weight < dist[v] {
                    dist[v] = d + weight;
                    if weight == 0 {
                        queue.push_front((v, dist[v]));
                    } else {
                        queue.push_back((v, dist[v]));
                    }
                }
            }
        }
        UNREACHABLE
    }

    fn trace(
        &self,
        idx: usize,
        player: Player,
        visited: &mut [bool],
        path: &mut Vec<usize>,
    ) -> bool {
        visited[idx] = true;
        path.push(idx);

        let cell = self.coord_of(idx);
        let reached = match player {
            Player::One => cell.col + 1 == self.cols,
            Player::Two => cell.row + 1 == self.rows,
        };
        if reached {
            return true;
        }

        let len = self.cells.len();
        for &nb in &self.adjacency[idx] {
            if nb < len
                && !visited[nb]
                && self.cells[nb] == Some(player)
                && self.trace(nb, player, visited, path)
            {
                return true;
            }
        }

        path.pop();
        false
    }

    /// Virtual edge nodes a player must connect.
    fn edges(&self, player: Player) -> (usize, usize) {
        let len = self.cells.len();
        match player {
            Player::One => (len + 2, len + 3),
            Player::Two => (len, len + 1),
        }
    }
}

fn build_adjacency(rows: usize, cols: usize) -> Vec<Vec<usize>> {
    let len = rows * cols;
    let (top, bottom, left, right) = (len, len + 1, len + 2, len + 3);
    let mut adj = vec![Vec::with_capacity(6); len + 4];

    for r in 0..rows {
        for c in 0..cols {
            let idx = r * cols + c;

            if r == 0 {
                adj[idx].push(top);
                adj[top].push(idx);
            }
            if r + 1 == rows {
                adj[idx].push(bottom);
                adj[bottom].push(idx);
            }
            if c == 0 {
                adj[idx].push(left);
                adj[left].push(idx);
            }
            if c + 1 == cols {
                adj[idx].push(right);
                adj[right].push(idx);
            }

            let offsets = if r % 2 == 0 { &EVEN_ROW_OFFSETS } else { &ODD_ROW_OFFSETS };
            for &(dr, dc) in offsets {
                let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc))
                else {
                    continue;
                };
                if nr < rows && nc < cols {
                    adj[idx].push(nr * cols + nc);
                }
            }
        }
    }
    adj
}

/// Coloured text board; the client writes it to the debug log when a game ends.
impl fmt::Display for HexBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..self.cols {
            write!(f, "{} ", format!("{c:>3}").as_str().blue())?;
        }
        writeln!(f)?;

        for r in 0..self.rows {
            let indent = if r % 2 == 1 { "  " } else { "" };
            write!(f, "{indent}{} ", format!("{r:>2}").as_str().red())?;
            for c in 0..self.cols {
                match self.get(r, c) {
                    Some(Player::One) => write!(f, "{}", " X  ".red())?,
                    Some(Player::Two) => write!(f, "{}", " O  ".blue())?,
                    None => write!(f, "{}", " .  ".bright_black())?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
