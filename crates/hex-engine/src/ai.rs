//! # Computer Opponent
//!
//! [`AiStrategy`] is the contract the game client consumes: given a board and
//! the player to move, return a legal cell. The strategy never mutates the
//! board it is given and is expected to finish within a bounded time.
//!
//! [`MctsStrategy`] is the default implementation:
//!
//! 1. **Tactics** - take an immediate win, otherwise block an immediate loss.
//! 2. **Search** - Monte Carlo tree search with RAVE (all-moves-as-first)
//!    statistics under a per-difficulty time budget.
//! 3. **Root parallelism** - every rayon worker grows its own tree with its
//!    own RNG; root visit counts are summed and the most visited move wins.
//!
//! Untried moves are ordered by a cheap heuristic (centre bias plus a bonus
//! for bridge shapes), and playouts answer bridge intrusions.

use crate::board::{Cell, HexBoard, Player};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

const UCT_EXPLORATION: f64 = 0.2;
const RAVE_BIAS_HARD: f64 = 3_000.0;
const RAVE_BIAS_OTHER: f64 = 500.0;
const NODE_POOL_SIZE: usize = 200_000;
/// Stop expanding this close to the node cap.
const NODE_POOL_MARGIN: usize = 200;

const BRIDGE_BUILD: i32 = 5_000;
const CENTER_BIAS: i32 = 100;
const DIST_PENALTY: i32 = 10;
const BRIDGE_OFFSETS: [(isize, isize); 6] = [(-1, -1), (-1, 2), (1, -2), (1, 1), (-2, 1), (2, -1)];

/// Marks a cell that is not in the playout move list.
const NOT_LISTED: usize = usize::MAX;

/// Errors raised while setting up the search engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Strength of the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Move selection contract consumed by the game client.
pub trait AiStrategy: Send + Sync {
    /// Picks a move for `player`. Returns `None` only when the board has no
    /// empty cell left.
    fn select_move(&self, board: &HexBoard, player: Player, difficulty: Difficulty) -> Option<Cell>;
}

/// Tuning knobs for [`MctsStrategy`].
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Search workers; 0 uses one per CPU.
    pub threads: usize,
    /// Thinking time for Easy, Medium and Hard.
    pub time_limits: [Duration; 3],
    /// Maximum nodes per worker tree.
    pub node_limit: usize,
    /// Fixed RNG seed; `None` draws a fresh one per search.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            threads: 0,
            time_limits: [
                Duration::from_millis(500),
                Duration::from_millis(900),
                Duration::from_millis(1_000),
            ],
            node_limit: NODE_POOL_SIZE,
            seed: None,
        }
    }
}

impl MctsConfig {
    pub fn time_limit(&self, difficulty: Difficulty) -> Duration {
        self.time_limits[difficulty.index()]
    }
}

/// RAVE Monte Carlo tree search, parallelised at the root.
pub struct MctsStrategy {
    config: MctsConfig,
    pool: ThreadPool,
    /// Mixed into the seed so consecutive searches differ.
    searches: AtomicU64,
}

impl MctsStrategy {
    pub fn new(config: MctsConfig) -> Result<Self, EngineError> {
        let threads = if config.threads == 0 {
            num_cpus::get()
        } else {
            config.threads
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hex-mcts-{i}"))
            .build()?;
        Ok(MctsStrategy {
            config,
            pool,
            searches: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    fn search(&self, board: &HexBoard, player: Player, difficulty: Difficulty) -> Option<usize> {
        let started = Instant::now();
        let deadline = started + self.config.time_limit(difficulty);
        let rave_bias = if difficulty == Difficulty::Hard {
            RAVE_BIAS_HARD
        } else {
            RAVE_BIAS_OTHER
        };
        let search_no = self.searches.fetch_add(1, Ordering::Relaxed);
        let base_seed = self
            .config
            .seed
            .unwrap_or_else(rand::random)
            .wrapping_add(search_no.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let node_limit = self.config.node_limit;
        let workers = self.pool.current_num_threads().max(1);

        let (visits, iterations) = self.pool.install(|| {
            (0..workers)
                .into_par_iter()
                .map(|w| {
                    let seed = base_seed.wrapping_add(w as u64);
                    let mut tree = SearchTree::new(board, player, rave_bias, node_limit, seed);
                    let iterations = tree.run(board, deadline);
                    (tree.root_visits(), iterations)
                })
                .reduce(
                    || (HashMap::new(), 0u64),
                    |(mut acc, n_a), (part, n_b)| {
                        for (mv, v) in part {
                            *acc.entry(mv).or_insert(0) += v;
                        }
                        (acc, n_a + n_b)
                    },
                )
        });

        let best = visits
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(mv, _)| mv);

        debug!(
            %difficulty,
            workers,
            iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "mcts search finished"
        );
        best
    }
}

impl AiStrategy for MctsStrategy {
    fn select_move(
        &self,
        board: &HexBoard,
        player: Player,
        difficulty: Difficulty,
    ) -> Option<Cell> {
        let legal = board.legal_moves();
        let first = *legal.first()?;

        if let Some(win) = find_instant_outcome(board, &legal, player) {
            return Some(board.coord_of(win));
        }
        if let Some(block) = find_instant_outcome(board, &legal, player.opponent()) {
            return Some(board.coord_of(block));
        }

        let best = self.search(board, player, difficulty).unwrap_or(first);
        Some(board.coord_of(best))
    }
}

/// First legal move that completes a connection for `who`.
fn find_instant_outcome(board: &HexBoard, legal: &[usize], who: Player) -> Option<usize> {
    legal.iter().copied().find(|&mv| {
        let mut probe = board.clone();
        let cell = probe.coord_of(mv);
        probe.make_move(cell.row, cell.col, who) && probe.check_win() == Some(who)
    })
}

fn is_bridge_move(board: &HexBoard, cell: Cell, player: Player) -> bool {
    BRIDGE_OFFSETS.iter().any(|&(dr, dc)| {
        match (cell.row.checked_add_signed(dr), cell.col.checked_add_signed(dc)) {
            (Some(r), Some(c)) => board.get(r, c) == Some(player),
            _ => false,
        }
    })
}

/// Sorts ascending by heuristic score so the best candidate pops first.
fn order_moves(board: &HexBoard, mut moves: Vec<usize>, player: Player) -> Vec<usize> {
    let center_r = (board.rows() / 2) as i32;
    let center_c = (board.cols() / 2) as i32;
    moves.sort_by_cached_key(|&mv| {
        let cell = board.coord_of(mv);
        let dist = (cell.row as i32 - center_r).abs() + (cell.col as i32 - center_c).abs();
        let mut score = CENTER_BIAS - dist * DIST_PENALTY;
        if is_bridge_move(board, cell, player) {
            score += BRIDGE_BUILD;
        }
        score
    });
    moves
}

/// Empty cell adjacent to both `u` and `v`, other than `exclude`.
fn common_empty_neighbor(board: &HexBoard, u: usize, v: usize, exclude: usize) -> Option<usize> {
    let len = board.len();
    let nv = board.neighbors(v);
    board
        .neighbors(u)
        .iter()
        .copied()
        .find(|&n| n < len && n != exclude && board.stone_at(n).is_none() && nv.contains(&n))
}

/// If `last_move` cut into a bridge between two of `defender`'s stones,
/// returns the cell that restores the connection.
fn bridge_save(board: &HexBoard, last_move: usize, defender: Player) -> Option<usize> {
    let len = board.len();
    let friendly: Vec<usize> = board
        .neighbors(last_move)
        .iter()
        .copied()
        .filter(|&n| n < len && board.stone_at(n) == Some(defender))
        .collect();

    for (i, &a) in friendly.iter().enumerate() {
        for &b in &friendly[i + 1..] {
            if let Some(repair) = common_empty_neighbor(board, a, b, last_move) {
                return Some(repair);
            }
        }
    }
    None
}

struct Node {
    /// `None` only at the root.
    mv: Option<usize>,
    parent: Option<usize>,
    /// The player whose stone `mv` is.
    moved: Player,
    visits: u32,
    wins: f64,
    rave_visits: f64,
    rave_wins: f64,
    children: Vec<usize>,
    untried: Vec<usize>,
}

impl Node {
    fn new(mv: Option<usize>, parent: Option<usize>, moved: Player, untried: Vec<usize>) -> Self {
        Node {
            mv,
            parent,
            moved,
            visits: 0,
            wins: 0.0,
            rave_visits: 0.0,
            rave_wins: 0.0,
            children: Vec::with_capacity(8),
            untried,
        }
    }
}

/// One worker's search tree, stored as an index arena.
struct SearchTree {
    nodes: Vec<Node>,
    rave_bias: f64,
    node_limit: usize,
    rng: Xoshiro256PlusPlus,
    // Playout buffers, reused across iterations.
    sim_moves: Vec<usize>,
    sim_pos: Vec<usize>,
    played: [Vec<usize>; 2],
    amaf: Vec<bool>,
}

impl SearchTree {
    fn new(board: &HexBoard, player: Player, rave_bias: f64, node_limit: usize, seed: u64) -> Self {
        let untried = order_moves(board, board.legal_moves(), player);
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(Node::new(None, None, player.opponent(), untried));
        SearchTree {
            nodes,
            rave_bias,
            node_limit,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            sim_moves: Vec::with_capacity(board.len()),
            sim_pos: vec![NOT_LISTED; board.len()],
            played: [Vec::new(), Vec::new()],
            amaf: vec![false; board.len()],
        }
    }

    /// Runs iterations until the deadline or the node cap. Returns the count.
    fn run(&mut self, root_board: &HexBoard, deadline: Instant) -> u64 {
        let mut iterations = 0u64;
        loop {
            // Clock reads are comparatively expensive; check every 256 rounds.
            if iterations & 0xFF == 0
                && (Instant::now() >= deadline
                    || self.nodes.len() + NODE_POOL_MARGIN >= self.node_limit)
            {
                break;
            }

            let mut board = root_board.clone();
            let mut node = 0;

            while self.nodes[node].untried.is_empty() && !self.nodes[node].children.is_empty() {
                let Some(child) = self.select_child(node) else {
                    break;
                };
                node = child;
                if let Some(mv) = self.nodes[node].mv {
                    let cell = board.coord_of(mv);
                    board.make_move(cell.row, cell.col, self.nodes[node].moved);
                }
            }

            if !self.nodes[node].untried.is_empty() {
                node = self.expand(node, &mut board);
            }

            let to_move = self.nodes[node].moved.opponent();
            let winner = self.simulate(board, to_move);
            self.backpropagate(node, winner);
            iterations += 1;
        }
        iterations
    }

    fn select_child(&self, idx: usize) -> Option<usize> {
        let node = &self.nodes[idx];
        let log_visits = (node.visits as f64 + 1.0).ln();
        let mut best: Option<(usize, f64)> = None;

        for &c in &node.children {
            let child = &self.nodes[c];
            let v = child.visits as f64 + 1e-9;
            let rv = child.rave_visits + 1e-9;
            let w = child.wins / v;
            let rw = child.rave_wins / rv;

            let beta = if child.visits == 0 {
                1.0
            } else {
                rv / (rv + v + self.rave_bias * v * w)
            };
            let score = (1.0 - beta) * w + beta * rw + UCT_EXPLORATION * (log_visits / v).sqrt();

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((c, score));
            }
        }
        best.map(|(c, _)| c)
    }

    fn expand(&mut self, parent: usize, board: &mut HexBoard) -> usize {
        let Some(mv) = self.nodes[parent].untried.pop() else {
            return parent;
        };
        let mover = self.nodes[parent].moved.opponent();
        let cell = board.coord_of(mv);
        board.make_move(cell.row, cell.col, mover);

        let untried = if board.check_win().is_none() {
            order_moves(board, board.legal_moves(), mover.opponent())
        } else {
            Vec::new()
        };
        self.nodes.push(Node::new(Some(mv), Some(parent), mover, untried));
        let child = self.nodes.len() - 1;
        self.nodes[parent].children.push(child);
        child
    }

    fn simulate(&mut self, mut board: HexBoard, mut to_move: Player) -> Option<Player> {
        self.sim_moves.clear();
        self.sim_pos.fill(NOT_LISTED);
        for i in 0..board.len() {
            if board.stone_at(i).is_none() {
                self.sim_pos[i] = self.sim_moves.len();
                self.sim_moves.push(i);
            }
        }
        self.played[0].clear();
        self.played[1].clear();

        let mut winner = board.check_win();
        let mut last = None;

        while winner.is_none() && !self.sim_moves.is_empty() {
            let save = last
                .and_then(|m| bridge_save(&board, m, to_move))
                .filter(|&s| self.sim_pos[s] != NOT_LISTED);
            let selected = match save {
                Some(s) => s,
                None => self.sim_moves[self.rng.random_range(0..self.sim_moves.len())],
            };

            // Swap-remove from the move list, keeping positions in sync.
            let pos = self.sim_pos[selected];
            let tail = self.sim_moves[self.sim_moves.len() - 1];
            self.sim_moves[pos] = tail;
            self.sim_pos[tail] = pos;
            self.sim_moves.pop();
            self.sim_pos[selected] = NOT_LISTED;

            let cell = board.coord_of(selected);
            board.make_move(cell.row, cell.col, to_move);
            self.played[to_move.slot()].push(selected);

            last = Some(selected);
            winner = board.check_win();
            to_move = to_move.opponent();
        }
        winner
    }

    fn backpropagate(&mut self, leaf: usize, winner: Option<Player>) {
        self.amaf.fill(false);
        if let Some(w) = winner {
            for &m in &self.played[w.slot()] {
                self.amaf[m] = true;
            }
        }

        let mut cursor = Some(leaf);
        while let Some(idx) = cursor {
            let node = &mut self.nodes[idx];
            node.visits += 1;
            if Some(node.moved) == winner {
                node.wins += 1.0;
            }

            let children = std::mem::take(&mut node.children);
            for &c in &children {
                let child = &mut self.nodes[c];
                if child.mv.is_some_and(|mv| self.amaf[mv]) {
                    child.rave_visits += 1.0;
                    if Some(child.moved) == winner {
                        child.rave_wins += 1.0;
                    }
                }
            }
            self.nodes[idx].children = children;
            cursor = self.nodes[idx].parent;
        }
    }

    fn root_visits(&self) -> HashMap<usize, u64> {
        self.nodes[0]
            .children
            .iter()
            .filter_map(|&c| {
                let child = &self.nodes[c];
                child.mv.map(|mv| (mv, child.visits as u64))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quick_strategy() -> MctsStrategy {
        MctsStrategy::new(MctsConfig {
            threads: 2,
            time_limits: [Duration::from_millis(20); 3],
            node_limit: 20_000,
            seed: Some(7),
        })
        .unwrap()
    }

    #[test]
    fn test_takes_immediate_win() {
        let mut board = HexBoard::new(3, 3);
        board.make_move(0, 0, Player::One);
        board.make_move(0, 1, Player::One);
        board.make_move(2, 1, Player::Two);
        board.make_move(2, 2, Player::Two);

        let mv = quick_strategy().select_move(&board, Player::One, Difficulty::Easy);
        assert_eq!(mv, Some(Cell::new(0, 2)));
    }

    #[test]
    fn test_blocks_immediate_loss() {
        let mut board = HexBoard::new(5, 5);
        for (r, c) in [(0, 2), (1, 2), (2, 2), (3, 2)] {
            board.make_move(r, c, Player::Two);
        }
        board.make_move(0, 0, Player::One);

        let mv = quick_strategy().select_move(&board, Player::One, Difficulty::Medium);
        assert_eq!(mv, Some(Cell::new(4, 2)));
    }

    #[test]
    fn test_search_returns_empty_cell() {
        let mut board = HexBoard::new(5, 5);
        board.make_move(2, 2, Player::One);
        board.make_move(1, 2, Player::Two);

        let cell = quick_strategy()
            .select_move(&board, Player::One, Difficulty::Hard)
            .unwrap();
        assert!(board.is_valid(cell.row, cell.col));
        assert_eq!(board.get(cell.row, cell.col), None);
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut board = HexBoard::new(2, 2);
        board.make_move(0, 0, Player::One);
        board.make_move(0, 1, Player::Two);
        board.make_move(1, 0, Player::Two);
        board.make_move(1, 1, Player::One);
        assert_eq!(quick_strategy().select_move(&board, Player::One, Difficulty::Easy), None);
    }

    #[test]
    fn test_center_is_tried_first_on_empty_board() {
        let board = HexBoard::new(5, 5);
        let ordered = order_moves(&board, board.legal_moves(), Player::One);
        assert_eq!(ordered.last().copied(), Some(12));
    }

    #[test]
    fn test_bridge_save_repairs_intrusion() {
        let mut board = HexBoard::new(5, 5);
        // Two Red stones in a bridge around (1, 2) and (2, 2).
        board.make_move(1, 1, Player::One);
        board.make_move(2, 3, Player::One);
        let repair = {
            let mut b = board.clone();
            b.make_move(1, 2, Player::Two);
            bridge_save(&b, b.index_of(Cell::new(1, 2)).unwrap(), Player::One)
        };
        assert_eq!(repair, board.index_of(Cell::new(2, 2)));
    }
}
