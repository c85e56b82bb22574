//! Match-3 board and match resolution
//!
//! The straight-line scan is the only rule that removes gems: three or more
//! equal gems in an unbroken row or column. Flood-fill connectivity is kept
//! as a separate query (used for the selection highlight) and is not meant
//! to agree with the scan.
//!
//! Row 0 is the top of the board; gravity pulls gems toward the last row.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Grid coordinate (row-major ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbours (a diagonal step is not adjacent)
    pub fn is_adjacent(&self, other: &Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// A gem; `kind` is in `[0, type_count)` for generated boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gem {
    pub kind: u8,
}

/// Summary of a full cascade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Remove/compact/refill cycles performed
    pub waves: u32,
    /// Gems removed over all waves
    pub removed: usize,
    pub points: u64,
}

/// Fewest gem kinds `Board::generate` will draw from; with two or fewer a
/// match-free full board is practically unreachable
pub const MIN_GEM_KINDS: u8 = 3;

/// Random gem type in `[0, type_count)`
pub fn random_kind<R: Rng>(rng: &mut R, type_count: u8) -> u8 {
    rng.random_range(0..type_count.max(1))
}

/// Fixed-size grid of optional gems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Gem>>,
}

impl Board {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Build a board from explicit gem kinds, one slice per row
    ///
    /// Rows shorter than the first are padded with empty cells.
    pub fn from_kinds(kinds: &[&[u8]]) -> Self {
        let rows = kinds.len();
        let cols = kinds.first().map_or(0, |r| r.len());
        let mut board = Self::empty(rows, cols);
        for (row, line) in kinds.iter().enumerate() {
            for (col, kind) in line.iter().take(cols).enumerate() {
                board.set(Coord::new(row, col), Some(Gem { kind: *kind }));
            }
        }
        board
    }

    /// Random board guaranteed to contain no match
    ///
    /// The whole board is redrawn until the scan comes back empty.
    /// `type_count` is raised to `MIN_GEM_KINDS` if lower.
    pub fn generate<R: Rng>(rows: usize, cols: usize, type_count: u8, rng: &mut R) -> Self {
        let type_count = type_count.max(MIN_GEM_KINDS);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let mut board = Self::empty(rows, cols);
            board.refill(|_| random_kind(rng, type_count));
            if board.find_matches().is_empty() {
                log::debug!("Generated {}x{} board in {} attempt(s)", rows, cols, attempts);
                return board;
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        coord.row * self.cols + coord.col
    }

    pub fn get(&self, coord: Coord) -> Option<Gem> {
        if self.contains(coord) {
            self.cells[self.index(coord)]
        } else {
            None
        }
    }

    pub fn kind(&self, coord: Coord) -> Option<u8> {
        self.get(coord).map(|g| g.kind)
    }

    /// Out-of-range writes are ignored
    pub fn set(&mut self, coord: Coord, gem: Option<Gem>) {
        if self.contains(coord) {
            let i = self.index(coord);
            self.cells[i] = gem;
        }
    }

    /// All coordinates, row-major
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Coord::new(row, col)))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Exchange two cells; false (and no change) if either is off the board
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
        true
    }

    /// Provisionally swap two adjacent gems and rescan the whole board
    ///
    /// Returns `None` (board untouched) when the pair is not a legal swap.
    /// Otherwise the swap stays applied and the post-swap matches are
    /// returned; an empty set means the caller must revert it.
    pub fn swap_and_scan(&mut self, a: Coord, b: Coord) -> Option<BTreeSet<Coord>> {
        if !a.is_adjacent(&b) || self.get(a).is_none() || self.get(b).is_none() {
            return None;
        }
        self.swap(a, b);
        Some(self.find_matches())
    }

    /// Every cell belonging to a horizontal or vertical run of three or more
    pub fn find_matches(&self) -> BTreeSet<Coord> {
        let mut matches = BTreeSet::new();
        for coord in self.coords() {
            let Some(kind) = self.kind(coord) else {
                continue;
            };
            let Coord { row, col } = coord;

            // Horizontal
            if col + 2 < self.cols
                && self.kind(Coord::new(row, col + 1)) == Some(kind)
                && self.kind(Coord::new(row, col + 2)) == Some(kind)
            {
                matches.extend([coord, Coord::new(row, col + 1), Coord::new(row, col + 2)]);
            }

            // Vertical
            if row + 2 < self.rows
                && self.kind(Coord::new(row + 1, col)) == Some(kind)
                && self.kind(Coord::new(row + 2, col)) == Some(kind)
            {
                matches.extend([coord, Coord::new(row + 1, col), Coord::new(row + 2, col)]);
            }
        }
        matches
    }

    /// Length of the straight runs through `coord` (horizontal, vertical)
    fn runs_through(&self, coord: Coord) -> (usize, usize) {
        let Some(kind) = self.kind(coord) else {
            return (0, 0);
        };
        let same = |r: usize, c: usize| self.kind(Coord::new(r, c)) == Some(kind);

        let mut horizontal = 1;
        let mut c = coord.col;
        while c > 0 && same(coord.row, c - 1) {
            horizontal += 1;
            c -= 1;
        }
        let mut c = coord.col + 1;
        while c < self.cols && same(coord.row, c) {
            horizontal += 1;
            c += 1;
        }

        let mut vertical = 1;
        let mut r = coord.row;
        while r > 0 && same(r - 1, coord.col) {
            vertical += 1;
            r -= 1;
        }
        let mut r = coord.row + 1;
        while r < self.rows && same(r, coord.col) {
            vertical += 1;
            r += 1;
        }

        (horizontal, vertical)
    }

    fn in_line_of_three(&self, coord: Coord) -> bool {
        let (h, v) = self.runs_through(coord);
        h >= 3 || v >= 3
    }

    /// Whether any single adjacent swap would produce a match
    pub fn has_valid_move(&self) -> bool {
        let mut probe = self.clone();
        for coord in self.coords() {
            let neighbours = [
                Coord::new(coord.row, coord.col + 1),
                Coord::new(coord.row + 1, coord.col),
            ];
            for other in neighbours {
                if !self.contains(other) || self.get(coord).is_none() || self.get(other).is_none() {
                    continue;
                }
                if self.kind(coord) == self.kind(other) {
                    continue;
                }
                probe.swap(coord, other);
                let found = probe.in_line_of_three(coord) || probe.in_line_of_three(other);
                probe.swap(coord, other);
                if found {
                    return true;
                }
            }
        }
        false
    }

    /// Clear the given cells, returning how many gems were removed
    pub fn remove(&mut self, cells: &BTreeSet<Coord>) -> usize {
        let mut removed = 0;
        for coord in cells {
            if self.get(*coord).is_some() {
                self.set(*coord, None);
                removed += 1;
            }
        }
        removed
    }

    /// Slide gems down each column into empty cells, keeping their order
    ///
    /// Returns the number of gems that moved.
    pub fn collapse(&mut self) -> usize {
        let mut moved = 0;
        for col in 0..self.cols {
            let mut write = self.rows;
            for row in (0..self.rows).rev() {
                let from = Coord::new(row, col);
                if let Some(gem) = self.get(from) {
                    write -= 1;
                    if write != row {
                        self.set(Coord::new(write, col), Some(gem));
                        self.set(from, None);
                        moved += 1;
                    }
                }
            }
        }
        moved
    }

    /// Fill every empty cell (row-major) with a kind chosen by `next_kind`
    pub fn refill(&mut self, mut next_kind: impl FnMut(Coord) -> u8) -> usize {
        let empty: Vec<Coord> = self.coords().filter(|c| self.get(*c).is_none()).collect();
        for coord in &empty {
            let kind = next_kind(*coord);
            self.set(*coord, Some(Gem { kind }));
        }
        empty.len()
    }

    /// One remove/compact/refill cycle; returns gems removed (0 when stable)
    pub fn cascade_step(&mut self, next_kind: impl FnMut(Coord) -> u8) -> usize {
        let matches = self.find_matches();
        if matches.is_empty() {
            return 0;
        }
        let removed = self.remove(&matches);
        self.collapse();
        self.refill(next_kind);
        removed
    }

    /// Run cascades until the scan finds nothing
    pub fn resolve_cascade(&mut self, mut next_kind: impl FnMut(Coord) -> u8, points_per_gem: u64) -> CascadeReport {
        let mut report = CascadeReport::default();
        loop {
            let removed = self.cascade_step(&mut next_kind);
            if removed == 0 {
                break;
            }
            report.waves += 1;
            report.removed += removed;
            report.points += removed as u64 * points_per_gem;
            log::debug!("Cascade wave {}: {} gems", report.waves, removed);
        }
        report
    }

    /// Gems of the same kind reachable from `start` through 4-neighbours
    pub fn connected(&self, start: Coord) -> Vec<Coord> {
        let Some(kind) = self.kind(start) else {
            return Vec::new();
        };
        let mut visited = vec![false; self.rows * self.cols];
        let mut group = Vec::new();
        let mut stack = vec![start];
        visited[self.index(start)] = true;

        while let Some(coord) = stack.pop() {
            group.push(coord);
            let Coord { row, col } = coord;
            let mut neighbours = Vec::with_capacity(4);
            if row > 0 {
                neighbours.push(Coord::new(row - 1, col));
            }
            if col > 0 {
                neighbours.push(Coord::new(row, col - 1));
            }
            neighbours.push(Coord::new(row + 1, col));
            neighbours.push(Coord::new(row, col + 1));

            for next in neighbours {
                if !self.contains(next) || self.kind(next) != Some(kind) {
                    continue;
                }
                let i = self.index(next);
                if !visited[i] {
                    visited[i] = true;
                    stack.push(next);
                }
            }
        }
        group.sort();
        group
    }
}
