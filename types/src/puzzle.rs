//! Matching-pairs puzzle board.
//!
//! A small finite-state game: a shuffled deck of duplicated symbols, a
//! two-slot selection buffer, and a lock/compare/reset cycle resolved on a
//! fixed delay. The board is driven by `advance(delta)` from the frame loop.

use std::time::Duration;

use crate::timing::PhaseTimer;

/// Delay between the second selection and the pair comparison.
pub const RESOLVE_DELAY: Duration = Duration::from_millis(700);

/// One face-down/face-up cell in a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleCell {
    id: usize,
    symbol: String,
    shown: bool,
    matched: bool,
}

impl PuzzleCell {
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Face-up pending resolution.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Permanently face-up. Monotonic within a deal.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Whether the symbol is currently visible for any reason.
    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.shown || self.matched
    }
}

/// A buffered pair awaiting comparison. Its existence is the lock.
#[derive(Debug, Clone)]
struct PendingResolution {
    first: usize,
    second: usize,
    timer: PhaseTimer,
}

/// Outcome of a resolution cycle, reported to the caller for feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Matched,
    Mismatched,
}

/// One freshly shuffled instance of the matching-pairs cell set.
#[derive(Debug, Clone)]
pub struct PairsBoard {
    cells: Vec<PuzzleCell>,
    selection: Vec<usize>,
    pending: Option<PendingResolution>,
    moves: usize,
}

impl PairsBoard {
    /// Build a new deal from a symbol set: every symbol duplicated once,
    /// stable sequential ids, uniform shuffle, all cells face-down.
    /// Duplicate symbols in the input are collapsed so the two-per-symbol
    /// invariant holds by construction.
    #[must_use]
    pub fn deal(symbols: &[&str]) -> Self {
        let mut unique: Vec<&str> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !unique.contains(symbol) {
                unique.push(symbol);
            }
        }

        let mut cells: Vec<PuzzleCell> = unique
            .iter()
            .flat_map(|symbol| [*symbol, *symbol])
            .enumerate()
            .map(|(id, symbol)| PuzzleCell {
                id,
                symbol: symbol.to_string(),
                shown: false,
                matched: false,
            })
            .collect();

        use rand::seq::SliceRandom;
        cells.shuffle(&mut rand::rng());

        Self {
            cells,
            selection: Vec::with_capacity(2),
            pending: None,
            moves: 0,
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[PuzzleCell] {
        &self.cells
    }

    /// Number of resolution cycles completed so far.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// True while a pair comparison is pending; no selections are accepted.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.pending.is_some()
    }

    /// Indices currently face-up awaiting resolution, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Derived completion: every cell matched. Never a stored flag.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(PuzzleCell::is_matched)
    }

    /// Progress of the pending resolution delay, for render feedback.
    #[must_use]
    pub fn resolve_progress(&self) -> Option<f32> {
        self.pending.as_ref().map(|p| p.timer.progress())
    }

    /// Reveal a cell. No-op while locked, out of bounds, or when the cell is
    /// already matched or already shown. The second selection arms the
    /// resolution timer.
    pub fn select(&mut self, index: usize) {
        if self.pending.is_some() {
            return;
        }
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if cell.matched || cell.shown {
            return;
        }

        cell.shown = true;
        self.selection.push(index);

        if self.selection.len() == 2 {
            self.pending = Some(PendingResolution {
                first: self.selection[0],
                second: self.selection[1],
                timer: PhaseTimer::new(RESOLVE_DELAY),
            });
        }
    }

    /// Advance the resolution timer by a frame delta. Returns the outcome
    /// when a pending comparison fires on this call.
    pub fn advance(&mut self, delta: Duration) -> Option<ResolveOutcome> {
        let pending = self.pending.as_mut()?;
        pending.timer.advance(delta);
        if !pending.timer.is_finished() {
            return None;
        }

        let (first, second) = (pending.first, pending.second);
        let outcome = if self.cells[first].symbol == self.cells[second].symbol {
            self.cells[first].matched = true;
            self.cells[second].matched = true;
            ResolveOutcome::Matched
        } else {
            self.cells[first].shown = false;
            self.cells[second].shown = false;
            ResolveOutcome::Mismatched
        };

        self.selection.clear();
        self.pending = None;
        self.moves += 1;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::{PairsBoard, RESOLVE_DELAY, ResolveOutcome};
    use std::collections::HashMap;
    use std::time::Duration;

    const SYMBOLS: &[&str] = &["sun", "moon", "star", "leaf"];

    /// Find two cell indices sharing (or not sharing) a symbol.
    fn find_pair(board: &PairsBoard, equal: bool) -> (usize, usize) {
        let cells = board.cells();
        for i in 0..cells.len() {
            for j in (i + 1)..cells.len() {
                if (cells[i].symbol() == cells[j].symbol()) == equal {
                    return (i, j);
                }
            }
        }
        panic!("no suitable pair in deal");
    }

    #[test]
    fn deal_duplicates_every_symbol_exactly_twice() {
        let board = PairsBoard::deal(SYMBOLS);
        assert_eq!(board.cells().len(), 2 * SYMBOLS.len());

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for cell in board.cells() {
            *counts.entry(cell.symbol()).or_default() += 1;
            assert!(!cell.is_shown());
            assert!(!cell.is_matched());
        }
        for symbol in SYMBOLS {
            assert_eq!(counts.get(symbol), Some(&2), "symbol {symbol}");
        }
    }

    #[test]
    fn deal_assigns_unique_sequential_ids() {
        let board = PairsBoard::deal(SYMBOLS);
        let mut ids: Vec<usize> = board.cells().iter().map(super::PuzzleCell::id).collect();
        ids.sort_unstable();
        let expected: Vec<usize> = (0..2 * SYMBOLS.len()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn deal_collapses_duplicate_symbols() {
        let board = PairsBoard::deal(&["sun", "sun", "moon"]);
        assert_eq!(board.cells().len(), 4);
    }

    #[test]
    fn matching_pair_resolves_to_matched() {
        let mut board = PairsBoard::deal(SYMBOLS);
        let (a, b) = find_pair(&board, true);

        board.select(a);
        board.select(b);
        assert!(board.is_locked());

        let outcome = board.advance(RESOLVE_DELAY);
        assert_eq!(outcome, Some(ResolveOutcome::Matched));
        assert!(board.cells()[a].is_matched());
        assert!(board.cells()[b].is_matched());
        assert!(!board.is_locked());
        assert!(board.selection().is_empty());
    }

    #[test]
    fn mismatched_pair_reverts_to_hidden() {
        let mut board = PairsBoard::deal(SYMBOLS);
        let (a, b) = find_pair(&board, false);

        board.select(a);
        board.select(b);

        let outcome = board.advance(RESOLVE_DELAY);
        assert_eq!(outcome, Some(ResolveOutcome::Mismatched));
        assert!(!board.cells()[a].is_face_up());
        assert!(!board.cells()[b].is_face_up());
        assert!(!board.is_locked());
    }

    #[test]
    fn resolution_waits_for_full_delay() {
        let mut board = PairsBoard::deal(SYMBOLS);
        let (a, b) = find_pair(&board, true);
        board.select(a);
        board.select(b);

        assert_eq!(board.advance(RESOLVE_DELAY / 2), None);
        assert!(board.is_locked());
        assert_eq!(
            board.advance(RESOLVE_DELAY / 2),
            Some(ResolveOutcome::Matched)
        );
    }

    #[test]
    fn third_selection_while_locked_is_a_no_op() {
        let mut board = PairsBoard::deal(SYMBOLS);
        let (a, b) = find_pair(&board, false);
        board.select(a);
        board.select(b);

        let before: Vec<_> = board.cells().to_vec();
        let third = (0..board.cells().len())
            .find(|i| *i != a && *i != b)
            .unwrap();
        board.select(third);

        assert_eq!(board.cells(), before.as_slice());
        assert_eq!(board.selection().len(), 2);
    }

    #[test]
    fn reselecting_a_shown_cell_is_a_no_op() {
        let mut board = PairsBoard::deal(SYMBOLS);
        board.select(0);
        board.select(0);
        assert_eq!(board.selection(), &[0]);
        assert!(!board.is_locked());
    }

    #[test]
    fn selecting_a_matched_cell_is_a_no_op() {
        let mut board = PairsBoard::deal(SYMBOLS);
        let (a, b) = find_pair(&board, true);
        board.select(a);
        board.select(b);
        board.advance(RESOLVE_DELAY);

        board.select(a);
        assert!(board.selection().is_empty());
        assert!(board.cells()[a].is_matched());
    }

    #[test]
    fn out_of_bounds_selection_is_a_no_op() {
        let mut board = PairsBoard::deal(SYMBOLS);
        board.select(999);
        assert!(board.selection().is_empty());
    }

    #[test]
    fn solved_only_when_every_cell_matched() {
        let mut board = PairsBoard::deal(&["sun", "moon"]);
        assert!(!board.is_solved());

        // Resolve both pairs.
        for _ in 0..2 {
            let (a, b) = {
                let cells = board.cells();
                let mut found = None;
                for i in 0..cells.len() {
                    for j in (i + 1)..cells.len() {
                        if !cells[i].is_matched()
                            && !cells[j].is_matched()
                            && cells[i].symbol() == cells[j].symbol()
                        {
                            found = Some((i, j));
                        }
                    }
                }
                found.unwrap()
            };
            board.select(a);
            board.select(b);
            board.advance(RESOLVE_DELAY);
        }

        assert!(board.is_solved());
        assert_eq!(board.moves(), 2);
    }

    #[test]
    fn matched_is_monotonic_within_a_deal() {
        let mut board = PairsBoard::deal(SYMBOLS);
        let (a, b) = find_pair(&board, true);
        board.select(a);
        board.select(b);
        board.advance(RESOLVE_DELAY);

        // A later mismatch involving other cells never clears matched flags.
        let (c, d) = {
            let cells = board.cells();
            let mut found = None;
            for i in 0..cells.len() {
                for j in (i + 1)..cells.len() {
                    if !cells[i].is_matched()
                        && !cells[j].is_matched()
                        && cells[i].symbol() != cells[j].symbol()
                    {
                        found = Some((i, j));
                    }
                }
            }
            found.unwrap()
        };
        board.select(c);
        board.select(d);
        board.advance(RESOLVE_DELAY);

        assert!(board.cells()[a].is_matched());
        assert!(board.cells()[b].is_matched());
    }

    #[test]
    fn advance_without_pending_returns_none() {
        let mut board = PairsBoard::deal(SYMBOLS);
        assert_eq!(board.advance(Duration::from_secs(10)), None);
    }
}
