//! Chain-reaction resolution.
//!
//! A cell that reaches the explosion threshold empties itself and pushes
//! one dot into each orthogonal neighbor (up, down, left, right), taking
//! ownership of every cell it touches. A neighbor that reaches the
//! threshold explodes in turn, and its whole sub-cascade resolves before
//! the next sibling neighbor receives its dot.
//!
//! The walk uses an explicit stack of neighbor iterators instead of call
//! recursion so a worst-case cascade costs heap, not native stack. Each
//! stack frame is one explosion still handing out dots; popping a frame
//! returns to the explosion that triggered it, which is exactly the order
//! a recursive depth-first walk would produce.
//!
//! ## Termination
//!
//! An explosion hands out one dot per neighbor, so dots only ever leave
//! the board through cells with fewer neighbors than the threshold. A
//! cascade stops once the board has such a drain and the threshold is at
//! least the largest neighbor count. On a 2-D board a threshold of 2 or 3
//! would let interior cells fire forever, and on 1×2 or 2×2 boards every
//! cell has the same degree and nothing drains. The engine never runs with
//! such a threshold: its constructors raise it to
//! `BoardSize::min_stable_threshold`, and `GameState::check` rejects
//! snapshots below it.

use std::vec::IntoIter;

use chain_reaction_protocol::{BoardSize, ChainReaction, GameState, PlayerId, Position};

/// In-bounds orthogonal neighbors of `pos`, in up, down, left, right order.
pub(crate) fn neighbors(size: BoardSize, pos: Position) -> Vec<Position> {
    let mut out = Vec::with_capacity(4);
    if pos.row > 0 {
        out.push(Position::new(pos.row - 1, pos.col));
    }
    if pos.row + 1 < size.rows {
        out.push(Position::new(pos.row + 1, pos.col));
    }
    if pos.col > 0 {
        out.push(Position::new(pos.row, pos.col - 1));
    }
    if pos.col + 1 < size.cols {
        out.push(Position::new(pos.row, pos.col + 1));
    }
    out
}

/// Resolves every explosion triggered from `origin` and returns them in
/// the order they happened. Leaves the board settled.
pub(crate) fn resolve(
    state: &mut GameState,
    origin: Position,
    mover: &PlayerId,
    timestamp: u64,
) -> Vec<ChainReaction> {
    let mut reactions = Vec::new();
    let mut stack: Vec<IntoIter<Position>> = Vec::new();

    if let Some(frame) = explode(state, origin, mover, timestamp, &mut reactions) {
        stack.push(frame);
    }

    while let Some(frame) = stack.last_mut() {
        let Some(next) = frame.next() else {
            stack.pop();
            continue;
        };

        let Some(cell) = state.cell_mut(next) else {
            continue;
        };
        cell.dots = cell.dots.saturating_add(1);
        cell.owner = Some(mover.clone());

        if let Some(frame) = explode(state, next, mover, timestamp, &mut reactions) {
            stack.push(frame);
        }
    }

    reactions
}

/// Explodes the cell at `pos` if it is at or above the threshold,
/// returning the neighbors that still need their dot.
fn explode(
    state: &mut GameState,
    pos: Position,
    mover: &PlayerId,
    timestamp: u64,
    reactions: &mut Vec<ChainReaction>,
) -> Option<IntoIter<Position>> {
    let threshold = state.max_dots_per_cell;
    let size = state.board_size;
    let cell = state.cell_mut(pos)?;
    if cell.dots < threshold {
        return None;
    }

    cell.clear();
    reactions.push(ChainReaction {
        position: pos,
        player_id: mover.clone(),
        timestamp,
    });
    Some(neighbors(size, pos).into_iter())
}
