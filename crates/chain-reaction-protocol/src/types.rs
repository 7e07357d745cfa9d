//! Core data model for Chain Reaction.
//!
//! Every type here is a plain value: `Clone` produces a fully independent
//! copy (no shared references into boards or player lists), which is what
//! lets the engine hand out snapshots without callers being able to reach
//! back into its state.
//!
//! JSON field names follow the camelCase layout that browser clients read.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for a player, supplied by the transport layer
/// (typically a socket id).
///
/// `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Short room code such as `"K3Q9ZT0B"`. Generated by the room registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Board geometry
// ---------------------------------------------------------------------------

/// A cell coordinate on the board. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Board dimensions.
///
/// The engine accepts any size; the presets are the ones offered in the
/// lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    pub rows: usize,
    pub cols: usize,
}

impl BoardSize {
    pub const SMALL: Self = Self::new(6, 8);
    pub const MEDIUM: Self = Self::new(8, 10);
    pub const LARGE: Self = Self::new(10, 12);

    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    pub const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if `pos` lies on the board.
    pub const fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Lowest explosion threshold for which every cascade on this board
    /// stops.
    ///
    /// An exploding cell hands one dot to each in-bounds neighbor. If the
    /// threshold is below a cell's neighbor count, that cell adds dots to
    /// the board every time it fires and a cascade can grow without end.
    /// At exactly the largest neighbor count, interior explosions keep the
    /// total constant and edge explosions shed dots, so the board always
    /// settles, as long as some cell has fewer neighbors than the maximum
    /// to act as a drain. Boards where every cell has the same neighbor
    /// count (1×1, 1×2, 2×2) have no drain and need one more.
    ///
    /// | board (either orientation) | threshold |
    /// |----------------------------|-----------|
    /// | 1×1, 1×2, 1×N              | 2         |
    /// | 2×2, 2×N (N ≥ 3)           | 3         |
    /// | 3×3 and larger             | 4         |
    ///
    /// Never returns less than 2.
    pub const fn min_stable_threshold(&self) -> u32 {
        const fn most(len: usize) -> u32 {
            match len {
                0 | 1 => 0,
                2 => 1,
                _ => 2,
            }
        }
        const fn least(len: usize) -> u32 {
            if len <= 1 { 0 } else { 1 }
        }

        let max_neighbors = most(self.rows) + most(self.cols);
        let min_neighbors = least(self.rows) + least(self.cols);
        let needed = if max_neighbors == min_neighbors {
            max_neighbors + 1
        } else {
            max_neighbors
        };
        if needed < 2 { 2 } else { needed }
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

// ---------------------------------------------------------------------------
// Cell / Player
// ---------------------------------------------------------------------------

/// One square of the board.
///
/// Invariant: `owner` is `Some` iff `dots > 0`. In a settled state `dots`
/// stays below the game's `max_dots_per_cell`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub dots: u32,
    /// Serialized as `playerId` for client compatibility.
    #[serde(rename = "playerId")]
    pub owner: Option<PlayerId>,
    pub position: Position,
}

impl Cell {
    pub fn empty(position: Position) -> Self {
        Self {
            dots: 0,
            owner: None,
            position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dots == 0
    }

    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref() == Some(player)
    }

    /// Resets the cell to 0 dots and no owner.
    pub fn clear(&mut self) {
        self.dots = 0;
        self.owner = None;
    }
}

/// A seat at the table.
///
/// `dot_count` is a cache of the dots on cells this player owns. The
/// engine recomputes it after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// CSS hex color, e.g. `"#FF6B6B"`.
    pub color: String,
    pub is_active: bool,
    pub dot_count: u32,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The complete state of one game: the unit of persistence and exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: RoomId,
    /// Row-major grid: `board[row][col]`.
    pub board: Vec<Vec<Cell>>,
    /// Join order is turn order. Departed players stay, marked inactive.
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub is_game_over: bool,
    pub winner: Option<Player>,
    pub board_size: BoardSize,
    pub max_dots_per_cell: u32,
    pub initial_dots_per_player: u32,
}

impl GameState {
    /// A fresh state with an empty board and no players.
    pub fn empty(
        id: RoomId,
        board_size: BoardSize,
        max_dots_per_cell: u32,
        initial_dots_per_player: u32,
    ) -> Self {
        let board = (0..board_size.rows)
            .map(|row| {
                (0..board_size.cols)
                    .map(|col| Cell::empty(Position::new(row, col)))
                    .collect()
            })
            .collect();

        Self {
            id,
            board,
            players: Vec::new(),
            current_player_index: 0,
            is_game_over: false,
            winner: None,
            board_size,
            max_dots_per_cell,
            initial_dots_per_player,
        }
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.board.get(pos.row)?.get(pos.col)
    }

    pub fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.board.get_mut(pos.row)?.get_mut(pos.col)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.board.iter().flatten()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// The player whose turn it is, if any players have joined.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active)
    }

    /// Sum of dots over the whole board.
    pub fn total_dots(&self) -> u32 {
        self.cells().map(|c| c.dots).sum()
    }

    /// Verifies the structural invariants a snapshot must satisfy before
    /// an engine can load it:
    ///
    /// - `max_dots_per_cell` is at least
    ///   [`BoardSize::min_stable_threshold`], so cascades stop
    /// - the grid matches `board_size` and every cell knows its position
    /// - a cell has an owner iff it has dots, and the owner is seated
    /// - the board is settled: no cell at or above `max_dots_per_cell`
    /// - `current_player_index` points at a seat when anyone is seated
    ///
    /// Snapshots arriving from outside the process go through this before
    /// an engine touches them.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidSnapshot`] describing the first
    /// violation found.
    pub fn check(&self) -> Result<(), ProtocolError> {
        let floor = self.board_size.min_stable_threshold();
        if self.max_dots_per_cell < floor {
            return Err(ProtocolError::InvalidSnapshot(format!(
                "maxDotsPerCell {} never settles on a {} board (need at least {floor})",
                self.max_dots_per_cell, self.board_size
            )));
        }
        if self.board.len() != self.board_size.rows {
            return Err(ProtocolError::InvalidSnapshot(format!(
                "board has {} rows, boardSize says {}",
                self.board.len(),
                self.board_size.rows
            )));
        }
        for (row, cells) in self.board.iter().enumerate() {
            if cells.len() != self.board_size.cols {
                return Err(ProtocolError::InvalidSnapshot(format!(
                    "row {row} has {} cells, boardSize says {}",
                    cells.len(),
                    self.board_size.cols
                )));
            }
            for (col, cell) in cells.iter().enumerate() {
                let expected = Position::new(row, col);
                if cell.position != expected {
                    return Err(ProtocolError::InvalidSnapshot(format!(
                        "cell at {expected} claims position {}",
                        cell.position
                    )));
                }
                if (cell.dots > 0) != cell.owner.is_some() {
                    return Err(ProtocolError::InvalidSnapshot(format!(
                        "cell {expected} has {} dots and owner {:?}",
                        cell.dots, cell.owner
                    )));
                }
                if cell.dots >= self.max_dots_per_cell {
                    return Err(ProtocolError::InvalidSnapshot(format!(
                        "cell {expected} holds {} dots, explodes at {}",
                        cell.dots, self.max_dots_per_cell
                    )));
                }
                if let Some(owner) = &cell.owner {
                    if self.player(owner).is_none() {
                        return Err(ProtocolError::InvalidSnapshot(format!(
                            "cell {expected} owned by unknown player {owner}"
                        )));
                    }
                }
            }
        }
        if !self.players.is_empty() && self.current_player_index >= self.players.len() {
            return Err(ProtocolError::InvalidSnapshot(format!(
                "currentPlayerIndex {} out of range for {} players",
                self.current_player_index,
                self.players.len()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Move / ChainReaction
// ---------------------------------------------------------------------------

/// A request to place one dot. Not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub player_id: PlayerId,
    pub position: Position,
}

impl Move {
    pub fn new(player_id: impl Into<PlayerId>, position: Position) -> Self {
        Self {
            player_id: player_id.into(),
            position,
        }
    }
}

/// One explosion. A move returns these in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReaction {
    pub position: Position,
    pub player_id: PlayerId,
    /// Unix time in milliseconds.
    pub timestamp: u64,
}

// =========================================================================
// Tests
// =========================================================================
