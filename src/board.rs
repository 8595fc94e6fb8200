use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::piece::{Color, Move, Piece, PieceId, PieceKind, Position};

/// Consecutive moves without capture or promotion after which the game is drawn.
pub const NO_PROGRESS_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardSize {
    #[serde(rename = "4x4")]
    Small,
    #[serde(rename = "8x8")]
    Standard,
}

impl BoardSize {
    pub fn dimension(&self) -> usize {
        match self {
            BoardSize::Small => 4,
            BoardSize::Standard => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoardSize::Small => "4x4",
            BoardSize::Standard => "8x8",
        }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardSizeError {
    #[error("unsupported board size `{0}`, expected 4x4 or 8x8")]
    Unsupported(String),
}

impl FromStr for BoardSize {
    type Err = BoardSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "4x4" | "4" => Ok(BoardSize::Small),
            "8x8" | "8" => Ok(BoardSize::Standard),
            other => Err(BoardSizeError::Unsupported(other.to_string())),
        }
    }
}

/// Why `Board::move_piece` refused a move. The board is untouched in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRejection {
    #[error("no piece at starting position")]
    NoPiece,
    #[error("not your turn")]
    NotYourTurn,
    #[error("illegal move")]
    IllegalMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn announcement(&self) -> String {
        match self {
            GameResult::WhiteWins => format!("{} won!", Color::White),
            GameResult::BlackWins => format!("{} won!", Color::Black),
            GameResult::Draw => "Draw!".to_string(),
        }
    }
}

/// Everything a caller needs to mirror one `move_piece` call on its own view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub moved: bool,
    pub start: Position,
    pub end: Position,
    pub captured: Option<Piece>,
    pub promoted: Option<Piece>,
    pub game_over_text: Option<String>,
    pub rejection: Option<MoveRejection>,
}

impl MoveOutcome {
    fn rejected(start: Position, end: Position, reason: MoveRejection) -> Self {
        MoveOutcome {
            moved: false,
            start,
            end,
            captured: None,
            promoted: None,
            game_over_text: None,
            rejection: Some(reason),
        }
    }
}

/// Square grid of piece handles plus the arena that owns the pieces.
///
/// Captured men and men replaced by a promotion keep their arena slot, so a
/// `PieceId` handed out once never points at a different piece later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<PieceId>>,
    pieces: Vec<Piece>,
}

impl Grid {
    fn new(size: usize) -> Self {
        Grid {
            size,
            cells: vec![None; size * size],
            pieces: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    pub fn get(&self, pos: Position) -> Option<&Piece> {
        if !self.contains(pos) {
            return None;
        }
        self.cells[self.index(pos)].and_then(|id| self.pieces.get(id.0))
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.size + pos.col
    }

    fn set(&mut self, pos: Position, id: Option<PieceId>) {
        let index = self.index(pos);
        self.cells[index] = id;
    }

    fn alloc(&mut self, color: Color, kind: PieceKind, position: Position) -> PieceId {
        let id = PieceId(self.pieces.len());
        self.pieces.push(Piece::new(id, color, kind, position));
        id
    }

    fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.0]
    }
}

/// Full game state: grid, live pieces per color, turn and stagnation bookkeeping.
///
/// `Clone` is a deep copy; pieces are addressed by `PieceId` so the clone
/// shares nothing with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    white_pieces: Vec<PieceId>,
    black_pieces: Vec<PieceId>,
    last_move_color: Color,
    no_progress_counter: u32,
}

impl Board {
    /// Create a board with the standard starting rows for `size`. White moves first.
    pub fn new(size: BoardSize) -> Self {
        let mut board = Board::empty(size);

        match size {
            BoardSize::Small => board.setup_small(),
            BoardSize::Standard => board.setup_standard(),
        }

        board
    }

    /// A board with no pieces and white to move.
    pub fn empty(size: BoardSize) -> Self {
        Board {
            grid: Grid::new(size.dimension()),
            white_pieces: Vec::new(),
            black_pieces: Vec::new(),
            last_move_color: Color::Black,
            no_progress_counter: 0,
        }
    }

    /// Two men per side on the outer rows.
    fn setup_small(&mut self) {
        for col in [0, 2] {
            self.place(Color::White, PieceKind::Man, Position::new(0, col));
        }
        for col in [1, 3] {
            self.place(Color::Black, PieceKind::Man, Position::new(3, col));
        }
    }

    /// Twelve men per side on the dark squares of the three outer rows.
    fn setup_standard(&mut self) {
        let size = self.size();
        for row in (0..3).chain(size - 3..size) {
            let color = if row < 3 { Color::White } else { Color::Black };
            for col in 0..size {
                if (row + col) % 2 == 1 {
                    self.place(color, PieceKind::Man, Position::new(row, col));
                }
            }
        }
    }

    /// Put a new piece on an empty square. Returns `None` if `pos` is off
    /// the board or occupied.
    pub fn place(&mut self, color: Color, kind: PieceKind, pos: Position) -> Option<PieceId> {
        if !self.grid.contains(pos) || self.grid.get(pos).is_some() {
            return None;
        }

        let id = self.grid.alloc(color, kind, pos);
        self.grid.set(pos, Some(id));
        self.collection_mut(color).push(id);
        Some(id)
    }

    pub fn set_last_move_color(&mut self, color: Color) {
        self.last_move_color = color;
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.grid.get(pos)
    }

    /// Live pieces of `color`, in enumeration order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.collection(color).iter().map(move |&id| self.grid.piece(id))
    }

    pub fn piece_count(&self, color: Color) -> usize {
        self.collection(color).len()
    }

    pub fn last_move_color(&self) -> Color {
        self.last_move_color
    }

    pub fn side_to_move(&self) -> Color {
        self.last_move_color.opponent()
    }

    pub fn no_progress_counter(&self) -> u32 {
        self.no_progress_counter
    }

    fn collection(&self, color: Color) -> &Vec<PieceId> {
        match color {
            Color::White => &self.white_pieces,
            Color::Black => &self.black_pieces,
        }
    }

    fn collection_mut(&mut self, color: Color) -> &mut Vec<PieceId> {
        match color {
            Color::White => &mut self.white_pieces,
            Color::Black => &mut self.black_pieces,
        }
    }

    /// Try to move the piece on `start` to `end`.
    ///
    /// A refused move is not an error: the outcome has `moved == false`, names
    /// the reason, and the board is left exactly as it was.
    pub fn move_piece(&mut self, start: Position, end: Position) -> MoveOutcome {
        let Some(piece) = self.grid.get(start).copied() else {
            return self.reject(start, end, MoveRejection::NoPiece);
        };
        if piece.color == self.last_move_color {
            return self.reject(start, end, MoveRejection::NotYourTurn);
        }
        if !piece.is_legal_move(end, &self.grid) {
            return self.reject(start, end, MoveRejection::IllegalMove);
        }

        let mut captured = None;
        if Move::new(start, end).is_jump() {
            let over = start.midpoint(end);
            if let Some(victim) = self.grid.get(over).copied() {
                self.grid.set(over, None);
                self.collection_mut(victim.color).retain(|&id| id != victim.id);
                captured = Some(victim);
            }
        }

        self.grid.set(start, None);
        self.grid.set(end, Some(piece.id));
        self.grid.piece_mut(piece.id).position = end;

        let mut promoted = None;
        if piece.kind == PieceKind::Man && end.row == piece.color.promotion_row(self.size()) {
            let king = self.grid.alloc(piece.color, PieceKind::King, end);
            self.grid.set(end, Some(king));
            let collection = self.collection_mut(piece.color);
            collection.retain(|&id| id != piece.id);
            collection.push(king);
            promoted = Some(*self.grid.piece(king));
        }

        self.last_move_color = piece.color;

        let game_over_text = self.result().map(|result| result.announcement());

        if captured.is_some() || promoted.is_some() {
            self.no_progress_counter = 0;
        } else {
            self.no_progress_counter += 1;
        }

        MoveOutcome {
            moved: true,
            start,
            end,
            captured,
            promoted,
            game_over_text,
            rejection: None,
        }
    }

    fn reject(&self, start: Position, end: Position, reason: MoveRejection) -> MoveOutcome {
        tracing::debug!(%start, %end, %reason, "move rejected");
        MoveOutcome::rejected(start, end, reason)
    }

    /// Every legal `(origin, destination)` pair for `color`.
    pub fn get_all_moves(&self, color: Color) -> Vec<Move> {
        self.pieces(color)
            .flat_map(|piece| {
                piece
                    .get_legal_moves(&self.grid)
                    .into_iter()
                    .map(move |to| Move::new(piece.position, to))
            })
            .collect()
    }

    /// Material balance from white's side: a man is worth 1, a king 2.
    pub fn evaluate_board(&self) -> i32 {
        let white: i32 = self.pieces(Color::White).map(|p| p.kind.value()).sum();
        let black: i32 = self.pieces(Color::Black).map(|p| p.kind.value()).sum();
        white - black
    }

    pub fn game_over(&self) -> bool {
        self.white_pieces.is_empty() || self.black_pieces.is_empty()
    }

    /// The side to move is stuck, or the no-progress limit has been reached.
    pub fn draw(&self) -> bool {
        self.get_all_moves(self.side_to_move()).is_empty()
            || self.no_progress_counter >= NO_PROGRESS_LIMIT
    }

    pub fn result(&self) -> Option<GameResult> {
        if self.game_over() {
            if self.white_pieces.is_empty() {
                Some(GameResult::BlackWins)
            } else {
                Some(GameResult::WhiteWins)
            }
        } else if self.draw() {
            Some(GameResult::Draw)
        } else {
            None
        }
    }

    /// Independent deep copy for speculative play.
    pub fn copy(&self) -> Board {
        self.clone()
    }

    /// Get a string representation of the board
    pub fn display_board(&self) -> String {
        let mut out = String::new();
        for row in 0..self.size() {
            let cells: Vec<String> = (0..self.size())
                .map(|col| match self.piece_at(Position::new(row, col)) {
                    Some(piece) => piece.to_string(),
                    None => "..".to_string(),
                })
                .collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(BoardSize::Standard)
    }
}
