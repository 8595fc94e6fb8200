use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::Grid;

/// Diagonal steps in enumeration order. Move generation walks them in this
/// order, which fixes the order of `Board::get_all_moves`.
const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    /// Row step of a man of this color: white advances down the rows,
    /// black advances up.
    pub fn forward(&self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Far rank where a man of this color is crowned.
    pub fn promotion_row(&self, board_size: usize) -> usize {
        match self {
            Color::White => board_size - 1,
            Color::Black => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Shift by `(dr, dc)`, or `None` if that leaves a `size`×`size` grid.
    pub fn offset(&self, dr: i32, dc: i32, size: usize) -> Option<Position> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;

        if row < 0 || row >= size as i32 || col < 0 || col >= size as i32 {
            return None;
        }

        Some(Position::new(row as usize, col as usize))
    }

    pub fn midpoint(&self, other: Position) -> Position {
        Position::new((self.row + other.row) / 2, (self.col + other.col) / 2)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Move { from, to }
    }

    pub fn is_jump(&self) -> bool {
        self.from.row.abs_diff(self.to.row) == 2 && self.from.col.abs_diff(self.to.col) == 2
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Stable handle of a piece inside a board's piece arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub usize);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Man,
    King,
}

impl PieceKind {
    /// Diagonals this kind may travel for a piece of `color`.
    fn directions(self, color: Color) -> impl Iterator<Item = (i32, i32)> {
        DIAGONALS
            .into_iter()
            .filter(move |&(dr, _)| self == PieceKind::King || dr == color.forward())
    }

    pub fn value(&self) -> i32 {
        match self {
            PieceKind::Man => 1,
            PieceKind::King => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub color: Color,
    pub position: Position,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(id: PieceId, color: Color, kind: PieceKind, position: Position) -> Self {
        Piece {
            id,
            color,
            position,
            kind,
        }
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    /// Destinations this piece may reach from its current square.
    ///
    /// When at least one jump is available only the jumps are returned:
    /// a piece that can capture must capture.
    pub fn get_legal_moves(&self, grid: &Grid) -> Vec<Position> {
        let mut captures = Vec::new();
        let mut steps = Vec::new();

        for (dr, dc) in self.kind.directions(self.color) {
            if let Some(step) = self.position.offset(dr, dc, grid.size()) {
                if grid.get(step).is_none() {
                    steps.push(step);
                }
            }

            if let Some(landing) = self.position.offset(2 * dr, 2 * dc, grid.size()) {
                let over = self.position.midpoint(landing);
                if grid.get(landing).is_none() && self.is_opponent(grid.get(over)) {
                    captures.push(landing);
                }
            }
        }

        if captures.is_empty() { steps } else { captures }
    }

    /// Checks a single destination in isolation.
    ///
    /// Unlike `get_legal_moves` this does not suppress a simple step when the
    /// same piece (or another piece of its color) has a capture available.
    pub fn is_legal_move(&self, end: Position, grid: &Grid) -> bool {
        if !grid.contains(end) || grid.get(end).is_some() {
            return false;
        }

        let dr = end.row as i32 - self.position.row as i32;
        let dc = end.col as i32 - self.position.col as i32;

        if dr.abs() != dc.abs() {
            return false;
        }

        if self.kind == PieceKind::Man && dr.signum() != self.color.forward() {
            return false;
        }

        match dr.abs() {
            1 => true,
            2 => self.is_opponent(grid.get(self.position.midpoint(end))),
            _ => false,
        }
    }

    fn is_opponent(&self, other: Option<&Piece>) -> bool {
        other.is_some_and(|p| p.color != self.color)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match (self.color, self.kind) {
            (Color::White, PieceKind::Man) => "WM",
            (Color::White, PieceKind::King) => "WK",
            (Color::Black, PieceKind::Man) => "BM",
            (Color::Black, PieceKind::King) => "BK",
        };
        f.write_str(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, BoardSize};

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn piece_at(board: &Board, at: Position) -> Piece {
        *board.piece_at(at).expect("piece placed by the test")
    }

    #[test]
    fn test_man_moves_only_forward() {
        let mut board = Board::empty(BoardSize::Standard);
        board.place(Color::White, PieceKind::Man, pos(3, 3));
        board.place(Color::Black, PieceKind::Man, pos(5, 5));

        let white = piece_at(&board, pos(3, 3));
        assert_eq!(white.get_legal_moves(board.grid()), vec![pos(4, 2), pos(4, 4)]);

        let black = piece_at(&board, pos(5, 5));
        assert_eq!(black.get_legal_moves(board.grid()), vec![pos(4, 4), pos(4, 6)]);
    }

    #[test]
    fn test_man_on_edge_has_one_step() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(0, 0));

        let man = piece_at(&board, pos(0, 0));
        assert_eq!(man.get_legal_moves(board.grid()), vec![pos(1, 1)]);
    }

    #[test]
    fn test_king_moves_in_all_directions() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::King, pos(1, 1));

        let king = piece_at(&board, pos(1, 1));
        assert_eq!(
            king.get_legal_moves(board.grid()),
            vec![pos(0, 0), pos(0, 2), pos(2, 0), pos(2, 2)]
        );
    }

    #[test]
    fn test_capture_suppresses_simple_moves() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(1, 1));
        board.place(Color::Black, PieceKind::Man, pos(2, 2));

        let man = piece_at(&board, pos(1, 1));
        assert_eq!(man.get_legal_moves(board.grid()), vec![pos(3, 3)]);
    }

    #[test]
    fn test_cannot_jump_own_piece() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(1, 1));
        board.place(Color::White, PieceKind::Man, pos(2, 2));

        let man = piece_at(&board, pos(1, 1));
        assert_eq!(man.get_legal_moves(board.grid()), vec![pos(2, 0)]);
        assert!(!man.is_legal_move(pos(3, 3), board.grid()));
    }

    #[test]
    fn test_cannot_jump_onto_occupied_square() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(1, 1));
        board.place(Color::Black, PieceKind::Man, pos(2, 2));
        board.place(Color::Black, PieceKind::Man, pos(3, 3));

        let man = piece_at(&board, pos(1, 1));
        assert_eq!(man.get_legal_moves(board.grid()), vec![pos(2, 0)]);
        assert!(!man.is_legal_move(pos(3, 3), board.grid()));
    }

    #[test]
    fn test_king_captures_backwards() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::Black, PieceKind::King, pos(0, 0));
        board.place(Color::White, PieceKind::Man, pos(1, 1));

        let king = piece_at(&board, pos(0, 0));
        assert_eq!(king.get_legal_moves(board.grid()), vec![pos(2, 2)]);
        assert!(king.is_legal_move(pos(2, 2), board.grid()));
    }

    #[test]
    fn test_man_is_legal_move_checks() {
        let mut board = Board::empty(BoardSize::Standard);
        board.place(Color::Black, PieceKind::Man, pos(5, 2));
        board.place(Color::White, PieceKind::Man, pos(4, 3));
        let man = piece_at(&board, pos(5, 2));

        assert!(man.is_legal_move(pos(4, 1), board.grid()));
        assert!(man.is_legal_move(pos(3, 4), board.grid()));
        // backwards
        assert!(!man.is_legal_move(pos(6, 1), board.grid()));
        // occupied
        assert!(!man.is_legal_move(pos(4, 3), board.grid()));
        // not diagonal
        assert!(!man.is_legal_move(pos(4, 2), board.grid()));
        // jump over empty square
        assert!(!man.is_legal_move(pos(3, 0), board.grid()));
        // too far
        assert!(!man.is_legal_move(pos(2, 5), board.grid()));
    }

    #[test]
    fn test_is_legal_move_ignores_capture_priority() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(1, 1));
        board.place(Color::Black, PieceKind::Man, pos(2, 2));

        let man = piece_at(&board, pos(1, 1));
        assert!(!man.get_legal_moves(board.grid()).contains(&pos(2, 0)));
        assert!(man.is_legal_move(pos(2, 0), board.grid()));
    }

    #[test]
    fn test_off_board_destination_is_illegal() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::King, pos(3, 3));

        let king = piece_at(&board, pos(3, 3));
        assert!(!king.is_legal_move(pos(4, 4), board.grid()));
        assert!(!king.is_legal_move(pos(10, 10), board.grid()));
    }

    #[test]
    fn test_piece_display_codes() {
        let man = Piece::new(PieceId(0), Color::White, PieceKind::Man, pos(0, 0));
        let king = Piece::new(PieceId(1), Color::Black, PieceKind::King, pos(0, 0));
        assert_eq!(man.to_string(), "WM");
        assert_eq!(king.to_string(), "BK");
    }

    #[test]
    fn test_position_offset_bounds() {
        assert_eq!(pos(0, 0).offset(-1, 1, 4), None);
        assert_eq!(pos(3, 3).offset(1, 0, 4), None);
        assert_eq!(pos(2, 1).offset(1, -1, 4), Some(pos(3, 0)));
    }
}
