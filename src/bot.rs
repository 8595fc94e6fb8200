use crate::board::Board;
use crate::piece::{Color, Move};
use crate::search::search;
use std::time::Duration;

/// Trait that all bots must implement
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Pick a move for the side to move on `board`.
    ///
    /// `time_limit` is what the match runner will enforce; a bot is free to
    /// ignore it and search to a fixed depth.
    fn get_move(&mut self, board: &Board, time_limit: Duration) -> Option<Move>;

    /// Notified when the game starts
    fn game_start(&mut self, _color: Color) {}

    /// Notified when a move is made (by either player)
    fn notify_move(&mut self, _mv: Move) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

/// Alpha-beta search to a fixed depth, playing whichever color is to move.
pub struct MinimaxBot {
    name: String,
    depth: u32,
}

impl MinimaxBot {
    pub fn new(name: String, depth: u32) -> Self {
        MinimaxBot { name, depth }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Bot for MinimaxBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, board: &Board, _time_limit: Duration) -> Option<Move> {
        let report = search(board, self.depth, board.side_to_move() == Color::White);
        tracing::debug!(
            bot = %self.name,
            score = report.score,
            nodes = report.nodes,
            "minimax bot chose a move"
        );
        report.best_move
    }
}

/// Looks one move ahead and keeps the move with the best material balance.
pub struct GreedyBot {
    name: String,
}

impl GreedyBot {
    pub fn new(name: String) -> Self {
        GreedyBot { name }
    }

    fn evaluate_move(&self, board: &Board, mv: Move) -> i32 {
        let mover = board.side_to_move();
        let mut after = board.copy();
        after.move_piece(mv.from, mv.to);

        let score = after.evaluate_board();
        match mover {
            Color::White => score,
            Color::Black => -score,
        }
    }
}

impl Bot for GreedyBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, board: &Board, _time_limit: Duration) -> Option<Move> {
        // Find the move with the best evaluation
        board
            .get_all_moves(board.side_to_move())
            .into_iter()
            .max_by_key(|&mv| self.evaluate_move(board, mv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSize;
    use crate::piece::{PieceKind, Position};

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_minimax_bot_plays_black() {
        let mut board = Board::new(BoardSize::Small);
        assert!(board.move_piece(pos(0, 0), pos(1, 1)).moved);

        let mut bot = MinimaxBot::new("Minimax".to_string(), 4);
        let mv = bot
            .get_move(&board, Duration::from_secs(1))
            .expect("black has moves");

        assert!(board.get_all_moves(Color::Black).contains(&mv));
        assert!(board.move_piece(mv.from, mv.to).moved);
    }

    #[test]
    fn test_greedy_bot_takes_material() {
        let mut board = Board::empty(BoardSize::Standard);
        board.place(Color::Black, PieceKind::Man, pos(4, 3));
        board.place(Color::Black, PieceKind::Man, pos(6, 1));
        board.place(Color::White, PieceKind::Man, pos(3, 2));
        board.set_last_move_color(Color::White);

        let mut bot = GreedyBot::new("Greedy".to_string());
        let mv = bot.get_move(&board, Duration::from_secs(1));
        assert_eq!(mv, Some(Move::new(pos(4, 3), pos(2, 1))));
    }

    #[test]
    fn test_bots_return_none_without_moves() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(3, 0));
        board.place(Color::Black, PieceKind::King, pos(0, 3));

        let mut greedy = GreedyBot::new("Greedy".to_string());
        let mut minimax = MinimaxBot::new("Minimax".to_string(), 3);
        assert_eq!(greedy.get_move(&board, Duration::from_secs(1)), None);
        assert_eq!(minimax.get_move(&board, Duration::from_secs(1)), None);
    }
}
