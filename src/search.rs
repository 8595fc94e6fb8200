use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::{Color, Move};

/// Score and move picked by a search, plus how many nodes it visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub score: i32,
    pub best_move: Option<Move>,
    pub nodes: u64,
}

/// Best move for white at a fixed depth, or `None` if white cannot move.
pub fn get_ai_move(board: &Board, depth: u32) -> Option<Move> {
    search(board, depth, true).best_move
}

/// Alpha-beta search from the root with open bounds.
///
/// `maximizing` picks the side: white maximizes `Board::evaluate_board`,
/// black minimizes it.
pub fn search(board: &Board, depth: u32, maximizing: bool) -> SearchReport {
    let mut nodes = 0;
    let (score, best_move) = alpha_beta(board, depth, i32::MIN, i32::MAX, maximizing, &mut nodes);

    tracing::debug!(
        depth,
        maximizing,
        score,
        nodes,
        best_move = ?best_move,
        "search finished"
    );

    SearchReport {
        score,
        best_move,
        nodes,
    }
}

/// Depth-bounded minimax with alpha-beta pruning.
///
/// Never touches `board`: every candidate is played on its own copy.
pub fn minimax(
    board: &Board,
    depth: u32,
    alpha: i32,
    beta: i32,
    maximizing: bool,
) -> (i32, Option<Move>) {
    let mut nodes = 0;
    alpha_beta(board, depth, alpha, beta, maximizing, &mut nodes)
}

fn side(maximizing: bool) -> Color {
    if maximizing { Color::White } else { Color::Black }
}

fn alpha_beta(
    board: &Board,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    nodes: &mut u64,
) -> (i32, Option<Move>) {
    *nodes += 1;

    if depth == 0 || board.game_over() {
        return (board.evaluate_board(), None);
    }

    let moves = board.get_all_moves(side(maximizing));
    if moves.is_empty() {
        return (0, None);
    }

    let mut best_move = None;
    let mut best_score = if maximizing { i32::MIN } else { i32::MAX };

    for mv in moves {
        let mut child = board.copy();
        child.move_piece(mv.from, mv.to);
        let (score, _) = alpha_beta(&child, depth - 1, alpha, beta, !maximizing, nodes);

        if maximizing {
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
        } else {
            if score < best_score {
                best_score = score;
                best_move = Some(mv);
            }
            beta = beta.min(score);
        }

        if beta <= alpha {
            break;
        }
    }

    (best_score, best_move)
}

/// Plain minimax over the full tree. Same answer as `search`, more nodes.
pub fn exhaustive_minimax(board: &Board, depth: u32, maximizing: bool) -> SearchReport {
    let mut nodes = 0;
    let (score, best_move) = full_width(board, depth, maximizing, &mut nodes);
    SearchReport {
        score,
        best_move,
        nodes,
    }
}

fn full_width(board: &Board, depth: u32, maximizing: bool, nodes: &mut u64) -> (i32, Option<Move>) {
    *nodes += 1;

    if depth == 0 || board.game_over() {
        return (board.evaluate_board(), None);
    }

    let moves = board.get_all_moves(side(maximizing));
    if moves.is_empty() {
        return (0, None);
    }

    let mut best_move = None;
    let mut best_score = if maximizing { i32::MIN } else { i32::MAX };

    for mv in moves {
        let mut child = board.copy();
        child.move_piece(mv.from, mv.to);
        let (score, _) = full_width(&child, depth - 1, !maximizing, nodes);

        let better = if maximizing {
            score > best_score
        } else {
            score < best_score
        };
        if better {
            best_score = score;
            best_move = Some(mv);
        }
    }

    (best_score, best_move)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSize;
    use crate::piece::{PieceKind, Position};

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    /// White can take at (2,2) or make a quiet move that hands black a capture.
    fn capture_puzzle() -> Board {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(1, 1));
        board.place(Color::White, PieceKind::Man, pos(0, 2));
        board.place(Color::Black, PieceKind::Man, pos(2, 2));
        board.place(Color::Black, PieceKind::Man, pos(3, 1));
        board
    }

    #[test]
    fn test_ai_takes_forced_capture() {
        let board = capture_puzzle();
        let capture = Move::new(pos(1, 1), pos(3, 3));

        for depth in 2..=5 {
            assert_eq!(get_ai_move(&board, depth), Some(capture), "depth {depth}");
        }
    }

    #[test]
    fn test_capture_is_scored_as_material_gain() {
        let board = capture_puzzle();
        let (score, best) = minimax(&board, 2, i32::MIN, i32::MAX, true);

        assert_eq!(best, Some(Move::new(pos(1, 1), pos(3, 3))));
        // man + new king against one black man
        assert_eq!(score, 1 + 2 - 1);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let board = Board::new(BoardSize::Small);
        let before = board.copy();

        get_ai_move(&board, 6);
        assert_eq!(board, before);
    }

    #[test]
    fn test_depth_zero_returns_evaluation_only() {
        let board = capture_puzzle();
        assert_eq!(minimax(&board, 0, i32::MIN, i32::MAX, true), (0, None));
    }

    #[test]
    fn test_no_move_when_game_over() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(0, 0));

        assert_eq!(minimax(&board, 3, i32::MIN, i32::MAX, true), (1, None));
        assert_eq!(get_ai_move(&board, 3), None);
    }

    #[test]
    fn test_stuck_side_scores_neutral() {
        let mut board = Board::empty(BoardSize::Small);
        // a white man parked on the last row has no forward squares
        board.place(Color::White, PieceKind::Man, pos(3, 0));
        board.place(Color::Black, PieceKind::King, pos(0, 3));
        board.place(Color::Black, PieceKind::King, pos(0, 1));

        assert_eq!(minimax(&board, 4, i32::MIN, i32::MAX, true), (0, None));
        assert_eq!(get_ai_move(&board, 4), None);
    }

    #[test]
    fn test_black_search_minimizes() {
        let mut board = Board::empty(BoardSize::Small);
        board.place(Color::White, PieceKind::Man, pos(1, 1));
        board.place(Color::White, PieceKind::Man, pos(0, 2));
        board.place(Color::Black, PieceKind::Man, pos(2, 2));
        board.place(Color::Black, PieceKind::Man, pos(3, 1));
        board.set_last_move_color(Color::White);

        let report = search(&board, 2, false);
        assert_eq!(report.best_move, Some(Move::new(pos(2, 2), pos(0, 0))));
        assert_eq!(report.score, 1 - (2 + 1));
    }

    #[test]
    fn test_pruning_matches_exhaustive_search() {
        let positions = [
            (Board::new(BoardSize::Small), 1..=7),
            (capture_puzzle(), 1..=6),
            (Board::new(BoardSize::Standard), 1..=4),
        ];

        for (board, depths) in positions {
            for depth in depths {
                let pruned = search(&board, depth, true);
                let full = exhaustive_minimax(&board, depth, true);

                assert_eq!(pruned.score, full.score, "score at depth {depth}");
                assert_eq!(pruned.best_move, full.best_move, "move at depth {depth}");
                assert!(pruned.nodes <= full.nodes);
            }
        }
    }

    #[test]
    fn test_pruning_visits_fewer_nodes_on_full_board() {
        let board = Board::new(BoardSize::Standard);
        let pruned = search(&board, 4, true);
        let full = exhaustive_minimax(&board, 4, true);

        assert!(pruned.nodes < full.nodes);
    }
}
