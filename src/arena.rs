use crate::board::{Board, BoardSize, GameResult};
use crate::bot::Bot;
use crate::piece::{Color, Move};
use std::time::{Duration, Instant};

pub struct MatchConfig {
    pub board_size: BoardSize,
    pub time_per_move: Duration,
    pub max_moves: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            board_size: BoardSize::Standard,
            time_per_move: Duration::from_secs(5),
            max_moves: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    WhiteWins { winner_name: String, moves: usize },
    BlackWins { winner_name: String, moves: usize },
    Draw { moves: usize },
    Timeout { violator: String, winner: String },
    IllegalMove { violator: String, winner: String },
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::WhiteWins { winner_name, .. } => Some(winner_name),
            MatchResult::BlackWins { winner_name, .. } => Some(winner_name),
            MatchResult::Timeout { winner, .. } => Some(winner),
            MatchResult::IllegalMove { winner, .. } => Some(winner),
            MatchResult::Draw { .. } => None,
        }
    }
}

/// One game between two bots. The runner owns the board and the clock;
/// the bots only ever see a shared reference to the board.
pub struct Match {
    config: MatchConfig,
    board: Board,
    white_bot: Box<dyn Bot>,
    black_bot: Box<dyn Bot>,
    moves: usize,
}

impl Match {
    pub fn new(white_bot: Box<dyn Bot>, black_bot: Box<dyn Bot>, config: MatchConfig) -> Self {
        Match {
            board: Board::new(config.board_size),
            config,
            white_bot,
            black_bot,
            moves: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn play(&mut self) -> MatchResult {
        self.white_bot.game_start(Color::White);
        self.black_bot.game_start(Color::Black);

        tracing::info!(
            white = self.white_bot.name(),
            black = self.black_bot.name(),
            board = %self.config.board_size,
            "match starting"
        );

        while self.board.result().is_none() && self.moves < self.config.max_moves {
            if let Some(result) = self.play_move(self.board.side_to_move()) {
                self.white_bot.game_end();
                self.black_bot.game_end();
                return result;
            }
        }

        self.white_bot.game_end();
        self.black_bot.game_end();

        let moves = self.moves;
        match self.board.result() {
            Some(GameResult::WhiteWins) => {
                tracing::info!(winner = self.white_bot.name(), moves, "white wins");
                MatchResult::WhiteWins {
                    winner_name: self.white_bot.name().to_string(),
                    moves,
                }
            }
            Some(GameResult::BlackWins) => {
                tracing::info!(winner = self.black_bot.name(), moves, "black wins");
                MatchResult::BlackWins {
                    winner_name: self.black_bot.name().to_string(),
                    moves,
                }
            }
            Some(GameResult::Draw) => {
                tracing::info!(moves, "game drawn");
                MatchResult::Draw { moves }
            }
            None => {
                tracing::info!(max_moves = self.config.max_moves, "move cap reached, draw");
                MatchResult::Draw { moves }
            }
        }
    }

    fn bot_names(&self, color: Color) -> (String, String) {
        match color {
            Color::White => (
                self.white_bot.name().to_string(),
                self.black_bot.name().to_string(),
            ),
            Color::Black => (
                self.black_bot.name().to_string(),
                self.white_bot.name().to_string(),
            ),
        }
    }

    fn play_move(&mut self, color: Color) -> Option<MatchResult> {
        let bot = match color {
            Color::White => &mut self.white_bot,
            Color::Black => &mut self.black_bot,
        };

        let start = Instant::now();
        let mv = bot.get_move(&self.board, self.config.time_per_move);
        let elapsed = start.elapsed();

        self.handle_move_result(mv, elapsed, color)
    }

    fn handle_move_result(
        &mut self,
        mv: Option<Move>,
        elapsed: Duration,
        color: Color,
    ) -> Option<MatchResult> {
        let (bot_name, opponent_name) = self.bot_names(color);

        if elapsed > self.config.time_per_move {
            tracing::info!(
                bot = %bot_name,
                ?elapsed,
                limit = ?self.config.time_per_move,
                "bot exceeded its time limit"
            );
            return Some(MatchResult::Timeout {
                violator: bot_name,
                winner: opponent_name,
            });
        }

        let Some(mv) = mv else {
            // result() was None, so the side to move still had moves
            tracing::info!(bot = %bot_name, "bot returned no move");
            return Some(MatchResult::Draw { moves: self.moves });
        };

        let outcome = self.board.move_piece(mv.from, mv.to);
        if !outcome.moved {
            tracing::info!(
                bot = %bot_name,
                %mv,
                reason = ?outcome.rejection,
                "bot played an illegal move"
            );
            return Some(MatchResult::IllegalMove {
                violator: bot_name,
                winner: opponent_name,
            });
        }

        self.moves += 1;
        self.white_bot.notify_move(mv);
        self.black_bot.notify_move(mv);

        tracing::debug!(
            bot = %bot_name,
            %mv,
            ?elapsed,
            captured = outcome.captured.is_some(),
            promoted = outcome.promoted.is_some(),
            "move played\n{}",
            self.board.display_board()
        );

        None
    }
}
