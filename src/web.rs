use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::board::{Board, BoardSize, BoardSizeError, MoveOutcome, MoveRejection};
use crate::config::AppConfig;
use crate::piece::{Color, Move, PieceId, Position};
use crate::search::get_ai_move;

/// The browser player always has black; the engine plays white and opens.
const HUMAN: Color = Color::Black;
const AI: Color = Color::White;

#[derive(Clone)]
pub struct AppState {
    game: Arc<Mutex<WebGame>>,
    default_size: BoardSize,
    ai_depth: u32,
}

struct WebGame {
    board: Board,
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("game is over")]
    GameOver,
    #[error("move rejected: {0}")]
    Rejected(MoveRejection),
    #[error(transparent)]
    BoardSize(#[from] BoardSizeError),
    #[error("search task failed: {0}")]
    Search(#[from] tokio::task::JoinError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match self {
            WebError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NewGameRequest {
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from_row: usize,
    pub from_col: usize,
    pub to_row: usize,
    pub to_col: usize,
}

/// What a renderer needs per piece: identity for sprite lookup, square, looks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub id: PieceId,
    pub color: Color,
    pub row: usize,
    pub col: usize,
    pub is_king: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub size: usize,
    pub pieces: Vec<PieceView>,
    pub side_to_move: Color,
    pub legal_moves: Vec<Move>,
    pub game_over_text: Option<String>,
    pub player_move: Option<MoveOutcome>,
    pub ai_move: Option<MoveOutcome>,
}

impl AppState {
    /// Fresh game of `size` with the engine's opening move already played.
    pub fn new(size: BoardSize, ai_depth: u32) -> Self {
        let mut board = Board::new(size);
        if let Some(mv) = get_ai_move(&board, ai_depth) {
            board.move_piece(mv.from, mv.to);
        }

        AppState {
            game: Arc::new(Mutex::new(WebGame { board })),
            default_size: size,
            ai_depth,
        }
    }
}

fn game_response(
    board: &Board,
    player_move: Option<MoveOutcome>,
    ai_move: Option<MoveOutcome>,
) -> GameResponse {
    let pieces = board
        .pieces(Color::White)
        .chain(board.pieces(Color::Black))
        .map(|piece| PieceView {
            id: piece.id,
            color: piece.color,
            row: piece.position.row,
            col: piece.position.col,
            is_king: piece.is_king(),
        })
        .collect();

    let result = board.result();
    let legal_moves = if result.is_none() && board.side_to_move() == HUMAN {
        board.get_all_moves(HUMAN)
    } else {
        Vec::new()
    };

    GameResponse {
        size: board.size(),
        pieces,
        side_to_move: board.side_to_move(),
        legal_moves,
        game_over_text: result.map(|r| r.announcement()),
        player_move,
        ai_move,
    }
}

/// Let the engine answer if it is white's turn and the game is still on.
async fn ai_reply(board: &mut Board, depth: u32) -> Result<Option<MoveOutcome>, WebError> {
    if board.result().is_some() || board.side_to_move() != AI {
        return Ok(None);
    }

    let snapshot = board.copy();
    let choice = tokio::task::spawn_blocking(move || get_ai_move(&snapshot, depth)).await?;

    Ok(choice.map(|mv| {
        let outcome = board.move_piece(mv.from, mv.to);
        tracing::info!(%mv, game_over = ?outcome.game_over_text, "engine moved");
        outcome
    }))
}

#[axum::debug_handler]
async fn new_game(
    State(app_state): State<AppState>,
    Json(req): Json<NewGameRequest>,
) -> Result<Json<GameResponse>, WebError> {
    let size = match req.size {
        Some(size) => size.parse()?,
        None => app_state.default_size,
    };

    let mut game = app_state.game.lock().await;
    game.board = Board::new(size);
    tracing::info!(%size, "new game");

    let ai_move = ai_reply(&mut game.board, app_state.ai_depth).await?;
    Ok(Json(game_response(&game.board, None, ai_move)))
}

#[axum::debug_handler]
async fn make_move(
    State(app_state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameResponse>, WebError> {
    let mut game = app_state.game.lock().await;

    if game.board.result().is_some() {
        return Err(WebError::GameOver);
    }
    if game.board.side_to_move() != HUMAN {
        return Err(WebError::Rejected(MoveRejection::NotYourTurn));
    }

    let from = Position::new(req.from_row, req.from_col);
    let to = Position::new(req.to_row, req.to_col);

    // the board only enforces turn order, so keep the player off white's pieces
    if game.board.piece_at(from).is_some_and(|p| p.color != HUMAN) {
        return Err(WebError::Rejected(MoveRejection::NotYourTurn));
    }

    let player_move = game.board.move_piece(from, to);
    if let Some(reason) = player_move.rejection {
        return Err(WebError::Rejected(reason));
    }
    tracing::info!(%from, %to, "player moved");

    let ai_move = ai_reply(&mut game.board, app_state.ai_depth).await?;
    Ok(Json(game_response(&game.board, Some(player_move), ai_move)))
}

async fn get_game_state(State(app_state): State<AppState>) -> Json<GameResponse> {
    let game = app_state.game.lock().await;
    Json(game_response(&game.board, None, None))
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/new-game", post(new_game))
        .route("/api/move", post(make_move))
        .route("/api/game-state", get(get_game_state))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run_server(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::new(config.board_size, config.ai_depth));

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    tracing::info!(
        addr = %config.bind_addr,
        board = %config.board_size,
        depth = config.ai_depth,
        "web server running"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
