use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tictactoe::tournament::{round_robin, TournamentReport};
use tictactoe::{
    best_move, can_form_more_lines, check_winner, expanded_game_over, CompletedLine, GameError,
    Grid, MoveRequest, MoveResponse, Outcome, Playstyle, ScoreTracker, Scores, SessionHistory,
    Side, CLASSIC_SIZE, EXPANDED_SIZE,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::ServerConfig;

const DEFAULT_ROUNDS: u32 = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = ServerConfig::from_env()?;
    let app = app_router(Arc::new(AppState::new(config.seed)));

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Session history and the process-wide generator. Always locked in that
/// order.
struct AppState {
    history: Mutex<SessionHistory>,
    rng: Mutex<StdRng>,
}

impl AppState {
    fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            history: Mutex::new(SessionHistory::new()),
            rng: Mutex::new(rng),
        }
    }
}

type SharedState = Arc<AppState>;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ApiError> {
    mutex
        .lock()
        .map_err(|_| ApiError(anyhow!("server state is poisoned")))
}

fn app_router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/move", get(handle_move))
        .route("/winner", get(handle_winner))
        .route("/score", get(handle_score))
        .route("/playstyle", post(handle_playstyle))
        .route("/result", post(handle_result))
        .route("/tournament", get(handle_tournament))
        .with_state(state);
    Router::new()
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}

const NO_STORE: [(header::HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

#[derive(Debug, Deserialize)]
struct MoveQuery {
    board: String,
    ai: Side,
    playstyle: Playstyle,
}

async fn handle_move(
    State(state): State<SharedState>,
    Query(query): Query<MoveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let req = MoveRequest {
        board: query.board,
        ai: query.ai,
        playstyle: query.playstyle,
    };
    let mv: MoveResponse = {
        let mut rng = lock(&state.rng)?;
        best_move(req, &mut *rng)?
    };
    Ok((NO_STORE, Json(mv)))
}

#[derive(Debug, Deserialize)]
struct BoardQuery {
    board: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WinnerResponse {
    winner: Option<Side>,
}

fn parse_sized(board: &str, size: usize) -> Result<Grid, GameError> {
    let grid: Grid = board.parse()?;
    if grid.size() != size {
        return Err(GameError::SizeMismatch {
            expected: size,
            actual: grid.size(),
        });
    }
    Ok(grid)
}

async fn handle_winner(Query(query): Query<BoardQuery>) -> Result<impl IntoResponse, ApiError> {
    let grid = parse_sized(&query.board, CLASSIC_SIZE)?;
    let winner = check_winner(&grid);
    Ok((NO_STORE, Json(WinnerResponse { winner })))
}

#[derive(Debug, Deserialize)]
struct ScoreQuery {
    board: String,
    /// Snapshot before the latest move; a 3x3 board is expanded first.
    previous: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoreResponse {
    scores: Scores,
    new_lines: Vec<CompletedLine>,
    can_form_more_lines: bool,
    game_over: bool,
    outcome: Option<Outcome>,
}

async fn handle_score(Query(query): Query<ScoreQuery>) -> Result<impl IntoResponse, ApiError> {
    let grid = parse_sized(&query.board, EXPANDED_SIZE)?;
    let mut tracker = match query.previous {
        Some(previous) => {
            let previous: Grid = previous.parse()?;
            let previous = if previous.size() == CLASSIC_SIZE {
                previous.expand()?
            } else {
                previous
            };
            ScoreTracker::seeded(&previous)
        }
        None => ScoreTracker::new(),
    };
    let report = tracker.update(&grid);
    let game_over = expanded_game_over(&grid);
    let body = ScoreResponse {
        scores: report.scores,
        new_lines: report.new_lines,
        can_form_more_lines: can_form_more_lines(&grid),
        game_over,
        outcome: game_over.then(|| Outcome::from_scores(report.scores)),
    };
    Ok((NO_STORE, Json(body)))
}

#[derive(Debug, Serialize, Deserialize)]
struct PlaystyleRequest {
    ai_moves_first: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct PlaystyleResponse {
    playstyle: Playstyle,
}

async fn handle_playstyle(
    State(state): State<SharedState>,
    Json(req): Json<PlaystyleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let playstyle = {
        let history = lock(&state.history)?;
        let mut rng = lock(&state.rng)?;
        history.select_playstyle(req.ai_moves_first, &mut *rng)
    };
    info!(%playstyle, ai_moves_first = req.ai_moves_first, "playstyle selected");
    Ok((NO_STORE, Json(PlaystyleResponse { playstyle })))
}

#[derive(Debug, Serialize, Deserialize)]
struct ResultRequest {
    ai_won: bool,
}

async fn handle_result(
    State(state): State<SharedState>,
    Json(req): Json<ResultRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let history = {
        let mut history = lock(&state.history)?;
        history.report_game_result(req.ai_won);
        *history
    };
    Ok((NO_STORE, Json(history)))
}

#[derive(Debug, Deserialize)]
struct TournamentQuery {
    rounds: Option<u32>,
}

async fn handle_tournament(
    State(state): State<SharedState>,
    Query(query): Query<TournamentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rounds = query.rounds.unwrap_or(DEFAULT_ROUNDS);
    let mut rng = {
        let mut shared = lock(&state.rng)?;
        StdRng::from_rng(&mut *shared)?
    };
    let report: TournamentReport =
        tokio::task::spawn_blocking(move || round_robin(rounds, &mut rng)).await??;
    Ok((NO_STORE, Json(report)))
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = format!("{}", self.0);
        (status, body).into_response()
    }
}
