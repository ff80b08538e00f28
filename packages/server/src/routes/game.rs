use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::{
    models::{
        game::{GameError, GameResult, VoteTarget},
        player::PlayerId,
        role::Role,
        vote::VotePhase,
    },
    services::game_service::{self, GameServiceError},
};

pub const ACTION_NOT_AVAILABLE: &str = "action not available";

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    pub player_id: PlayerId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub joined: bool,
    pub already_registered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteAction {
    pub phase: VotePhase,
    pub voter_id: PlayerId,
    #[serde(default)]
    pub target_id: Option<PlayerId>,
    #[serde(default)]
    pub target_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub retryable: bool,
}

impl IntoResponse for GameServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameServiceError::GameNotFound(_) => StatusCode::NOT_FOUND,
            GameServiceError::Game(GameError::NoPlayers) => StatusCode::BAD_REQUEST,
            GameServiceError::Game(_) => StatusCode::CONFLICT,
            GameServiceError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            retryable: self.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        // curl -X POST http://localhost:8080/api/game/create
        .route("/create", post(create_game))
        .route("/games", get(list_games))
        .nest(
            "/:gameid",
            Router::new()
                // 参加受付
                .route("/join", post(join_game))
                .route("/players/count", get(player_count))
                .route("/players/alive", get(alive_players))
                .route("/players/role/:role", get(players_by_role))
                .route("/players/:playerid/exists", get(player_exists))
                // ゲームの基本操作
                .route("/start", post(start_game))
                .route("/state", get(get_game_state))
                .route("/roles", get(reveal_roles))
                // ゲームアクション
                .nest(
                    "/actions",
                    Router::new().route("/vote", post(cast_vote_handler)),
                )
                // ゲーム進行の管理
                .route("/phase/next", post(advance_phase_handler))
                .route("/resolve/night", post(resolve_night_handler))
                .route("/resolve/day", post(resolve_day_handler))
                .route("/check-winner", get(check_winner_handler)),
        )
        .with_state(state)
}

async fn create_game(State(state): State<AppState>) -> Result<impl IntoResponse, GameServiceError> {
    let game_id = game_service::create_game(&state).await?;
    Ok((StatusCode::OK, Json(game_id)))
}

async fn list_games(State(state): State<AppState>) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::list_games(&state).await?))
}

async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<impl IntoResponse, GameServiceError> {
    let joined = game_service::join_game(&state, &game_id, req.player_id, &req.name).await?;
    Ok(Json(JoinResponse {
        joined,
        already_registered: !joined,
    }))
}

async fn player_exists(
    State(state): State<AppState>,
    Path((game_id, player_id)): Path<(String, PlayerId)>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(
        game_service::player_exists(&state, &game_id, player_id).await?,
    ))
}

async fn player_count(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::player_count(&state, &game_id).await?))
}

async fn alive_players(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::alive_players(&state, &game_id).await?))
}

async fn players_by_role(
    State(state): State<AppState>,
    Path((game_id, role)): Path<(String, String)>,
) -> Response {
    let role = match role.parse::<Role>() {
        Ok(role) => role,
        Err(message) => return (StatusCode::BAD_REQUEST, Json(message)).into_response(),
    };
    match game_service::players_by_role(&state, &game_id, role).await {
        Ok(names) => Json(names).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn reveal_roles(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::roles(&state, &game_id).await?))
}

async fn get_game_state(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::get_game_state(&state, &game_id).await?))
}

async fn start_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    let summary = game_service::start_game(&state, &game_id).await?;
    Ok(Json(serde_json::json!({
        "players": summary.players,
        "mafia": summary.mafia,
        "citizens": summary.citizens,
    })))
}

async fn cast_vote_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(vote_action): Json<VoteAction>,
) -> Result<Response, GameServiceError> {
    let target = match (vote_action.target_id, vote_action.target_name) {
        (Some(id), _) => VoteTarget::Id(id),
        (None, Some(name)) => VoteTarget::Name(name),
        (None, None) => {
            return Ok((StatusCode::BAD_REQUEST, Json(ACTION_NOT_AVAILABLE)).into_response())
        }
    };

    let accepted = game_service::cast_vote(
        &state,
        &game_id,
        vote_action.phase,
        target,
        vote_action.voter_id,
    )
    .await?;

    if accepted {
        Ok((StatusCode::OK, Json("Vote cast successfully")).into_response())
    } else {
        Ok((StatusCode::BAD_REQUEST, Json(ACTION_NOT_AVAILABLE)).into_response())
    }
}

async fn advance_phase_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::advance_phase(&state, &game_id).await?))
}

async fn resolve_night_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::resolve_night(&state, &game_id).await?))
}

async fn resolve_day_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    Ok(Json(game_service::resolve_day(&state, &game_id).await?))
}

async fn check_winner_handler(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, GameServiceError> {
    let message = match game_service::check_winner(&state, &game_id).await? {
        GameResult::InProgress => "Game in progress",
        GameResult::CitizenWin => "Citizens win",
        GameResult::MafiaWin => "Mafia wins",
    };
    Ok(Json(message))
}
