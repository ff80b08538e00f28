use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{
    models::{
        assignment::AssignmentSummary,
        game::{Game, GameError, GamePhase, GameResult, VoteTarget},
        player::PlayerId,
        resolution::Elimination,
        role::Role,
        vote::VotePhase,
    },
    state::AppState,
    store::StoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum GameServiceError {
    #[error("Game not found: {0}")]
    GameNotFound(String),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("persistence failure: {0}")]
    Store(#[from] StoreError),
}

impl GameServiceError {
    /// 永続化の失敗だけは状態が変わっていないので再試行できる
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameServiceError::Store(_))
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResolutionReport {
    pub elimination: Elimination,
    pub phase: GamePhase,
    pub result: GameResult,
}

type ServiceResult<T> = Result<T, GameServiceError>;

/// ゲームIDはUUIDのみ受け付ける。それ以外はストアに渡さず「見つからない」とする。
fn check_game_id(game_id: &str) -> ServiceResult<()> {
    uuid::Uuid::parse_str(game_id)
        .map(|_| ())
        .map_err(|_| GameServiceError::GameNotFound(game_id.to_string()))
}

// ストアはファイルI/Oを伴うのでブロッキングスレッドで呼ぶ
async fn load_game(state: &AppState, game_id: &str) -> ServiceResult<Game> {
    let store = state.store.clone();
    let id = game_id.to_string();
    tokio::task::spawn_blocking(move || store.load(&id))
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))??
        .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))
}

async fn save_game(state: &AppState, game_id: &str, game: Game) -> ServiceResult<Game> {
    let store = state.store.clone();
    let id = game_id.to_string();
    let saved = tokio::task::spawn_blocking(move || store.save(&id, &game).map(|_| game))
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    saved.map_err(|e| {
        warn!("Failed to save game {}: {}", game_id, e);
        e.into()
    })
}

/// ゲームの複製を変更し、保存に成功してから反映する。
/// 失敗した場合はメモリ上もストア上も元のまま。
async fn transact<T, F>(state: &AppState, game_id: &str, f: F) -> ServiceResult<T>
where
    F: FnOnce(&mut Game) -> ServiceResult<T> + Send,
{
    check_game_id(game_id)?;
    let mut games = state.games.lock().await;
    let current = match games.get(game_id) {
        Some(game) => game.clone(),
        None => load_game(state, game_id).await?,
    };

    let mut draft = current.clone();
    let value = f(&mut draft)?;
    if draft != current {
        draft = save_game(state, game_id, draft).await?;
    }
    games.insert(game_id.to_string(), draft);
    Ok(value)
}

async fn inspect<T, F>(state: &AppState, game_id: &str, f: F) -> ServiceResult<T>
where
    F: FnOnce(&Game) -> T + Send,
{
    check_game_id(game_id)?;
    let mut games = state.games.lock().await;
    if let Some(game) = games.get(game_id) {
        return Ok(f(game));
    }
    let game = load_game(state, game_id).await?;
    let value = f(&game);
    games.insert(game_id.to_string(), game);
    Ok(value)
}

pub async fn create_game(state: &AppState) -> ServiceResult<String> {
    let game_id = uuid::Uuid::new_v4().to_string();

    let mut games = state.games.lock().await;
    let game = save_game(state, &game_id, Game::new(game_id.clone())).await?;
    games.insert(game_id.clone(), game);
    info!("Created game {}", game_id);
    Ok(game_id)
}

pub async fn list_games(state: &AppState) -> ServiceResult<Vec<String>> {
    Ok(state.store.list_games()?)
}

/// 参加登録。新規参加なら`true`、既に参加済みなら表示名だけ更新して`false`。
pub async fn join_game(
    state: &AppState,
    game_id: &str,
    player_id: PlayerId,
    name: &str,
) -> ServiceResult<bool> {
    let joined = transact(state, game_id, |game| Ok(game.register(player_id, name))).await?;
    if joined {
        info!("Player {} ({}) joined game {}", player_id, name, game_id);
    } else {
        debug!("Player {} is already in game {}", player_id, game_id);
    }
    Ok(joined)
}

pub async fn player_exists(state: &AppState, game_id: &str, player_id: PlayerId) -> ServiceResult<bool> {
    inspect(state, game_id, |game| game.players.exists(player_id)).await
}

pub async fn player_count(state: &AppState, game_id: &str) -> ServiceResult<usize> {
    inspect(state, game_id, |game| game.players.count()).await
}

pub async fn alive_players(state: &AppState, game_id: &str) -> ServiceResult<Vec<String>> {
    inspect(state, game_id, |game| game.players.list_alive()).await
}

pub async fn players_by_role(state: &AppState, game_id: &str, role: Role) -> ServiceResult<Vec<String>> {
    inspect(state, game_id, |game| game.players.list_by_role(role)).await
}

pub async fn roles(state: &AppState, game_id: &str) -> ServiceResult<HashMap<PlayerId, Role>> {
    inspect(state, game_id, |game| game.roles()).await
}

pub async fn get_game_state(state: &AppState, game_id: &str) -> ServiceResult<Game> {
    inspect(state, game_id, |game| game.clone()).await
}

pub async fn start_game(state: &AppState, game_id: &str) -> ServiceResult<AssignmentSummary> {
    let rules = state.rules.clone();
    let (summary, roles) = transact(state, game_id, |game| {
        let summary = game.start(&rules, &mut rand::thread_rng())?;
        Ok((summary, game.roles()))
    })
    .await?;

    info!(
        "Game {} started: {} players, {} mafia, {} citizens",
        game_id, summary.players, summary.mafia, summary.citizens
    );
    if rules.show_player_roles {
        debug!("Game {} roles: {:?}", game_id, roles);
    }
    Ok(summary)
}

pub async fn advance_phase(state: &AppState, game_id: &str) -> ServiceResult<GamePhase> {
    let (from, to, round) = transact(state, game_id, |game| {
        let from = game.phase;
        let to = game.open_next_phase()?;
        Ok((from, to, game.round))
    })
    .await?;
    info!("Game {} round {}: {:?} -> {:?}", game_id, round, from, to);
    Ok(to)
}

/// 投票。不正な投票は`Ok(false)`で、エラーにはしない。
pub async fn cast_vote(
    state: &AppState,
    game_id: &str,
    phase: VotePhase,
    target: VoteTarget,
    voter_id: PlayerId,
) -> ServiceResult<bool> {
    let rules = state.rules.clone();
    let accepted = transact(state, game_id, |game| {
        Ok(game.submit_vote(phase, &target, voter_id, &rules))
    })
    .await?;

    if accepted {
        info!("Game {}: player {} cast a {} vote", game_id, voter_id, phase);
        debug!("Game {}: player {} voted for {:?}", game_id, voter_id, target);
    } else {
        debug!(
            "Game {}: rejected {} vote from {} for {:?}",
            game_id, phase, voter_id, target
        );
    }
    Ok(accepted)
}

pub async fn resolve_night(state: &AppState, game_id: &str) -> ServiceResult<ResolutionReport> {
    let report = transact(state, game_id, |game| {
        let elimination = game.resolve_night()?;
        Ok(ResolutionReport {
            elimination,
            phase: game.phase,
            result: game.result,
        })
    })
    .await?;
    log_resolution(game_id, VotePhase::Night, &report);
    Ok(report)
}

pub async fn resolve_day(state: &AppState, game_id: &str) -> ServiceResult<ResolutionReport> {
    let report = transact(state, game_id, |game| {
        let elimination = game.resolve_day()?;
        Ok(ResolutionReport {
            elimination,
            phase: game.phase,
            result: game.result,
        })
    })
    .await?;
    log_resolution(game_id, VotePhase::Day, &report);
    Ok(report)
}

pub async fn check_winner(state: &AppState, game_id: &str) -> ServiceResult<GameResult> {
    inspect(state, game_id, |game| game.result).await
}

fn log_resolution(game_id: &str, phase: VotePhase, report: &ResolutionReport) {
    info!(
        "Game {} {} resolved: {} eliminated",
        game_id,
        phase,
        report.elimination.label()
    );
    if report.result != GameResult::InProgress {
        info!("Game {} is over: {:?}", game_id, report.result);
    }
}
