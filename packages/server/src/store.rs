//! ゲーム状態の永続化

use thiserror::Error;

use crate::models::game::Game;

mod file;
mod memory;

pub use file::FileGameStore;
pub use memory::InMemoryGameStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// ゲームIDごとにゲーム全体を1件として保存する。
/// 1回の`save`が1トランザクションで、途中の状態は見えない。
pub trait GameStore: Send + Sync {
    fn save(&self, game_id: &str, game: &Game) -> Result<()>;

    fn load(&self, game_id: &str) -> Result<Option<Game>>;

    fn exists(&self, game_id: &str) -> Result<bool> {
        Ok(self.load(game_id)?.is_some())
    }

    fn delete(&self, game_id: &str) -> Result<()>;

    fn list_games(&self) -> Result<Vec<String>>;
}
