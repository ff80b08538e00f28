use std::collections::HashMap;
use std::sync::RwLock;

use super::{GameStore, Result, StoreError};
use crate::models::game::Game;

/// テスト・ローカル実行用のインメモリ実装
#[derive(Default)]
pub struct InMemoryGameStore {
    games: RwLock<HashMap<String, Game>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryGameStore {
    fn save(&self, game_id: &str, game: &Game) -> Result<()> {
        let mut games = self.games.write().map_err(|_| StoreError::LockPoisoned)?;
        games.insert(game_id.to_string(), game.clone());
        Ok(())
    }

    fn load(&self, game_id: &str) -> Result<Option<Game>> {
        let games = self.games.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(games.get(game_id).cloned())
    }

    fn exists(&self, game_id: &str) -> Result<bool> {
        let games = self.games.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(games.contains_key(game_id))
    }

    fn delete(&self, game_id: &str) -> Result<()> {
        let mut games = self.games.write().map_err(|_| StoreError::LockPoisoned)?;
        games.remove(game_id);
        Ok(())
    }

    fn list_games(&self) -> Result<Vec<String>> {
        let games = self.games.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<String> = games.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
