use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::models::config::RuleConfig;
use crate::models::game::Game;
use crate::store::{GameStore, InMemoryGameStore};

#[derive(Clone)]
pub struct AppState {
    // 全ゲームを1つのロックで守る。投票の確認と記録、集計と死亡処理が交錯しない。
    pub games: Arc<Mutex<HashMap<String, Game>>>,
    pub store: Arc<dyn GameStore>,
    pub rules: Arc<RuleConfig>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryGameStore::new()), RuleConfig::from_env())
    }

    pub fn with_store(store: Arc<dyn GameStore>, rules: RuleConfig) -> Self {
        AppState {
            games: Arc::new(Mutex::new(HashMap::new())),
            store,
            rules: Arc::new(rules),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
