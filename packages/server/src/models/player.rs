use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::role::Role;

/// チャットプラットフォーム側のユーザーID
pub type PlayerId = i64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub is_dead: bool,
    pub has_voted: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            role: Role::Citizen,
            is_dead: false,
            has_voted: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// 新しいゲーム・フェーズ開始時の状態に戻す
    pub fn reset_for_game(&mut self, role: Role) {
        self.role = role;
        self.is_dead = false;
        self.has_voted = false;
    }
}

/// 参加プレイヤーの一覧。削除はせず、死亡は`is_dead`で表す。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新規なら`true`。既存プレイヤーは表示名だけ更新し、生死・投票状態は維持する。
    pub fn register(&mut self, id: PlayerId, name: &str) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.name = name.to_string();
                false
            }
            None => {
                self.players.insert(id, Player::new(id, name.to_string()));
                true
            }
        }
    }

    pub fn exists(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.players.len()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.is_alive())
    }

    pub fn list_alive(&self) -> Vec<String> {
        self.alive().map(|p| p.name.clone()).collect()
    }

    pub fn list_by_role(&self, role: Role) -> Vec<String> {
        self.alive()
            .filter(|p| p.role == role)
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn count_alive_by_role(&self, role: Role) -> usize {
        self.alive().filter(|p| p.role == role).count()
    }

    pub fn all_roles(&self) -> HashMap<PlayerId, Role> {
        self.players.values().map(|p| (p.id, p.role)).collect()
    }

    /// 表示名から生存プレイヤーを一意に引く。該当なし・重複はどちらも`None`。
    pub fn find_alive_by_name(&self, name: &str) -> Option<&Player> {
        let mut matches = self.alive().filter(|p| p.name == name);
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    pub fn reset_votes(&mut self) {
        for player in self.players.values_mut() {
            player.has_voted = false;
        }
    }
}
