use rand::seq::SliceRandom;
use rand::Rng;

use super::config::RuleConfig;
use super::player::{PlayerId, PlayerRegistry};
use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentSummary {
    pub players: usize,
    pub mafia: usize,
    pub citizens: usize,
}

/// 役職の並び。先頭にマフィアを並べ、シャッフル後のプレイヤーと位置で対応させる。
pub fn role_labels(n: usize, rules: &RuleConfig) -> Vec<Role> {
    let mafia = rules.covert_count(n);
    let mut labels = vec![Role::Mafia; mafia];
    labels.resize(n, Role::Citizen);
    labels
}

/// 全プレイヤーに役職を配り直し、生存・未投票の状態に戻す。人数0なら何もしない。
pub fn assign_roles<R: Rng + ?Sized>(
    registry: &mut PlayerRegistry,
    rules: &RuleConfig,
    rng: &mut R,
) -> AssignmentSummary {
    let mut order: Vec<PlayerId> = registry.ids();
    let labels = role_labels(order.len(), rules);
    order.shuffle(rng);

    for (id, role) in order.iter().zip(labels.iter()) {
        if let Some(player) = registry.get_mut(*id) {
            player.reset_for_game(*role);
        }
    }

    let mafia = labels.iter().filter(|r| r.is_covert()).count();
    AssignmentSummary {
        players: labels.len(),
        mafia,
        citizens: labels.len() - mafia,
    }
}
