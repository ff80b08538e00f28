use serde::{Deserialize, Serialize};

use super::player::{PlayerId, PlayerRegistry};
use super::role::Role;
use super::vote::{VoteLedger, VotePhase};

/// 投票集計の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Elimination {
    Eliminated { player_id: PlayerId, name: String },
    Nobody,
}

impl Elimination {
    pub fn name(&self) -> Option<&str> {
        match self {
            Elimination::Eliminated { name, .. } => Some(name),
            Elimination::Nobody => None,
        }
    }

    /// 表示用。誰も死ななかった場合は"none"
    pub fn label(&self) -> &str {
        self.name().unwrap_or("none")
    }
}

fn eliminate(registry: &mut PlayerRegistry, target: PlayerId) -> Elimination {
    match registry.get_mut(target) {
        Some(player) if player.is_alive() => {
            player.is_dead = true;
            Elimination::Eliminated {
                player_id: player.id,
                name: player.name.clone(),
            }
        }
        _ => Elimination::Nobody,
    }
}

/// 夜の処理。最多得票が単独で、かつ生存マフィア全員がその対象に投票した場合のみ殺害が成立する。
/// 市民の夜投票は同数判定には含まれるが、全員一致の数には入らない。
pub fn resolve_covert(registry: &mut PlayerRegistry, ledger: &VoteLedger) -> Elimination {
    let mafia_alive = registry.count_alive_by_role(Role::Mafia);
    if mafia_alive == 0 {
        return Elimination::Nobody;
    }

    let tally = ledger.tally(VotePhase::Night);
    let Some(&(target, top)) = tally.first() else {
        return Elimination::Nobody;
    };
    if tally.get(1).is_some_and(|&(_, runner_up)| runner_up == top) {
        return Elimination::Nobody;
    }

    let mafia_votes = ledger
        .tally_where(VotePhase::Night, |vote| {
            vote.target_id == target
                && registry
                    .get(vote.voter_id)
                    .map(|p| p.is_alive() && p.role == Role::Mafia)
                    .unwrap_or(false)
        })
        .first()
        .map(|&(_, count)| count)
        .unwrap_or(0);
    if mafia_votes != mafia_alive {
        return Elimination::Nobody;
    }
    eliminate(registry, target)
}

/// 昼の処理。最多得票が2位と同数なら処刑なし。
pub fn resolve_open(registry: &mut PlayerRegistry, ledger: &VoteLedger) -> Elimination {
    let tally = ledger.tally(VotePhase::Day);
    let Some(&(leader, top)) = tally.first() else {
        return Elimination::Nobody;
    };

    if let Some(&(_, runner_up)) = tally.get(1) {
        if runner_up == top {
            return Elimination::Nobody;
        }
    }
    eliminate(registry, leader)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(mafia: &[PlayerId], citizens: &[PlayerId]) -> PlayerRegistry {
        let mut registry = PlayerRegistry::new();
        for &id in mafia.iter().chain(citizens) {
            registry.register(id, &format!("P{}", id));
        }
        for &id in mafia {
            registry.get_mut(id).unwrap().role = Role::Mafia;
        }
        registry
    }

    fn vote(ledger: &mut VoteLedger, phase: VotePhase, voter: PlayerId, target: PlayerId) {
        ledger.append(phase, target, format!("P{}", target), voter);
    }

    #[test]
    fn covert_requires_unanimity() {
        let mut players = registry(&[1, 2], &[3, 4, 5]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Night, 1, 3);

        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);
        assert!(players.get(3).unwrap().is_alive());

        vote(&mut ledger, VotePhase::Night, 2, 3);
        assert_eq!(
            resolve_covert(&mut players, &ledger),
            Elimination::Eliminated {
                player_id: 3,
                name: "P3".into()
            }
        );
        assert!(players.get(3).unwrap().is_dead);
    }

    #[test]
    fn covert_split_vote_kills_nobody() {
        let mut players = registry(&[1, 2], &[3, 4]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Night, 1, 3);
        vote(&mut ledger, VotePhase::Night, 2, 4);
        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);
        assert_eq!(players.list_alive().len(), 4);
    }

    #[test]
    fn covert_with_no_living_mafia_or_no_votes_kills_nobody() {
        let mut players = registry(&[1], &[2, 3]);
        let ledger = VoteLedger::new();
        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);

        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Night, 2, 3);
        players.get_mut(1).unwrap().is_dead = true;
        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);
        assert!(players.get(3).unwrap().is_alive());
    }

    #[test]
    fn covert_ignores_day_votes() {
        let mut players = registry(&[1], &[2, 3]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Day, 2, 3);
        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);
    }

    #[test]
    fn covert_ignores_citizen_night_votes() {
        let mut players = registry(&[1, 2], &[3, 4, 5, 6]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Night, 1, 3);
        vote(&mut ledger, VotePhase::Night, 2, 4);
        vote(&mut ledger, VotePhase::Night, 5, 6);
        vote(&mut ledger, VotePhase::Night, 4, 6);

        // 市民の2票はマフィアの全員一致の代わりにならない
        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);
        assert!(players.get(6).unwrap().is_alive());
    }

    #[test]
    fn covert_tie_with_citizen_votes_kills_nobody() {
        let mut players = registry(&[1, 2], &[3, 4, 5, 6]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Night, 1, 3);
        vote(&mut ledger, VotePhase::Night, 2, 3);
        vote(&mut ledger, VotePhase::Night, 4, 6);
        vote(&mut ledger, VotePhase::Night, 5, 6);

        // 最多得票が同数なので全員一致でも殺害なし
        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);
        assert!(players.get(3).unwrap().is_alive());
        assert!(players.get(6).unwrap().is_alive());
    }

    #[test]
    fn covert_unanimous_mafia_with_extra_citizen_votes_still_kills() {
        let mut players = registry(&[1, 2], &[3, 4, 5, 6]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Night, 1, 3);
        vote(&mut ledger, VotePhase::Night, 2, 3);
        vote(&mut ledger, VotePhase::Night, 4, 3);
        vote(&mut ledger, VotePhase::Night, 5, 6);
        assert_eq!(resolve_covert(&mut players, &ledger).name(), Some("P3"));
    }

    #[test]
    fn covert_counts_only_living_mafia() {
        let mut players = registry(&[1, 2, 3], &[4, 5]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Night, 1, 4);
        vote(&mut ledger, VotePhase::Night, 2, 4);
        vote(&mut ledger, VotePhase::Night, 5, 4);
        assert_eq!(resolve_covert(&mut players, &ledger), Elimination::Nobody);

        players.get_mut(3).unwrap().is_dead = true;
        assert_eq!(resolve_covert(&mut players, &ledger).name(), Some("P4"));
    }

    #[test]
    fn open_tie_at_the_top_kills_nobody() {
        let mut players = registry(&[1], &[2, 3, 4, 5, 6, 7]);
        let mut ledger = VoteLedger::new();
        for voter in [1, 2, 3] {
            vote(&mut ledger, VotePhase::Day, voter, 6);
        }
        for voter in [4, 5, 6] {
            vote(&mut ledger, VotePhase::Day, voter, 7);
        }
        assert_eq!(resolve_open(&mut players, &ledger), Elimination::Nobody);
        assert_eq!(players.list_alive().len(), 7);
    }

    #[test]
    fn open_plurality_over_runner_up_convicts() {
        let mut players = registry(&[1], &[2, 3, 4, 5, 6]);
        let mut ledger = VoteLedger::new();
        for voter in [2, 3, 4] {
            vote(&mut ledger, VotePhase::Day, voter, 1);
        }
        for voter in [1, 5] {
            vote(&mut ledger, VotePhase::Day, voter, 6);
        }
        let result = resolve_open(&mut players, &ledger);
        assert_eq!(result.label(), "P1");
        assert!(players.get(1).unwrap().is_dead);
        assert!(players.get(6).unwrap().is_alive());
    }

    #[test]
    fn open_without_votes_kills_nobody() {
        let mut players = registry(&[1], &[2]);
        let result = resolve_open(&mut players, &VoteLedger::new());
        assert_eq!(result, Elimination::Nobody);
        assert_eq!(result.label(), "none");
    }

    #[test]
    fn open_single_vote_convicts() {
        let mut players = registry(&[1], &[2]);
        let mut ledger = VoteLedger::new();
        vote(&mut ledger, VotePhase::Day, 2, 1);
        assert_eq!(resolve_open(&mut players, &ledger).name(), Some("P1"));
    }
}
