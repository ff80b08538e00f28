use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::assignment::{assign_roles, AssignmentSummary};
use super::config::RuleConfig;
use super::player::{PlayerId, PlayerRegistry};
use super::resolution::{resolve_covert, resolve_open, Elimination};
use super::role::Role;
use super::vote::{VoteLedger, VotePhase};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Game {
    pub game_id: String,
    pub players: PlayerRegistry,
    pub votes: VoteLedger,
    pub phase: GamePhase,
    pub result: GameResult,
    pub round: u32,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Game {{ game_id: {}, players: {}, alive: {}, phase: {:?}, round: {}, result: {:?} }}",
            self.game_id,
            self.players.count(),
            self.players.alive().count(),
            self.phase,
            self.round,
            self.result
        )
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Lobby,         // 参加受付中
    RolesAssigned, // 役職配布済み
    NightVoting,   // 夜の投票
    NightResolved, // 夜の結果
    DayVoting,     // 昼の投票
    DayResolved,   // 昼の結果
    Finished,      // ゲーム終了
}

impl GamePhase {
    /// 投票を受け付けているフェーズ
    pub fn open_vote(&self) -> Option<VotePhase> {
        match self {
            GamePhase::NightVoting => Some(VotePhase::Night),
            GamePhase::DayVoting => Some(VotePhase::Day),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    InProgress,
    CitizenWin, // 市民陣営の勝利
    MafiaWin,   // マフィア陣営の勝利
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("cannot {action} during {phase:?}")]
    WrongPhase {
        action: &'static str,
        phase: GamePhase,
    },
    #[error("the game is already over")]
    Finished,
    #[error("no players have joined")]
    NoPlayers,
}

/// 投票先。IDが基本で、表示名は入口でIDに解決する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    Id(PlayerId),
    Name(String),
}

impl Game {
    pub fn new(game_id: String) -> Self {
        Game {
            game_id,
            players: PlayerRegistry::new(),
            votes: VoteLedger::new(),
            phase: GamePhase::Lobby,
            result: GameResult::InProgress,
            round: 0,
            created_at: Utc::now(),
        }
    }

    pub fn register(&mut self, id: PlayerId, name: &str) -> bool {
        self.players.register(id, name)
    }

    /// 役職を配って新しいゲームを始める。どのフェーズからでもやり直せる。
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        rules: &RuleConfig,
        rng: &mut R,
    ) -> Result<AssignmentSummary, GameError> {
        if self.players.count() == 0 {
            return Err(GameError::NoPlayers);
        }
        let summary = assign_roles(&mut self.players, rules, rng);
        self.votes.clear();
        self.phase = GamePhase::RolesAssigned;
        self.result = GameResult::InProgress;
        self.round = 0;
        Ok(summary)
    }

    /// 次の投票フェーズを開く。前フェーズの投票記録と投票済みフラグはここで消える。
    pub fn open_next_phase(&mut self) -> Result<GamePhase, GameError> {
        let next = match self.phase {
            GamePhase::RolesAssigned | GamePhase::DayResolved => {
                self.round += 1;
                GamePhase::NightVoting
            }
            GamePhase::NightResolved => GamePhase::DayVoting,
            GamePhase::Finished => return Err(GameError::Finished),
            phase => {
                return Err(GameError::WrongPhase {
                    action: "open a voting phase",
                    phase,
                })
            }
        };
        self.votes.clear();
        self.players.reset_votes();
        self.phase = next;
        Ok(next)
    }

    /// 投票の検証と記録。不正な投票は`false`で、記録も状態変更もしない。
    pub fn cast_vote(&mut self, phase: VotePhase, target: &VoteTarget, voter_id: PlayerId) -> bool {
        match self.players.get(voter_id) {
            Some(voter) if voter.is_alive() && !voter.has_voted => {}
            _ => return false,
        }

        let target = match target {
            VoteTarget::Id(id) => self.players.get(*id).filter(|p| p.is_alive()),
            VoteTarget::Name(name) => self.players.find_alive_by_name(name),
        };
        let Some(target) = target else {
            return false;
        };
        let (target_id, target_name) = (target.id, target.name.clone());

        self.votes.append(phase, target_id, target_name, voter_id);
        if let Some(voter) = self.players.get_mut(voter_id) {
            voter.has_voted = true;
        }
        true
    }

    /// フェーズ進行を考慮した投票。開いていないフェーズへの投票や、
    /// 設定によっては市民の夜投票も拒否する。
    pub fn submit_vote(
        &mut self,
        phase: VotePhase,
        target: &VoteTarget,
        voter_id: PlayerId,
        rules: &RuleConfig,
    ) -> bool {
        if self.phase.open_vote() != Some(phase) {
            return false;
        }
        if phase == VotePhase::Night && rules.night_votes_mafia_only {
            let is_mafia = self
                .players
                .get(voter_id)
                .map(|p| p.role == Role::Mafia)
                .unwrap_or(false);
            if !is_mafia {
                return false;
            }
        }
        self.cast_vote(phase, target, voter_id)
    }

    pub fn resolve_night(&mut self) -> Result<Elimination, GameError> {
        self.expect_phase(GamePhase::NightVoting, "resolve the night vote")?;
        let outcome = resolve_covert(&mut self.players, &self.votes);
        self.phase = GamePhase::NightResolved;
        self.update_result();
        Ok(outcome)
    }

    pub fn resolve_day(&mut self) -> Result<Elimination, GameError> {
        self.expect_phase(GamePhase::DayVoting, "resolve the day vote")?;
        let outcome = resolve_open(&mut self.players, &self.votes);
        self.phase = GamePhase::DayResolved;
        self.update_result();
        Ok(outcome)
    }

    /// 生存者数から勝敗を判定する
    pub fn evaluate_winner(&self) -> GameResult {
        let mafia = self.players.count_alive_by_role(Role::Mafia);
        let others = self.players.alive().count() - mafia;
        if mafia == 0 {
            GameResult::CitizenWin
        } else if others == 0 {
            GameResult::MafiaWin
        } else {
            GameResult::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    pub fn roles(&self) -> HashMap<PlayerId, Role> {
        self.players.all_roles()
    }

    fn update_result(&mut self) {
        self.result = self.evaluate_winner();
        if self.result != GameResult::InProgress {
            self.phase = GamePhase::Finished;
        }
    }

    fn expect_phase(&self, expected: GamePhase, action: &'static str) -> Result<(), GameError> {
        if self.phase == GamePhase::Finished {
            return Err(GameError::Finished);
        }
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }
}
