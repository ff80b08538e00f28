use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::player::PlayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotePhase {
    Night, // マフィアの秘密投票
    Day,   // 全員の公開投票
}

impl fmt::Display for VotePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VotePhase::Night => write!(f, "night"),
            VotePhase::Day => write!(f, "day"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: u64,
    pub phase: VotePhase,
    pub target_id: PlayerId,
    pub target_name: String,
    pub voter_id: PlayerId,
    pub cast_at: DateTime<Utc>,
}

/// 投票の追記専用ログ。個別削除はせず、フェーズ切り替え時にまとめて消す。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteLedger {
    votes: Vec<Vote>,
    next_id: u64,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        phase: VotePhase,
        target_id: PlayerId,
        target_name: String,
        voter_id: PlayerId,
    ) -> &Vote {
        self.next_id += 1;
        self.votes.push(Vote {
            id: self.next_id,
            phase,
            target_id,
            target_name,
            voter_id,
            cast_at: Utc::now(),
        });
        &self.votes[self.votes.len() - 1]
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn votes_for(&self, phase: VotePhase) -> impl Iterator<Item = &Vote> {
        self.votes.iter().filter(move |v| v.phase == phase)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// フェーズ内の得票数を多い順に返す。同数は対象IDの昇順。
    pub fn tally(&self, phase: VotePhase) -> Vec<(PlayerId, usize)> {
        self.tally_where(phase, |_| true)
    }

    /// `counts_vote`が`true`を返す投票だけを数える
    pub fn tally_where<F>(&self, phase: VotePhase, counts_vote: F) -> Vec<(PlayerId, usize)>
    where
        F: Fn(&Vote) -> bool,
    {
        let mut counts: HashMap<PlayerId, usize> = HashMap::new();
        for vote in self.votes_for(phase).filter(|v| counts_vote(v)) {
            *counts.entry(vote.target_id).or_insert(0) += 1;
        }
        let mut tally: Vec<_> = counts.into_iter().collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        tally
    }

    /// IDの採番は続けたまま記録を空にする
    pub fn clear(&mut self) {
        self.votes.clear();
    }
}
