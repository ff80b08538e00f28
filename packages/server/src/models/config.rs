use std::env;
use std::str::FromStr;

/// ゲームルールの設定
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    // マフィアの最低人数（1人ゲームでもマフィアが1人になる）
    pub min_covert: usize,
    // 参加人数に対するマフィアの割合（切り捨て）
    pub covert_ratio: f64,
    // 夜の投票をマフィアだけに許可するかどうか
    pub night_votes_mafia_only: bool,
    // ログに役職を出すかどうか
    pub show_player_roles: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_covert: 1,
            covert_ratio: 0.3,
            night_votes_mafia_only: true,
            show_player_roles: cfg!(debug_assertions),
        }
    }
}

impl RuleConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let min_covert = parse_var("MAFIA_MIN_COVERT").unwrap_or(defaults.min_covert);
        let covert_ratio = parse_var::<f64>("MAFIA_COVERT_RATIO")
            .filter(|r| (0.0..=1.0).contains(r))
            .unwrap_or(defaults.covert_ratio);
        let night_votes_mafia_only = parse_var::<bool>("MAFIA_NIGHT_VOTES_MAFIA_ONLY")
            .unwrap_or(defaults.night_votes_mafia_only);
        let show_player_roles =
            parse_var::<bool>("MAFIA_SHOW_PLAYER_ROLES").unwrap_or(defaults.show_player_roles);

        Self {
            min_covert,
            covert_ratio,
            night_votes_mafia_only,
            show_player_roles,
        }
    }

    /// n人の場合のマフィアの人数
    pub fn covert_count(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let proportional = (n as f64 * self.covert_ratio).floor() as usize;
        proportional.max(self.min_covert).min(n)
    }
}

/// 値が読めない場合は警告を出してデフォルトに戻す
pub(crate) fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("{} has an invalid value {:?}, using default", key, raw);
            None
        }
    }
}
