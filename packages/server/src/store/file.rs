use std::fs;
use std::path::{Path, PathBuf};

use super::{GameStore, Result};
use crate::models::game::Game;

/// ゲームごとに`game_{id}.json`として保存する。
/// 一時ファイルに書いてからrenameするので、書き込み途中のファイルは読まれない。
pub struct FileGameStore {
    base_dir: PathBuf,
}

impl FileGameStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn game_path(&self, game_id: &str) -> PathBuf {
        self.base_dir.join(format!("game_{}.json", game_id))
    }
}

impl GameStore for FileGameStore {
    fn save(&self, game_id: &str, game: &Game) -> Result<()> {
        let path = self.game_path(game_id);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(game)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved game {} to {}", game_id, path.display());
        Ok(())
    }

    fn load(&self, game_id: &str) -> Result<Option<Game>> {
        let path = self.game_path(game_id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let game: Game = serde_json::from_slice(&bytes)?;
        tracing::debug!("Loaded game {} from {}", game_id, path.display());
        Ok(Some(game))
    }

    fn exists(&self, game_id: &str) -> Result<bool> {
        Ok(self.game_path(game_id).exists())
    }

    fn delete(&self, game_id: &str) -> Result<()> {
        let path = self.game_path(game_id);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Deleted game {}", game_id);
        }
        Ok(())
    }

    fn list_games(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(id) = filename
                .strip_prefix("game_")
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
