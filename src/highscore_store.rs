use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HighscoreError;
use crate::server_utils::sanitize_player_name;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct StoredHighscore {
    score: u32,
    name: String,
    #[serde(rename = "updatedAt", alias = "updated_at")]
    updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct HighscoreFile {
    version: u8,
    best: Option<StoredHighscore>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HighscoreResponse {
    pub highscore: u32,
    pub name: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmitResponse {
    pub updated: bool,
    #[serde(flatten)]
    pub current: HighscoreResponse,
}

/// Single best team score, persisted as JSON.
pub struct HighscoreStore {
    file_path: PathBuf,
    best: Option<StoredHighscore>,
}

impl HighscoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        let best = load_best(&file_path);
        Self { file_path, best }
    }

    pub fn current(&self) -> HighscoreResponse {
        HighscoreResponse {
            highscore: self.best.as_ref().map_or(0, |best| best.score),
            name: self.best.as_ref().map(|best| best.name.clone()),
            updated_at: self.best.as_ref().map(|best| best.updated_at.clone()),
        }
    }

    /// Keeps `score` when it beats the stored one. The file is only written on
    /// improvement.
    pub fn submit(&mut self, score: u32, name: &str) -> Result<SubmitResponse, HighscoreError> {
        let improves = self.best.as_ref().map_or(score > 0, |best| score > best.score);
        if improves {
            self.best = Some(StoredHighscore {
                score,
                name: sanitize_player_name(name),
                updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            });
            self.save()?;
        }
        Ok(SubmitResponse {
            updated: improves,
            current: self.current(),
        })
    }

    fn save(&self) -> Result<(), HighscoreError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = HighscoreFile {
            version: 1,
            best: self.best.clone(),
        };
        let text = serde_json::to_string_pretty(&payload)?;
        fs::write(&self.file_path, text)?;
        Ok(())
    }
}

fn load_best(path: &Path) -> Option<StoredHighscore> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), %error, "failed to read highscore file");
            }
            return None;
        }
    };
    match serde_json::from_str::<HighscoreFile>(&text) {
        Ok(file) if file.version == 1 => file.best,
        Ok(file) => {
            tracing::warn!(
                path = %path.display(),
                version = file.version,
                "unsupported highscore file version"
            );
            None
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to parse highscore file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!(
            "{}-{}-{}",
            name,
            std::process::id(),
            rand::random::<u32>()
        );
        std::env::temp_dir().join(unique).join("highscore.json")
    }

    #[test]
    fn submit_keeps_only_improvements() {
        let path = temp_file("highscore-submit");
        let mut store = HighscoreStore::new(path.clone());
        assert_eq!(store.current().highscore, 0);
        assert_eq!(store.current().name, None);

        let first = store.submit(3, "abc").expect("save succeeds");
        assert!(first.updated);
        assert_eq!(first.current.highscore, 3);
        assert_eq!(first.current.name.as_deref(), Some("ABC"));

        let lower = store.submit(2, "zzz").expect("no write needed");
        assert!(!lower.updated);
        assert_eq!(lower.current.name.as_deref(), Some("ABC"));

        let tie = store.submit(3, "zzz").expect("no write needed");
        assert!(!tie.updated);

        let _ = fs::remove_dir_all(path.parent().expect("parent exists"));
    }

    #[test]
    fn best_score_survives_reload() {
        let path = temp_file("highscore-reload");
        {
            let mut store = HighscoreStore::new(path.clone());
            store.submit(4, "bee").expect("save succeeds");
        }
        let reloaded = HighscoreStore::new(path.clone());
        let current = reloaded.current();
        assert_eq!(current.highscore, 4);
        assert_eq!(current.name.as_deref(), Some("BEE"));
        assert!(current.updated_at.is_some());

        let _ = fs::remove_dir_all(path.parent().expect("parent exists"));
    }

    #[test]
    fn unreadable_file_starts_empty() {
        let path = temp_file("highscore-broken");
        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");
        fs::write(&path, "{ not json").expect("write file");
        assert_eq!(HighscoreStore::new(path.clone()).current().highscore, 0);

        fs::write(&path, r#"{"version":9,"best":null}"#).expect("write file");
        assert_eq!(HighscoreStore::new(path).current().highscore, 0);

        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn response_uses_camel_case_fields() {
        let response = SubmitResponse {
            updated: true,
            current: HighscoreResponse {
                highscore: 2,
                name: Some("ABC".to_string()),
                updated_at: Some("2024-01-01T00:00:00.000Z".to_string()),
            },
        };
        let value = serde_json::to_value(&response).expect("serializes");
        assert_eq!(value["updated"], true);
        assert_eq!(value["highscore"], 2);
        assert_eq!(value["updatedAt"], "2024-01-01T00:00:00.000Z");
    }
}
