use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::Result;

/// The persisted "who am I" state of the command line
///
/// Loaded once at startup and passed explicitly to the commands that read or
/// change the current user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub current_user: Option<String>,
    #[serde(skip)]
    path: PathBuf,
}

impl Session {
    /// Load the session stored in the configured data directory
    pub fn load(config: &AppConfig) -> Result<Self> {
        Self::load_from(&config.session_path())
    }

    /// Load a session file, starting empty if it does not exist yet
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut session = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<Session>(&content)?
        } else {
            Session::default()
        };
        session.path = path.to_path_buf();
        Ok(session)
    }

    /// Switch the current user and persist the change
    pub fn set_user(&mut self, name: &str) -> Result<()> {
        self.current_user = Some(name.to_string());
        self.save()
    }

    /// Forget the current user and persist the change
    pub fn clear(&mut self) -> Result<()> {
        self.current_user = None;
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load_from(&dir.path().join("session.json")).unwrap();
        assert!(session.current_user.is_none());
    }

    #[test]
    fn test_set_user_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut session = Session::load_from(&path).unwrap();
        session.set_user("kahya").unwrap();

        let reloaded = Session::load_from(&path).unwrap();
        assert_eq!(reloaded.current_user.as_deref(), Some("kahya"));

        let mut reloaded = reloaded;
        reloaded.clear().unwrap();
        assert!(Session::load_from(&path).unwrap().current_user.is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(Session::load_from(&path), Err(crate::Error::Json(_))));
    }
}
