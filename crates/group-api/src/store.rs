//! File-backed roster for the default group conversation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::GroupMembership;

/// Persists the member inbox ids of the default group as a JSON array.
///
/// This is the local stand-in for the transport-synced group: the chat
/// collaborator mirrors the roster into the real conversation out of band.
#[derive(Debug)]
pub struct FileGroupStore {
    path: PathBuf,
    group_id: String,
    members: Mutex<Vec<String>>,
}

impl FileGroupStore {
    /// Load the roster at `path`, starting empty when the file is absent.
    pub fn load(path: impl Into<PathBuf>, group_id: String) -> Result<Self> {
        let path = path.into();
        let members = read_roster(&path)?;
        info!(path = %path.display(), members = members.len(), "loaded group roster");
        Ok(Self {
            path,
            group_id,
            members: Mutex::new(members),
        })
    }

    fn persist(&self, members: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("creating roster directory at {}", parent.display())
            })?;
        }
        let data = serde_json::to_string_pretty(members)?;
        fs::write(&self.path, data)
            .with_context(|| format!("writing roster file at {}", self.path.display()))?;
        Ok(())
    }
}

fn read_roster(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading roster file at {}", path.display()))?;
    serde_json::from_str(&data).context("parsing roster JSON")
}

#[async_trait]
impl GroupMembership for FileGroupStore {
    fn group_id(&self) -> String {
        self.group_id.clone()
    }

    async fn is_member(&self, inbox_id: &str) -> Result<bool> {
        Ok(self.members.lock().await.iter().any(|m| m == inbox_id))
    }

    async fn add_member(&self, inbox_id: &str) -> Result<()> {
        let mut members = self.members.lock().await;
        if !members.iter().any(|m| m == inbox_id) {
            members.push(inbox_id.to_owned());
            self.persist(&members)?;
        }
        Ok(())
    }

    async fn remove_member(&self, inbox_id: &str) -> Result<()> {
        let mut members = self.members.lock().await;
        members.retain(|m| m != inbox_id);
        self.persist(&members)?;
        Ok(())
    }
}
