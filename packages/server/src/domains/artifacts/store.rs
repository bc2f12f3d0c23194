//! Filesystem artifact store.
//!
//! Layout: `<root>/conversations/<id>.json` and `<root>/insights/<id>.json`.
//! Writes go through a temp file in the target directory, are fsynced, then
//! renamed without clobbering. Existing artifacts are never overwritten.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use extraction::Conversation;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{ArtifactId, SaveOutcome, StoredInsight};
use crate::domains::insights::InsightRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("artifact JSON failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub struct ArtifactStore {
    root: PathBuf,
    conversations_dir: PathBuf,
    insights_dir: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let conversations_dir = root.join("conversations");
        let insights_dir = root.join("insights");
        fs::create_dir_all(&conversations_dir)?;
        fs::create_dir_all(&insights_dir)?;

        Ok(Self {
            root,
            conversations_dir,
            insights_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a conversation under the id of its source link.
    pub fn save_conversation(&self, conversation: &Conversation) -> Result<SaveOutcome> {
        let id = ArtifactId::for_link(&conversation.source_link);
        let outcome = write_new(&self.conversations_dir, id, conversation)?;
        if let SaveOutcome::Created(id) = &outcome {
            info!(id = %id, turns = conversation.turns.len(), "Conversation saved");
        }
        Ok(outcome)
    }

    /// Persist the insight for the conversation `id`.
    pub fn save_insight(&self, id: &ArtifactId, insight: &InsightRecord) -> Result<SaveOutcome> {
        let outcome = write_new(&self.insights_dir, id.clone(), insight)?;
        if let SaveOutcome::Created(id) = &outcome {
            info!(id = %id, topic = %insight.main_topic, "Insight saved");
        }
        Ok(outcome)
    }

    pub fn has_insight(&self, id: &ArtifactId) -> bool {
        self.insights_dir.join(id.filename()).exists()
    }

    pub fn has_conversation(&self, id: &ArtifactId) -> bool {
        self.conversations_dir.join(id.filename()).exists()
    }

    /// Load one insight. Malformed ids and missing files are `Ok(None)`.
    pub fn load_insight(&self, id: &str) -> Result<Option<InsightRecord>> {
        match ArtifactId::parse(id) {
            Some(id) => read_json(&self.insights_dir.join(id.filename())),
            None => Ok(None),
        }
    }

    /// Load one conversation. Malformed ids and missing files are `Ok(None)`.
    pub fn load_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        match ArtifactId::parse(id) {
            Some(id) => read_json(&self.conversations_dir.join(id.filename())),
            None => Ok(None),
        }
    }

    /// Summaries of every readable insight, newest first.
    ///
    /// Unreadable files are logged and skipped.
    pub fn list_insights(&self) -> Result<Vec<StoredInsight>> {
        let mut insights = Vec::new();
        for id in list_ids(&self.insights_dir)? {
            let path = self.insights_dir.join(id.filename());
            match read_json::<InsightRecord>(&path) {
                Ok(Some(record)) => insights.push(StoredInsight::new(id, record)),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable insight"),
            }
        }

        insights.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(insights)
    }

    /// Conversation ids that have no insight yet.
    pub fn pending_insights(&self) -> Result<Vec<ArtifactId>> {
        let mut pending: Vec<_> = list_ids(&self.conversations_dir)?
            .into_iter()
            .filter(|id| !self.has_insight(id))
            .collect();
        pending.sort();
        Ok(pending)
    }
}

/// Ids of the `<id>.json` files in `dir`; temp files and strays are ignored.
fn list_ids(dir: &Path) -> Result<Vec<ArtifactId>> {
    let mut ids = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
            continue;
        };
        if let Some(id) = ArtifactId::parse(stem) {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn write_new<T: Serialize>(dir: &Path, id: ArtifactId, value: &T) -> Result<SaveOutcome> {
    let path = dir.join(id.filename());
    if path.exists() {
        debug!(id = %id, "Artifact exists, skipping");
        return Ok(SaveOutcome::Duplicate(id));
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(&path) {
        Ok(_) => Ok(SaveOutcome::Created(id)),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            debug!(id = %id, "Artifact appeared during write, skipping");
            Ok(SaveOutcome::Duplicate(id))
        }
        Err(e) => Err(StoreError::Io(e.error)),
    }
}
