use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domains::insights::{InsightRecord, Sentiment};

const ID_LEN: usize = 32;

/// Stable artifact key: first 16 bytes of SHA-256 over the normalized link,
/// as 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn for_link(link: &str) -> Self {
        let normalized = link.trim().to_lowercase();
        let digest = Sha256::digest(normalized.as_bytes());
        Self(hex::encode(&digest[..ID_LEN / 2]))
    }

    /// Accept only well-formed ids, so an id can never name a path outside the store.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn filename(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a write under the skip-duplicates policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(ArtifactId),
    /// An artifact with this id already existed and was left untouched
    Duplicate(ArtifactId),
}

impl SaveOutcome {
    pub fn id(&self) -> &ArtifactId {
        match self {
            Self::Created(id) | Self::Duplicate(id) => id,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Listing entry for a persisted insight.
#[derive(Debug, Clone, Serialize)]
pub struct StoredInsight {
    pub id: ArtifactId,
    pub filename: String,
    pub user_name: Option<String>,
    pub main_topic: String,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl StoredInsight {
    pub fn new(id: ArtifactId, record: InsightRecord) -> Self {
        Self {
            filename: id.filename(),
            id,
            user_name: record.user_name,
            main_topic: record.main_topic,
            sentiment: record.sentiment,
            tags: record.tags.into_iter().collect(),
            created_at: record.created_at,
        }
    }
}
