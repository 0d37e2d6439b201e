use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of a podcast episode.
///
/// pending -> generating -> complete | failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeStatus {
    Pending,
    Generating,
    Complete,
    Failed,
}

impl EpisodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeStatus::Pending => "pending",
            EpisodeStatus::Generating => "generating",
            EpisodeStatus::Complete => "complete",
            EpisodeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EpisodeStatus::Pending),
            "generating" => Ok(EpisodeStatus::Generating),
            "complete" => Ok(EpisodeStatus::Complete),
            "failed" => Ok(EpisodeStatus::Failed),
            other => Err(anyhow::anyhow!("Unknown episode status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Episode {
    pub id: Uuid,
    pub title: String,
    pub full_script: Option<String>,
    pub status: EpisodeStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Episode {
    /// A freshly created episode awaiting generation.
    pub fn pending(title: impl Into<String>) -> Self {
        Episode {
            id: Uuid::new_v4(),
            title: title.into(),
            full_script: None,
            status: EpisodeStatus::Pending,
            error: None,
            created_at: Utc::now(),
        }
    }
}

/// A single narrated story within an episode. `position` is the playback
/// order and is assigned by the producer, not the database.
#[derive(Debug, Clone, Serialize)]
pub struct Story {
    pub id: Uuid,
    pub episode_id: Uuid,
    pub position: i32,
    pub headline: String,
    pub script: String,
    pub audio_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            EpisodeStatus::Pending,
            EpisodeStatus::Generating,
            EpisodeStatus::Complete,
            EpisodeStatus::Failed,
        ] {
            let parsed: EpisodeStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("done".parse::<EpisodeStatus>().is_err());
    }
}
