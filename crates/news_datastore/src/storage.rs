use std::{future::Future, path::PathBuf};

use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

/// Blob storage for finished story audio. Returns a public URL the web
/// player can fetch directly.
pub trait AudioStorage {
    fn store_audio(
        &self,
        story_id: Uuid,
        bytes: &[u8],
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

impl<T: AudioStorage + Send + Sync> AudioStorage for &T {
    async fn store_audio(&self, story_id: Uuid, bytes: &[u8]) -> anyhow::Result<String> {
        (**self).store_audio(story_id, bytes).await
    }
}

/// Filesystem-backed storage. Writes under `root/podcasts/<date>/` and maps
/// the relative path onto a public base URL served by a static file host.
#[derive(Debug, Clone)]
pub struct LocalAudioStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalAudioStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        LocalAudioStorage {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl AudioStorage for LocalAudioStorage {
    async fn store_audio(&self, story_id: Uuid, bytes: &[u8]) -> anyhow::Result<String> {
        let rel_path = format!(
            "podcasts/{}/story-{}.mp3",
            Utc::now().format("%Y-%m-%d"),
            story_id
        );
        let file_path = self.root.join(&rel_path);

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create audio directory {}", parent.display()))?;
        }

        tokio::fs::write(&file_path, bytes)
            .await
            .inspect_err(|e| {
                tracing::error!(error = ?e, path = %file_path.display(), "Failed to write audio file")
            })
            .with_context(|| format!("Failed to write audio file {}", file_path.display()))?;

        tracing::info!(story_id = %story_id, bytes = bytes.len(), path = %rel_path, "Stored story audio");

        Ok(format!("{}/{}", self.public_base_url, rel_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_audio_and_returns_public_url() {
        let dir = std::env::temp_dir().join(format!("news-datastore-test-{}", Uuid::new_v4()));
        let storage = LocalAudioStorage::new(&dir, "https://cdn.example.com/audio/");

        let story_id = Uuid::new_v4();
        let url = storage.store_audio(story_id, b"mp3-bytes").await.unwrap();

        assert!(url.starts_with("https://cdn.example.com/audio/podcasts/"));
        assert!(url.ends_with(&format!("story-{story_id}.mp3")));

        let rel = url.trim_start_matches("https://cdn.example.com/audio/");
        let written = tokio::fs::read(dir.join(rel)).await.unwrap();
        assert_eq!(written, b"mp3-bytes");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
