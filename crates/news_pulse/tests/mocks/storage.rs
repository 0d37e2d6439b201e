use std::sync::{Arc, Mutex};

use news_datastore::AudioStorage;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MockAudioStorage {
    pub stored: Arc<Mutex<Vec<(Uuid, usize)>>>,
    pub fail_with: Option<String>,
}

impl MockAudioStorage {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl AudioStorage for MockAudioStorage {
    async fn store_audio(&self, story_id: Uuid, bytes: &[u8]) -> anyhow::Result<String> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.stored.lock().unwrap().push((story_id, bytes.len()));
        Ok(format!("https://cdn.test/audio/story-{story_id}.mp3"))
    }
}
