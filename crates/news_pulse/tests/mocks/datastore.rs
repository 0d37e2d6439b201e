use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use news_datastore::{DataStore, Episode, EpisodeStatus, Story};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MockDataStore {
    pub episodes: Arc<Mutex<HashMap<Uuid, Episode>>>,
    pub stories: Arc<Mutex<Vec<Story>>>,
    pub status_log: Arc<Mutex<Vec<(Uuid, EpisodeStatus)>>>,
    pub fail_with: Option<String>,
}

impl MockDataStore {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(())
    }
}

impl DataStore for MockDataStore {
    async fn create_episode(&self, episode: &Episode) -> anyhow::Result<()> {
        self.check()?;
        self.episodes
            .lock()
            .unwrap()
            .insert(episode.id, episode.clone());
        self.status_log
            .lock()
            .unwrap()
            .push((episode.id, episode.status));
        Ok(())
    }

    async fn update_episode_status(
        &self,
        id: Uuid,
        status: EpisodeStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()> {
        self.check()?;
        if let Some(episode) = self.episodes.lock().unwrap().get_mut(&id) {
            episode.status = status;
            episode.error = error.map(str::to_string);
        }
        self.status_log.lock().unwrap().push((id, status));
        Ok(())
    }

    async fn set_episode_script(&self, id: Uuid, full_script: &str) -> anyhow::Result<()> {
        self.check()?;
        if let Some(episode) = self.episodes.lock().unwrap().get_mut(&id) {
            episode.full_script = Some(full_script.to_string());
        }
        Ok(())
    }

    async fn insert_story(&self, story: &Story) -> anyhow::Result<()> {
        self.check()?;
        self.stories.lock().unwrap().push(story.clone());
        Ok(())
    }

    async fn get_episode(&self, id: Uuid) -> anyhow::Result<Option<Episode>> {
        self.check()?;
        Ok(self.episodes.lock().unwrap().get(&id).cloned())
    }

    async fn latest_episode(&self) -> anyhow::Result<Option<Episode>> {
        self.check()?;
        Ok(self
            .episodes
            .lock()
            .unwrap()
            .values()
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn episode_stories(&self, episode_id: Uuid) -> anyhow::Result<Vec<Story>> {
        self.check()?;
        let mut stories: Vec<Story> = self
            .stories
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.episode_id == episode_id)
            .cloned()
            .collect();
        stories.sort_by_key(|s| s.position);
        Ok(stories)
    }
}
