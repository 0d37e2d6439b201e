use std::future::Future;

use uuid::Uuid;

use crate::{Episode, EpisodeStatus, Story};

pub mod postgres;

pub trait DataStore {
    fn create_episode(&self, episode: &Episode) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn update_episode_status(
        &self,
        id: Uuid,
        status: EpisodeStatus,
        error: Option<&str>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn set_episode_script(
        &self,
        id: Uuid,
        full_script: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn insert_story(&self, story: &Story) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn get_episode(
        &self,
        id: Uuid,
    ) -> impl Future<Output = anyhow::Result<Option<Episode>>> + Send;

    fn latest_episode(&self) -> impl Future<Output = anyhow::Result<Option<Episode>>> + Send;

    /// Stories of an episode, ordered by their explicit position.
    fn episode_stories(
        &self,
        episode_id: Uuid,
    ) -> impl Future<Output = anyhow::Result<Vec<Story>>> + Send;
}

impl<T: DataStore + Send + Sync> DataStore for &T {
    async fn create_episode(&self, episode: &Episode) -> anyhow::Result<()> {
        (**self).create_episode(episode).await
    }

    async fn update_episode_status(
        &self,
        id: Uuid,
        status: EpisodeStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()> {
        (**self).update_episode_status(id, status, error).await
    }

    async fn set_episode_script(&self, id: Uuid, full_script: &str) -> anyhow::Result<()> {
        (**self).set_episode_script(id, full_script).await
    }

    async fn insert_story(&self, story: &Story) -> anyhow::Result<()> {
        (**self).insert_story(story).await
    }

    async fn get_episode(&self, id: Uuid) -> anyhow::Result<Option<Episode>> {
        (**self).get_episode(id).await
    }

    async fn latest_episode(&self) -> anyhow::Result<Option<Episode>> {
        (**self).latest_episode().await
    }

    async fn episode_stories(&self, episode_id: Uuid) -> anyhow::Result<Vec<Story>> {
        (**self).episode_stories(episode_id).await
    }
}
