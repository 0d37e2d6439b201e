use std::time::Duration;

use anyhow::Context;
use news_datastore::{AudioStorage, DataStore, Episode, EpisodeStatus, Story};

use crate::{
    audio::AudioCombiner,
    llm::agent::{placeholder_script, write_story_script},
    search::NewsSearch,
    speech::{chunk_script, SpeechSynthesizer},
    Generator,
};

pub mod builder;

// The core podcast episode producer: headlines in, published episode out.
#[derive(Debug)]
pub struct EpisodeProducer<D, G, S, T, A>
where
    D: DataStore + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
    S: NewsSearch + Send + Sync + 'static,
    T: SpeechSynthesizer + Send + Sync + 'static,
    A: AudioStorage + Send + Sync + 'static,
{
    store: D,
    generator: G,
    search: S,
    speech: T,
    storage: A,
    combiner: AudioCombiner,
    max_stories: usize,
    story_delay: Duration,
    chunk_delay: Duration,
}

impl<D, G, S, T, A> EpisodeProducer<D, G, S, T, A>
where
    D: DataStore + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
    S: NewsSearch + Send + Sync + 'static,
    T: SpeechSynthesizer + Send + Sync + 'static,
    A: AudioStorage + Send + Sync + 'static,
{
    /// Produces a full episode from `headlines`: writes a script per story,
    /// synthesizes and stores its audio, and records everything against a
    /// new episode row.
    ///
    /// A failing story is skipped rather than failing the episode; the
    /// episode only fails when no story completes at all.
    #[tracing::instrument(skip(self, headlines), fields(headlines = headlines.len()))]
    pub async fn run(&self, headlines: &[String]) -> anyhow::Result<Episode> {
        let headlines = &headlines[..headlines.len().min(self.max_stories)];

        let date = chrono::Utc::now().format("%B %-d, %Y");
        let episode = Episode::pending(format!("AI News for {date}"));
        self.store
            .create_episode(&episode)
            .await
            .context("Failed to create episode")?;

        self.store
            .update_episode_status(episode.id, EpisodeStatus::Generating, None)
            .await
            .context("Failed to mark episode generating")?;

        let mut scripts = Vec::with_capacity(headlines.len());
        let mut completed = 0usize;

        for (i, headline) in headlines.iter().enumerate() {
            tracing::info!(story = i + 1, total = headlines.len(), "Producing story");

            let script = match write_story_script(&self.generator, &self.search, headline).await {
                Ok(script) => script,
                Err(e) => {
                    tracing::error!(error = ?e, headline, "Script generation failed, using fallback");
                    placeholder_script(headline)
                }
            };
            scripts.push(script.clone());

            match self
                .produce_story(episode.id, i as i32, headline, &script)
                .await
            {
                Ok(()) => completed += 1,
                Err(e) => {
                    tracing::error!(error = ?e, headline, "Story production failed, skipping");
                }
            }

            if i + 1 < headlines.len() && !self.story_delay.is_zero() {
                tokio::time::sleep(self.story_delay).await;
            }
        }

        let full_script = scripts.join("\n\n");
        self.store
            .set_episode_script(episode.id, &full_script)
            .await
            .context("Failed to store episode script")?;

        if completed == 0 {
            self.store
                .update_episode_status(
                    episode.id,
                    EpisodeStatus::Failed,
                    Some("no stories completed"),
                )
                .await
                .context("Failed to mark episode failed")?;
            anyhow::bail!("Episode {} produced no stories", episode.id);
        }

        self.store
            .update_episode_status(episode.id, EpisodeStatus::Complete, None)
            .await
            .context("Failed to mark episode complete")?;

        tracing::info!(
            episode = %episode.id,
            stories = completed,
            "Episode production complete"
        );

        self.store
            .get_episode(episode.id)
            .await?
            .context("Episode vanished after production")
    }

    /// Synthesizes one story's audio, stores it, and inserts the story row.
    #[tracing::instrument(skip(self, headline, script))]
    async fn produce_story(
        &self,
        episode_id: uuid::Uuid,
        position: i32,
        headline: &str,
        script: &str,
    ) -> anyhow::Result<()> {
        let chunks = chunk_script(script, T::MAX_INPUT_CHARS);

        let mut segments = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let audio = self
                .speech
                .synthesize(chunk)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to synthesize audio: {e:?}"))?;
            segments.push(audio);

            if i + 1 < chunks.len() && !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
        }

        let combined = self
            .combiner
            .combine(&segments)
            .await
            .context("Failed to combine audio segments")?;

        let story = Story {
            id: uuid::Uuid::new_v4(),
            episode_id,
            position,
            headline: headline.to_string(),
            script: script.to_string(),
            audio_url: None,
        };

        let audio_url = self
            .storage
            .store_audio(story.id, &combined)
            .await
            .context("Failed to store story audio")?;

        self.store
            .insert_story(&Story {
                audio_url: Some(audio_url),
                ..story
            })
            .await
            .context("Failed to insert story")?;

        Ok(())
    }
}
