use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{datastore::DataStore, Episode, EpisodeStatus, Story};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct PgDataStore {
    pub pool: PgPool,
}

impl PgDataStore {
    /// Establish connection to database and run pending migrations
    pub async fn init(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .context("Failed to connect to postgres database")?;

        MIGRATOR
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to run database migrations"))
            .context("Failed to run database migrations")?;

        Ok(PgDataStore { pool })
    }
}

#[derive(sqlx::FromRow)]
struct EpisodeRow {
    id: Uuid,
    title: String,
    full_script: Option<String>,
    status: String,
    error: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EpisodeRow> for Episode {
    type Error = anyhow::Error;

    fn try_from(row: EpisodeRow) -> anyhow::Result<Self> {
        Ok(Episode {
            id: row.id,
            title: row.title,
            full_script: row.full_script,
            status: row.status.parse()?,
            error: row.error,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoryRow {
    id: Uuid,
    episode_id: Uuid,
    position: i32,
    headline: String,
    script: String,
    audio_url: Option<String>,
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Story {
            id: row.id,
            episode_id: row.episode_id,
            position: row.position,
            headline: row.headline,
            script: row.script,
            audio_url: row.audio_url,
        }
    }
}

impl DataStore for PgDataStore {
    async fn create_episode(&self, episode: &Episode) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO episodes (id, title, full_script, status, error, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(episode.id)
        .bind(&episode.title)
        .bind(&episode.full_script)
        .bind(episode.status.as_str())
        .bind(&episode.error)
        .bind(episode.created_at)
        .execute(&self.pool)
        .await
        .inspect_err(|err| {
            tracing::error!(error = ?err, episode_id = %episode.id, "Failed to insert episode")
        })
        .context("Failed to insert episode")?;

        Ok(())
    }

    async fn update_episode_status(
        &self,
        id: Uuid,
        status: EpisodeStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE episodes SET status = $2, error = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(error)
            .execute(&self.pool)
            .await
            .inspect_err(|err| {
                tracing::error!(error = ?err, episode_id = %id, "Failed to update episode status")
            })
            .context("Failed to update episode status")?;

        Ok(())
    }

    async fn set_episode_script(&self, id: Uuid, full_script: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE episodes SET full_script = $2 WHERE id = $1")
            .bind(id)
            .bind(full_script)
            .execute(&self.pool)
            .await
            .inspect_err(|err| {
                tracing::error!(error = ?err, episode_id = %id, "Failed to set episode script")
            })
            .context("Failed to set episode script")?;

        Ok(())
    }

    async fn insert_story(&self, story: &Story) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stories (id, episode_id, position, headline, script, audio_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(story.id)
        .bind(story.episode_id)
        .bind(story.position)
        .bind(&story.headline)
        .bind(&story.script)
        .bind(&story.audio_url)
        .execute(&self.pool)
        .await
        .inspect_err(|err| {
            tracing::error!(error = ?err, story_id = %story.id, "Failed to insert story")
        })
        .context("Failed to insert story")?;

        Ok(())
    }

    async fn get_episode(&self, id: Uuid) -> anyhow::Result<Option<Episode>> {
        let row = sqlx::query_as::<_, EpisodeRow>(
            "SELECT id, title, full_script, status, error, created_at FROM episodes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|err| tracing::error!(error = ?err, episode_id = %id, "Failed to fetch episode"))
        .context("Failed to fetch episode")?;

        row.map(Episode::try_from).transpose()
    }

    async fn latest_episode(&self) -> anyhow::Result<Option<Episode>> {
        let row = sqlx::query_as::<_, EpisodeRow>(
            r#"
            SELECT id, title, full_script, status, error, created_at
            FROM episodes
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|err| tracing::error!(error = ?err, "Failed to fetch latest episode"))
        .context("Failed to fetch latest episode")?;

        row.map(Episode::try_from).transpose()
    }

    async fn episode_stories(&self, episode_id: Uuid) -> anyhow::Result<Vec<Story>> {
        let rows = sqlx::query_as::<_, StoryRow>(
            r#"
            SELECT id, episode_id, position, headline, script, audio_url
            FROM stories
            WHERE episode_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(episode_id)
        .fetch_all(&self.pool)
        .await
        .inspect_err(|err| {
            tracing::error!(error = ?err, episode_id = %episode_id, "Failed to fetch stories")
        })
        .context("Failed to fetch stories")?;

        Ok(rows.into_iter().map(Story::from).collect())
    }
}
