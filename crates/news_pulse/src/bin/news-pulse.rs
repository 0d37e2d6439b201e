use std::{path::PathBuf, str::FromStr, sync::Arc};

use apalis::{
    layers::{retry::RetryPolicy, sentry::SentryLayer},
    prelude::*,
};
use apalis_cron::{CronStream, Tick};
use clap::{Parser, Subcommand};
use cron::Schedule;
use news_datastore::{LocalAudioStorage, PgDataStore};
use news_pulse::{
    audio::AudioCombiner,
    cache::HeadlineCache,
    curate_headlines,
    search::brave::BraveSearch,
    server::{serve, AppState},
    speech::OpenAiSpeech,
    tracing::init_tracing_subscriber,
    AgentCurator, AnthropicClient, EpisodeProducerBuilder,
};

#[derive(Parser)]
#[command(name = "news-pulse", about = "AI news podcast pipeline")]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY")]
    anthropic_key: String,

    /// Brave Search API key
    #[arg(long, env = "BRAVE_API_KEY")]
    brave_key: String,

    /// OpenAI API key (text-to-speech)
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_key: String,

    /// Working directory for audio scratch files
    #[arg(long, default_value = "/var/tmp/news-pulse")]
    workdir: PathBuf,

    /// Root directory for published story audio
    #[arg(long, env = "AUDIO_ROOT", default_value = "/var/lib/news-pulse/audio")]
    audio_root: PathBuf,

    /// Public base URL for published audio
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:3000/audio")]
    public_base_url: String,

    /// Persist the headline cache to this file
    #[arg(long, env = "HEADLINE_CACHE_FILE")]
    cache_file: Option<PathBuf>,

    /// Maximum stories per episode
    #[arg(long, env = "MAX_STORIES_PER_EPISODE", default_value = "5")]
    max_stories: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value = "3000")]
        port: u16,
    },
    /// Refresh the headline cache once and exit
    Refresh,
    /// Produce one episode and exit
    Generate {
        /// Number of stories to produce
        #[arg(long)]
        stories: Option<usize>,
    },
    /// Start the cron scheduler for daily episode production
    Cron {
        /// Cron schedule expression
        #[arg(long, env = "CRON_SCHEDULE", default_value = "0 0 11 * * *")]
        schedule: String,
    },
}

#[derive(Clone)]
struct Config {
    db_url: String,
    anthropic_key: String,
    brave_key: String,
    openai_key: String,
    workdir: PathBuf,
    audio_root: PathBuf,
    public_base_url: String,
    cache_file: Option<PathBuf>,
    max_stories: usize,
}

async fn run_generate(config: &Config, stories: Option<usize>) -> anyhow::Result<()> {
    let store = PgDataStore::init(&config.db_url).await?;
    let generator = AnthropicClient::new(&config.anthropic_key);
    let search = BraveSearch::new(&config.brave_key);
    let speech = OpenAiSpeech::new(&config.openai_key);
    let storage = LocalAudioStorage::new(&config.audio_root, &config.public_base_url);

    let headlines = curate_headlines(&generator, &search, chrono::Utc::now()).await?;

    let producer = EpisodeProducerBuilder::new(&config.workdir)
        .store(store)
        .generator(generator)
        .search(search)
        .speech(speech)
        .storage(storage)
        .max_stories(stories.unwrap_or(config.max_stories))
        .build();

    let episode = producer.run(&headlines).await?;
    tracing::info!(episode = %episode.id, "Episode produced");

    Ok(())
}

async fn run_refresh(config: &Config) -> anyhow::Result<()> {
    let generator = AnthropicClient::new(&config.anthropic_key);
    let search = BraveSearch::new(&config.brave_key);

    let mut cache = HeadlineCache::new(AgentCurator::new(generator, search));
    if let Some(path) = &config.cache_file {
        cache = cache.with_cache_file(path);
    }
    let cache = Arc::new(cache);

    let view = cache.force_refresh().await?;
    tracing::info!(headlines = view.headlines.len(), "Headline cache refreshed");

    Ok(())
}

async fn run_serve(config: &Config, port: u16) -> anyhow::Result<()> {
    let store = PgDataStore::init(&config.db_url).await?;
    let generator = AnthropicClient::new(&config.anthropic_key);
    let search = BraveSearch::new(&config.brave_key);
    let speech = OpenAiSpeech::new(&config.openai_key);

    let mut cache = HeadlineCache::new(AgentCurator::new(generator.clone(), search.clone()));
    if let Some(path) = &config.cache_file {
        cache = cache.with_cache_file(path);
    }

    let state = AppState {
        cache: Arc::new(cache),
        generator: Arc::new(generator),
        search: Arc::new(search),
        speech: Arc::new(speech),
        combiner: Arc::new(AudioCombiner::detect(&config.workdir)),
        store: Arc::new(store),
    };

    serve(&format!("0.0.0.0:{port}"), state).await
}

async fn handle_tick(_tick: Tick, config: Data<Config>) -> anyhow::Result<()> {
    tracing::info!(
        max_stories = config.max_stories,
        "Running scheduled episode production..."
    );
    run_generate(&config, None).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = Config {
        db_url: cli.database_url,
        anthropic_key: cli.anthropic_key,
        brave_key: cli.brave_key,
        openai_key: cli.openai_key,
        workdir: cli.workdir,
        audio_root: cli.audio_root,
        public_base_url: cli.public_base_url,
        cache_file: cli.cache_file,
        max_stories: cli.max_stories,
    };

    match cli.command {
        Command::Serve { port } => {
            tracing::info!(port, "Starting API server...");
            run_serve(&config, port).await?;
        }
        Command::Refresh => {
            tracing::info!("Refreshing headline cache once...");
            run_refresh(&config).await?;
        }
        Command::Generate { stories } => {
            tracing::info!("Producing one episode...");
            run_generate(&config, stories).await?;
        }
        Command::Cron { schedule } => {
            tracing::info!(%schedule, "Starting cron scheduler...");
            let schedule = Schedule::from_str(&schedule)?;

            let worker = WorkerBuilder::new("news-pulse-cron")
                .backend(CronStream::new(schedule))
                .retry(RetryPolicy::retries(3))
                .layer(SentryLayer::new())
                .data(config)
                .build(handle_tick);

            worker.run().await?;
        }
    }

    Ok(())
}
