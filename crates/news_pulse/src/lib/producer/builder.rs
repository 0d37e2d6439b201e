use std::path::PathBuf;
use std::time::Duration;

use news_datastore::{AudioStorage, DataStore};

use crate::{
    audio::AudioCombiner, search::NewsSearch, speech::SpeechSynthesizer, EpisodeProducer,
    Generator,
};

pub struct EpisodeProducerBuilder<D = (), G = (), S = (), T = (), A = ()> {
    workdir: PathBuf,
    store: D,
    generator: G,
    search: S,
    speech: T,
    storage: A,
    combiner: Option<AudioCombiner>,
    max_stories: usize,
    story_delay: Duration,
    chunk_delay: Duration,
}

impl EpisodeProducerBuilder {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            store: (),
            generator: (),
            search: (),
            speech: (),
            storage: (),
            combiner: None,
            max_stories: 5,
            story_delay: Duration::from_secs(1),
            chunk_delay: Duration::from_millis(500),
        }
    }
}

impl<D, G, S, T, A> EpisodeProducerBuilder<D, G, S, T, A> {
    pub fn store<D2: DataStore + Send + Sync + 'static>(
        self,
        store: D2,
    ) -> EpisodeProducerBuilder<D2, G, S, T, A> {
        EpisodeProducerBuilder {
            workdir: self.workdir,
            store,
            generator: self.generator,
            search: self.search,
            speech: self.speech,
            storage: self.storage,
            combiner: self.combiner,
            max_stories: self.max_stories,
            story_delay: self.story_delay,
            chunk_delay: self.chunk_delay,
        }
    }

    pub fn generator<G2: Generator + Send + Sync + 'static>(
        self,
        generator: G2,
    ) -> EpisodeProducerBuilder<D, G2, S, T, A> {
        EpisodeProducerBuilder {
            workdir: self.workdir,
            store: self.store,
            generator,
            search: self.search,
            speech: self.speech,
            storage: self.storage,
            combiner: self.combiner,
            max_stories: self.max_stories,
            story_delay: self.story_delay,
            chunk_delay: self.chunk_delay,
        }
    }

    pub fn search<S2: NewsSearch + Send + Sync + 'static>(
        self,
        search: S2,
    ) -> EpisodeProducerBuilder<D, G, S2, T, A> {
        EpisodeProducerBuilder {
            workdir: self.workdir,
            store: self.store,
            generator: self.generator,
            search,
            speech: self.speech,
            storage: self.storage,
            combiner: self.combiner,
            max_stories: self.max_stories,
            story_delay: self.story_delay,
            chunk_delay: self.chunk_delay,
        }
    }

    pub fn speech<T2: SpeechSynthesizer + Send + Sync + 'static>(
        self,
        speech: T2,
    ) -> EpisodeProducerBuilder<D, G, S, T2, A> {
        EpisodeProducerBuilder {
            workdir: self.workdir,
            store: self.store,
            generator: self.generator,
            search: self.search,
            speech,
            storage: self.storage,
            combiner: self.combiner,
            max_stories: self.max_stories,
            story_delay: self.story_delay,
            chunk_delay: self.chunk_delay,
        }
    }

    pub fn storage<A2: AudioStorage + Send + Sync + 'static>(
        self,
        storage: A2,
    ) -> EpisodeProducerBuilder<D, G, S, T, A2> {
        EpisodeProducerBuilder {
            workdir: self.workdir,
            store: self.store,
            generator: self.generator,
            search: self.search,
            speech: self.speech,
            storage,
            combiner: self.combiner,
            max_stories: self.max_stories,
            story_delay: self.story_delay,
            chunk_delay: self.chunk_delay,
        }
    }

    pub fn combiner(mut self, combiner: AudioCombiner) -> Self {
        self.combiner = Some(combiner);
        self
    }

    pub fn max_stories(mut self, max_stories: usize) -> Self {
        self.max_stories = max_stories;
        self
    }

    pub fn story_delay(mut self, story_delay: Duration) -> Self {
        self.story_delay = story_delay;
        self
    }

    pub fn chunk_delay(mut self, chunk_delay: Duration) -> Self {
        self.chunk_delay = chunk_delay;
        self
    }
}

impl<D, G, S, T, A> EpisodeProducerBuilder<D, G, S, T, A>
where
    D: DataStore + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
    S: NewsSearch + Send + Sync + 'static,
    T: SpeechSynthesizer + Send + Sync + 'static,
    A: AudioStorage + Send + Sync + 'static,
{
    pub fn build(self) -> EpisodeProducer<D, G, S, T, A> {
        let combiner = self
            .combiner
            .unwrap_or_else(|| AudioCombiner::detect(&self.workdir));
        EpisodeProducer {
            store: self.store,
            generator: self.generator,
            search: self.search,
            speech: self.speech,
            storage: self.storage,
            combiner,
            max_stories: self.max_stories,
            story_delay: self.story_delay,
            chunk_delay: self.chunk_delay,
        }
    }
}
