//! # DataStore Module
//!
//! Persistence layer for podcast episodes and their stories, plus blob
//! storage for finished audio.
//!
//! The module uses sqlx for database operations and exposes trait
//! abstractions so the pipeline crate can be tested against in-memory
//! fakes.

mod datastore;
mod domain;
mod storage;

pub use datastore::postgres::PgDataStore;
pub use datastore::DataStore;
pub use domain::{Episode, EpisodeStatus, Story};
pub use storage::{AudioStorage, LocalAudioStorage};
