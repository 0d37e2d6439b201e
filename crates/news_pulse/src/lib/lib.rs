mod error;
mod llm;
mod producer;
pub mod audio;
pub mod cache;
pub mod headlines;
pub mod retry;
pub mod search;
pub mod server;
pub mod speech;
pub mod tracing;

pub use error::Error;
pub use llm::agent::{
    curate_headlines, generate_scripts, run_agentic_loop, write_story_script, AgentCurator,
    AgentTask, CURATION_MAX_LOOPS, SCRIPT_MAX_LOOPS,
};
pub use llm::anthropic::{AnthropicClient, AnthropicError};
pub use llm::generator::{
    ContentBlock, GenerationRequest, GenerationResponse, Generator, Message, Role, StopReason,
    ToolDefinition,
};
pub use producer::{builder::EpisodeProducerBuilder, EpisodeProducer};
