#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Generation provider error: {0}")]
    Generation(String),
    #[error("No text content in generation response")]
    EmptyCompletion,
    #[error("No headlines parsed from curation response")]
    NoHeadlines,
}
