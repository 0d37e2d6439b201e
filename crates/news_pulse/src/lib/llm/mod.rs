pub mod agent;
pub mod anthropic;
pub mod generator;
