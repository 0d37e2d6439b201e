//! Agentic tool-use loop driving headline curation and script writing.
//!
//! The model is given a single `search_news` tool. Each loop iteration
//! executes every tool call in the reply, feeds the results back as one
//! user turn, and re-invokes the model until it stops asking for tools or
//! the iteration ceiling is reached.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::cache::{Clock, HeadlineSource, SystemClock};
use crate::error::Error;
use crate::headlines::parse_headlines;
use crate::search::{format_search_results, NewsSearch};

use super::generator::{
    ContentBlock, GenerationRequest, GenerationResponse, Generator, Message, StopReason,
    ToolDefinition,
};

const SEARCH_TOOL_NAME: &str = "search_news";

const HEADLINE_SYSTEM_PROMPT: &str = include_str!("prompts/headline_system.txt");
const SCRIPT_SYSTEM_PROMPT: &str = include_str!("prompts/script_system.txt");

/// Iteration ceiling for the headline curation loop.
pub const CURATION_MAX_LOOPS: usize = 10;

/// Iteration ceiling for a single story script loop.
pub const SCRIPT_MAX_LOOPS: usize = 5;

const CURATION_MAX_TOKENS: u32 = 4096;
const SCRIPT_MAX_TOKENS: u32 = 2048;

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        name: SEARCH_TOOL_NAME.to_string(),
        description: "Search for recent AI and technology news headlines. Returns titles \
                      and brief descriptions. Use this to find news from the past week. You \
                      can call this multiple times with different queries to find diverse \
                      stories."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for finding news (e.g., \"OpenAI GPT announcement\", \"AI startup funding\", \"NVIDIA AI chips\")"
                },
                "count": {
                    "type": "number",
                    "description": "Number of results to return (default 20, max 20)"
                }
            },
            "required": ["query"]
        }),
    }
}

/// One unit of agentic work: prompts plus loop limits.
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_iterations: usize,
    pub max_tokens: u32,
}

/// Runs the tool-use loop until the model produces a final text reply.
///
/// Tool calls within one reply are executed in order and answered in the
/// same order. Returns the trimmed text of the final reply, or
/// [`Error::EmptyCompletion`] when the reply carries no text.
#[tracing::instrument(skip_all, fields(max_iterations = task.max_iterations))]
pub async fn run_agentic_loop<G, S>(
    generator: &G,
    search: &S,
    task: AgentTask,
) -> Result<String, Error>
where
    G: Generator + Send + Sync,
    S: NewsSearch + Send + Sync,
{
    let tools = vec![search_tool()];
    let mut messages = vec![Message::user(task.user_prompt)];

    let mut response = invoke(generator, &task.system_prompt, &messages, &tools, task.max_tokens)
        .await?;

    let mut loop_count = 0;
    while response.stop_reason == StopReason::ToolUse && loop_count < task.max_iterations {
        loop_count += 1;
        tracing::debug!(loop_count, "Executing tool calls");

        let mut tool_results = Vec::new();
        for (id, name, input) in response.tool_uses() {
            if name != SEARCH_TOOL_NAME {
                continue;
            }
            let query = input
                .get("query")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let count = input
                .get("count")
                .and_then(|v| v.as_u64())
                .map(|c| c as usize)
                .unwrap_or(S::MAX_RESULTS);

            let results = search.search(&query, count).await;
            tracing::debug!(query, results = results.len(), "Search tool executed");

            tool_results.push(ContentBlock::ToolResult {
                tool_use_id: id.to_string(),
                content: format_search_results(&results),
            });
        }

        messages.push(Message::assistant(response.content));
        messages.push(Message::tool_results(tool_results));

        response = invoke(generator, &task.system_prompt, &messages, &tools, task.max_tokens)
            .await?;
    }

    response
        .text()
        .map(|text| text.trim().to_string())
        .ok_or(Error::EmptyCompletion)
}

async fn invoke<G: Generator>(
    generator: &G,
    system: &str,
    messages: &[Message],
    tools: &[ToolDefinition],
    max_tokens: u32,
) -> Result<GenerationResponse, Error> {
    generator
        .generate(GenerationRequest {
            system: system.to_string(),
            messages: messages.to_vec(),
            tools: tools.to_vec(),
            max_tokens,
        })
        .await
        .map_err(|e| Error::Generation(format!("{e:?}")))
}

/// Curates up to 20 headlines for `today` via the search tool.
#[tracing::instrument(skip(generator, search))]
pub async fn curate_headlines<G, S>(
    generator: &G,
    search: &S,
    today: DateTime<Utc>,
) -> Result<Vec<String>, Error>
where
    G: Generator + Send + Sync,
    S: NewsSearch + Send + Sync,
{
    let date_str = today.format("%A, %B %-d, %Y").to_string();
    let user_prompt = format!(
        "Today is {date_str}. Use the search_news tool to find the most important AI and \
         technology news headlines from the past 7 days.\n\n\
         Do multiple searches to cover different topics - for example:\n\
         1. Search for major AI announcements\n\
         2. Search for AI startup news and funding\n\
         3. Search for AI model releases\n\
         4. Search for any other relevant AI news\n\n\
         After collecting search results, curate exactly 20 of the BEST headlines that fit \
         our criteria.\n\n\
         IMPORTANT: Each headline must be a SPECIFIC news event with a company name, action, \
         and date. Do NOT return category names or source names.\n\n\
         Format each headline like this:\n\
         1. **OpenAI releases GPT-5 with advanced reasoning capabilities** (January 2, 2026)\n\n\
         Generate exactly 20 headlines, numbered 1-20, each starting with ** and ending with \
         a date in parentheses."
    );

    let text = run_agentic_loop(
        generator,
        search,
        AgentTask {
            system_prompt: HEADLINE_SYSTEM_PROMPT.to_string(),
            user_prompt,
            max_iterations: CURATION_MAX_LOOPS,
            max_tokens: CURATION_MAX_TOKENS,
        },
    )
    .await?;

    let headlines = parse_headlines(&text);
    tracing::info!(headlines = headlines.len(), "Curated headlines");

    if headlines.is_empty() {
        return Err(Error::NoHeadlines);
    }
    Ok(headlines)
}

/// Writes the spoken script for a single headline.
#[tracing::instrument(skip(generator, search, headline))]
pub async fn write_story_script<G, S>(
    generator: &G,
    search: &S,
    headline: &str,
) -> Result<String, Error>
where
    G: Generator + Send + Sync,
    S: NewsSearch + Send + Sync,
{
    let user_prompt = format!(
        "Write a podcast segment (300-450 words) about this AI/tech news story:\n\n\
         {headline}\n\n\
         IMPORTANT:\n\
         1. FIRST use the search_news tool to look up this headline and get accurate, \
         current details\n\
         2. THEN write ONLY the spoken words. Do not write any meta-commentary like \
         \"Looking at the results...\" or \"Let me clarify...\".\n   \
         Just write what the podcast host would actually say out loud.\n\n\
         Include:\n\
         - Key details and context about the story\n\
         - Specific numbers, amounts, or technical specifications\n\
         - Why this matters for AI builders and entrepreneurs\n\
         - A smooth transition phrase at the end to lead into the next story\n\n\
         Write only the spoken script text, ready to be read aloud. Start immediately with \
         the content."
    );

    run_agentic_loop(
        generator,
        search,
        AgentTask {
            system_prompt: SCRIPT_SYSTEM_PROMPT.to_string(),
            user_prompt,
            max_iterations: SCRIPT_MAX_LOOPS,
            max_tokens: SCRIPT_MAX_TOKENS,
        },
    )
    .await
}

/// Fallback segment spoken when a story's script generation fails.
pub fn placeholder_script(headline: &str) -> String {
    format!(
        "I'm sorry, but I encountered an issue generating the detailed script for this \
         story: {headline}. Let me move on to the next story."
    )
}

/// Writes scripts for each headline in order, substituting a spoken
/// apology for stories that fail. Returns the per-story scripts and the
/// full script joined with blank lines.
#[tracing::instrument(skip(generator, search, headlines), fields(stories = headlines.len()))]
pub async fn generate_scripts<G, S>(
    generator: &G,
    search: &S,
    headlines: &[String],
    delay: Duration,
) -> (Vec<String>, String)
where
    G: Generator + Send + Sync,
    S: NewsSearch + Send + Sync,
{
    let mut scripts = Vec::with_capacity(headlines.len());

    for (i, headline) in headlines.iter().enumerate() {
        tracing::info!(story = i + 1, total = headlines.len(), "Writing story script");

        let script = match write_story_script(generator, search, headline).await {
            Ok(script) => script,
            Err(e) => {
                tracing::error!(error = ?e, headline, "Script generation failed, using fallback");
                placeholder_script(headline)
            }
        };
        scripts.push(script);

        if i + 1 < headlines.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    let full_script = scripts.join("\n\n");
    (scripts, full_script)
}

/// [`HeadlineSource`] backed by the curation loop, for the headline cache.
pub struct AgentCurator<G, S, C = SystemClock> {
    generator: G,
    search: S,
    clock: C,
}

impl<G, S> AgentCurator<G, S, SystemClock>
where
    G: Generator + Send + Sync,
    S: NewsSearch + Send + Sync,
{
    pub fn new(generator: G, search: S) -> Self {
        Self::with_clock(generator, search, SystemClock)
    }
}

impl<G, S, C> AgentCurator<G, S, C>
where
    G: Generator + Send + Sync,
    S: NewsSearch + Send + Sync,
    C: Clock,
{
    pub fn with_clock(generator: G, search: S, clock: C) -> Self {
        Self {
            generator,
            search,
            clock,
        }
    }
}

impl<G, S, C> HeadlineSource for AgentCurator<G, S, C>
where
    G: Generator + Send + Sync,
    S: NewsSearch + Send + Sync,
    C: Clock,
{
    async fn fetch_headlines(&self) -> anyhow::Result<Vec<String>> {
        let headlines =
            curate_headlines(&self.generator, &self.search, self.clock.now()).await?;
        Ok(headlines)
    }
}
