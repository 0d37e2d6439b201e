//! Text-to-speech synthesis and script chunking.

use std::fmt::Debug;
use std::future::Future;

pub mod openai;

pub use openai::{OpenAiSpeech, SpeechError};

/// Character budget per synthesis request.
pub const TTS_CHUNK_BUDGET: usize = 4000;

/// Text-to-speech backend producing encoded audio bytes.
pub trait SpeechSynthesizer {
    const TTS_MODEL: &'static str;
    const MAX_INPUT_CHARS: usize;
    type Error: Debug;

    fn synthesize(&self, text: &str) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}

impl<T: SpeechSynthesizer + Send + Sync> SpeechSynthesizer for &T {
    const TTS_MODEL: &'static str = T::TTS_MODEL;
    const MAX_INPUT_CHARS: usize = T::MAX_INPUT_CHARS;
    type Error = T::Error;

    fn synthesize(&self, text: &str) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send {
        (*self).synthesize(text)
    }
}

/// Splits a script into chunks of at most `max_chunk_len` bytes.
///
/// Each split prefers a sentence boundary (`.`, `!`, `?`) when one falls in
/// the last 30% of the window, so chunks end on natural pauses. Chunks are
/// trimmed and empty ones dropped; concatenating the chunks reproduces the
/// script up to surrounding whitespace.
pub fn chunk_script(script: &str, max_chunk_len: usize) -> Vec<String> {
    if max_chunk_len == 0 {
        return Vec::new();
    }

    let bytes = script.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        let mut end = (start + max_chunk_len).min(bytes.len());
        while end < bytes.len() && !script.is_char_boundary(end) {
            end -= 1;
        }
        // A budget smaller than one character still has to advance.
        if end <= start {
            end = start + 1;
            while end < bytes.len() && !script.is_char_boundary(end) {
                end += 1;
            }
        }

        if end < bytes.len() {
            // Look for the last sentence terminator in the window; accept
            // it only when it lands past 70% of the window.
            let window = &bytes[start..end];
            if let Some(pos) = window
                .iter()
                .rposition(|b| matches!(b, b'.' | b'!' | b'?'))
            {
                if pos + 1 > max_chunk_len * 7 / 10 {
                    end = start + pos + 1;
                }
            }
        }

        let chunk = script[start..end].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        start = end;
    }

    chunks
}
