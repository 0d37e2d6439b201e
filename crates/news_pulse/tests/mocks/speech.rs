use std::sync::{Arc, Mutex};

use news_pulse::speech::SpeechSynthesizer;

#[derive(Clone)]
pub struct MockSpeech {
    fail_with: Option<String>,
    fail_when_contains: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self {
            fail_with: None,
            fail_when_contains: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new()
        }
    }

    /// Fails only for inputs containing `marker`.
    pub fn failing_when(marker: &str) -> Self {
        Self {
            fail_when_contains: Some(marker.to_string()),
            ..Self::new()
        }
    }
}

impl SpeechSynthesizer for MockSpeech {
    const TTS_MODEL: &'static str = "mock-tts";
    const MAX_INPUT_CHARS: usize = 4000;
    type Error = anyhow::Error;

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, Self::Error> {
        self.calls.lock().unwrap().push(text.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        if let Some(ref marker) = self.fail_when_contains {
            if text.contains(marker) {
                return Err(anyhow::anyhow!("synthesis failed for marked input"));
            }
        }
        // Fake MP3 payload whose length tracks the input text.
        Ok(vec![0xAB; text.len().max(1)])
    }
}
