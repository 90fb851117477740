//! Scripted [`GenerationService`] double for tests across the workspace.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::generation::GenerationService;

/// Replays a fixed sequence of replies, one per call. Once the script runs
/// out, the last reply repeats.
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    prompts: Mutex<Vec<String>>,
    delay: Duration,
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Unavailable,
    Timeout,
    Rejected,
}

impl Reply {
    fn into_result(self) -> Result<String, GenerationError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Unavailable => Err(GenerationError::ServiceUnavailable("connection refused".into())),
            Self::Timeout => Err(GenerationError::Timeout { secs: 60 }),
            Self::Rejected => Err(GenerationError::Api {
                status: 400,
                message: "unknown model".into(),
            }),
        }
    }
}

impl ScriptedGenerator {
    fn with_script(script: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Always answers `text`.
    #[must_use]
    pub fn answering(text: impl Into<String>) -> Self {
        Self::with_script(vec![Reply::Text(text.into())])
    }

    /// Always unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::with_script(vec![Reply::Unavailable])
    }

    /// Always rejects the request with a non-transient error.
    #[must_use]
    pub fn rejecting() -> Self {
        Self::with_script(vec![Reply::Rejected])
    }

    /// Times out `failures` times, then answers `text`.
    #[must_use]
    pub fn flaky(failures: usize, text: impl Into<String>) -> Self {
        let mut script = vec![Reply::Timeout; failures];
        script.push(Reply::Text(text.into()));
        Self::with_script(script)
    }

    /// Sleep before every reply.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let reply = match next {
            Some(reply) => {
                if let Ok(mut last) = self.last.lock() {
                    *last = Some(reply.clone());
                }
                reply
            }
            None => self
                .last
                .lock()
                .ok()
                .and_then(|l| l.clone())
                .unwrap_or(Reply::Unavailable),
        };
        reply.into_result()
    }
}
