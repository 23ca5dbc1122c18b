use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::fault::{apology_for, AssistError};
use crate::prompt::{build_prompt, MAX_TOKENS, TEMPERATURE};
use crate::reply::extract_reply_text;
use crate::runtime::{ChatRuntime, InvokeOptions};

/// Answers questions against an inference runtime, one at a time.
///
/// Every call produces at most one reply string: either the normalized
/// gateway reply or an apology describing what went wrong. Calls that
/// should produce nothing at all (blank input, a question already in
/// flight) return `None`.
pub struct Assistant {
    runtime: Arc<dyn ChatRuntime>,
    model: String,
    in_flight: AtomicBool,
}

impl Assistant {
    pub fn new(runtime: Arc<dyn ChatRuntime>, model: &str) -> Self {
        Self {
            runtime,
            model: model.to_string(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Answer one question. `ready` is the monitor's latest readiness
    /// state; when it is false the runtime is never invoked and the reply
    /// is an apology asking the user to wait.
    pub async fn answer(&self, user_text: &str, ready: bool) -> Option<String> {
        let question = user_text.trim();
        if question.is_empty() {
            return None;
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("dropped a question, another one is still in flight");
            return None;
        }
        // Clears the flag on every exit path, panics included.
        let _guard = InFlightGuard(&self.in_flight);

        Some(match self.request(question, ready).await {
            Ok(text) => text,
            Err(e) => apology_for(&e),
        })
    }

    async fn request(&self, question: &str, ready: bool) -> Result<String, AssistError> {
        // A false readiness flag skips the probe entirely.
        if !ready || !self.runtime.is_available().await {
            return Err(AssistError::Unavailable);
        }

        let options = InvokeOptions {
            model: self.model.clone(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let reply = self.runtime.invoke(&build_prompt(question), &options).await?;
        Ok(extract_reply_text(&reply))
    }

    /// Whether a question is currently in flight
    pub fn busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
