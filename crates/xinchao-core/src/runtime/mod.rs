mod client;
mod launcher;
mod monitor;

pub use client::GatewayClient;
pub use launcher::{RuntimeLauncher, ServeCommand};
pub use monitor::{BOOTSTRAP_GRACE, POLL_INTERVAL, ReadyMonitor};

use async_trait::async_trait;
use serde_json::Value;

use crate::fault::AssistError;

/// Per-request knobs passed to [`ChatRuntime::invoke`]
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The inference runtime as the assistant sees it: a liveness probe and a
/// single-shot chat call. [`GatewayClient`] is the HTTP implementation;
/// tests substitute their own.
#[async_trait]
pub trait ChatRuntime: Send + Sync {
    /// Whether the runtime is reachable right now. Probes never error;
    /// anything that goes wrong reads as "not available".
    async fn is_available(&self) -> bool;

    /// Send one prompt and return the reply body as raw JSON. Decoding is
    /// left to the caller because gateways disagree on the envelope.
    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<Value, AssistError>;
}
