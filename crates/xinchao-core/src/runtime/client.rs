use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::fault::{ellipsize, AssistError, MAX_FAULT_CHARS};
use crate::runtime::{ChatRuntime, InvokeOptions};

/// Liveness probes give up quickly; they run on a 100ms cadence while the
/// runtime boots and must not pile up.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatTurn>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatTurn {
    role: String,
    content: String,
}

/// HTTP client for an OpenAI-compatible inference gateway (Ollama,
/// LM Studio, llama.cpp server).
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatRuntime for GatewayClient {
    async fn is_available(&self) -> bool {
        let probe = match Client::builder().timeout(PROBE_TIMEOUT).build() {
            Ok(client) => client,
            Err(_) => return false,
        };

        match probe.get(self.endpoint("/v1/models")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<Value, AssistError> {
        let request = ChatRequest {
            model: options.model.clone(),
            messages: vec![ChatTurn {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        // No timeout here: local models can legitimately take minutes on
        // first load, and a stalled call surfaces as "thinking" in the UI.
        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistError::Backend(Value::String(e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AssistError::Backend(Value::String(e.to_string())))?;

        if !status.is_success() {
            // Pass a JSON error body through untouched so its fields can
            // be probed; summarize anything else.
            let payload = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| {
                Value::String(format!(
                    "Gateway request failed with status {status}: {}",
                    ellipsize(&text, MAX_FAULT_CHARS)
                ))
            });
            return Err(AssistError::Backend(payload));
        }

        // A non-JSON body is treated as the reply text itself.
        Ok(serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text)))
    }
}
