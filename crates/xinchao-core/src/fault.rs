//! Error types and the user-facing apology text built from them

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::reply::OBJECT_OBJECT;

/// Shown when a fault payload carries no usable description
pub const FALLBACK_FAULT: &str = "Đã xảy ra lỗi khi kết nối với trợ lý AI.";

/// Detail used when the runtime was never reached
pub const NOT_READY_DETAIL: &str = "Trợ lý chưa sẵn sàng, vui lòng đợi trong giây lát.";

/// Fault details longer than this are cut before display
pub const MAX_FAULT_CHARS: usize = 200;

/// Why a question could not be answered
#[derive(Debug, Error)]
pub enum AssistError {
    /// The runtime was not ready or the probe failed
    #[error("assistant runtime is not available")]
    Unavailable,
    /// The gateway was reached but the call failed; the payload is whatever
    /// it sent back
    #[error("assistant runtime returned a fault")]
    Backend(Value),
}

/// Full apology message shown in the conversation for a failed question
pub fn apology_for(error: &AssistError) -> String {
    let detail = match error {
        AssistError::Unavailable => NOT_READY_DETAIL.to_string(),
        AssistError::Backend(payload) => fault_detail(payload),
    };
    apology(&ellipsize(&detail, MAX_FAULT_CHARS))
}

fn apology(detail: &str) -> String {
    format!("Xin lỗi, đã xảy ra lỗi: {detail}\nVui lòng thử lại hoặc khởi động lại trợ lý.")
}

/// Pull a human-readable description out of a fault payload.
///
/// Gateways wrap errors every which way; known keys are probed first, then
/// scalar payloads are stringified, then object properties scanned. Each
/// step rejects blanks and the `[object Object]` artifact. This probe is
/// deliberately shallow; a description nested inside `{"error": {...}}`
/// falls through to [`FALLBACK_FAULT`].
pub fn fault_detail(payload: &Value) -> String {
    if let Value::String(s) = payload {
        return s.clone();
    }

    if let Value::Object(map) = payload {
        for key in ["message", "error", "msg", "description"] {
            if let Some(s) = map.get(key).and_then(displayable_str) {
                return s.to_string();
            }
        }
    }

    match payload {
        // Scalars stringify cleanly; objects and arrays would not, so they
        // get a property scan instead.
        Value::Number(_) | Value::Bool(_) => return payload.to_string(),
        Value::Object(map) => {
            if let Some(s) = map.values().find_map(displayable_str) {
                debug!("fault layout unknown, used a property scan");
                return s.to_string();
            }
        }
        Value::Array(items) => {
            if let Some(s) = items.iter().find_map(displayable_str) {
                debug!("fault layout unknown, used a property scan");
                return s.to_string();
            }
        }
        _ => {}
    }

    debug!("fault payload could not be decoded, showing the fallback text");
    FALLBACK_FAULT.to_string()
}

/// Trimmed string view, rejecting blanks and the stringified-object artifact
fn displayable_str(value: &Value) -> Option<&str> {
    let s = value.as_str()?.trim();
    (!s.is_empty() && s != OBJECT_OBJECT).then_some(s)
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an
/// ellipsis. Counts characters, not bytes; Vietnamese text is multibyte.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
