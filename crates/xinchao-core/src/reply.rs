//! Reply normalization for local inference gateways
//!
//! Ollama, LM Studio and llama.cpp all speak "OpenAI-compatible" HTTP but
//! disagree on the reply envelope, and proxy layers in front of them add
//! more variants. This module turns whatever JSON came back into one
//! displayable string, falling back to a canned reply when nothing usable
//! can be found.

use serde_json::Value;
use tracing::debug;

/// Shown when the gateway reply carries no usable text
pub const FALLBACK_REPLY: &str =
    "Xin lỗi, tôi không thể trả lời câu hỏi này, vui lòng thử lại sau.";

/// JavaScript upstreams stringify objects to this; never show it to the user
pub(crate) const OBJECT_OBJECT: &str = "[object Object]";

/// Recognized top-level layouts of a gateway reply. Borrowed views into the
/// parsed JSON; classification never allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyShape<'a> {
    /// The whole body is one string
    PlainText(&'a str),
    /// OpenAI-style `choices` array
    ChoiceList(&'a [Value]),
    /// A known key (`text`, `message`, `content`, `data`, `result`) holds the reply
    KeyedField(&'a str),
    /// None of the layouts we know
    Unknown,
}

/// Classify the top-level layout of a reply. Direct keys win over the
/// `choices` array, which wins over the `data`/`result` tail keys.
pub fn classify(value: &Value) -> ReplyShape<'_> {
    if let Value::String(s) = value {
        return ReplyShape::PlainText(s);
    }

    if let Value::Object(map) = value {
        for key in ["text", "message", "content"] {
            if let Some(s) = map.get(key).and_then(non_empty_str) {
                return ReplyShape::KeyedField(s);
            }
        }

        if let Some(Value::Array(choices)) = map.get("choices") {
            return ReplyShape::ChoiceList(choices);
        }

        for key in ["data", "result"] {
            if let Some(s) = map.get(key).and_then(non_empty_str) {
                return ReplyShape::KeyedField(s);
            }
        }
    }

    ReplyShape::Unknown
}

/// Extract the displayable reply text from a gateway response body.
///
/// Vacant values (null, false, zero, empty string) and undecodable
/// structures yield [`FALLBACK_REPLY`]; everything else is returned
/// trimmed.
pub fn extract_reply_text(value: &Value) -> String {
    if is_vacant(value) {
        return FALLBACK_REPLY.to_string();
    }

    match classify(value) {
        ReplyShape::PlainText(s) => s.trim().to_string(),
        ReplyShape::KeyedField(s) => s.to_string(),
        ReplyShape::ChoiceList(choices) => first_choice_text(choices)
            .or_else(|| keyed_tail(value))
            .map(|s| s.to_string())
            .unwrap_or_else(|| scan_fallback(value)),
        ReplyShape::Unknown => scan_fallback(value),
    }
}

/// Trimmed string view, or None for non-strings and blanks
fn non_empty_str(value: &Value) -> Option<&str> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then_some(s)
}

/// Text of the first choice: chat completion, then legacy completion,
/// then a streaming chunk that was returned whole.
fn first_choice_text(choices: &[Value]) -> Option<&str> {
    let first = choices.first()?;
    first
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(non_empty_str)
        .or_else(|| first.get("text").and_then(non_empty_str))
        .or_else(|| {
            first
                .get("delta")
                .and_then(|d| d.get("content"))
                .and_then(non_empty_str)
        })
}

fn keyed_tail(value: &Value) -> Option<&str> {
    value
        .get("data")
        .and_then(non_empty_str)
        .or_else(|| value.get("result").and_then(non_empty_str))
}

/// Values the gateway treats as "no reply at all"
fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// First non-empty string among the direct children
fn scan_strings(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.values().find_map(non_empty_str),
        Value::Array(items) => items.iter().find_map(non_empty_str),
        _ => None,
    }
}

/// Same scan, one level further down. Deliberately not recursive; anything
/// buried deeper than that is not a reply we can trust.
fn scan_strings_deep(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.values().find_map(scan_strings),
        Value::Array(items) => items.iter().find_map(scan_strings),
        _ => None,
    }
}

/// Last-resort extraction for layouts [`classify`] doesn't know
fn scan_fallback(value: &Value) -> String {
    if let Some(s) = scan_strings(value) {
        debug!("reply layout unknown, used a property scan");
        return s.to_string();
    }
    if let Some(s) = scan_strings_deep(value) {
        debug!("reply layout unknown, used a nested property scan");
        return s.to_string();
    }

    // Structured leftovers have no sensible string form; scalars do.
    let text = match value {
        Value::Object(_) | Value::Array(_) => String::new(),
        other => other.to_string(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == OBJECT_OBJECT {
        debug!("reply could not be decoded, showing the fallback text");
        FALLBACK_REPLY.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_is_trimmed() {
        let value = json!("  Hà Nội có 36 phố phường.  ");
        assert_eq!(extract_reply_text(&value), "Hà Nội có 36 phố phường.");
    }

    #[test]
    fn test_vacant_values_fall_back() {
        for value in [json!(null), json!(""), json!(false), json!(0)] {
            assert_eq!(extract_reply_text(&value), FALLBACK_REPLY);
        }
    }

    #[test]
    fn test_whitespace_only_string_trims_to_empty() {
        assert_eq!(extract_reply_text(&json!("   ")), "");
    }

    #[test]
    fn test_keyed_fields_in_priority_order() {
        let value = json!({"text": "từ text", "message": "từ message"});
        assert_eq!(extract_reply_text(&value), "từ text");

        let value = json!({"message": "từ message", "content": "từ content"});
        assert_eq!(extract_reply_text(&value), "từ message");

        let value = json!({"content": "  từ content  "});
        assert_eq!(extract_reply_text(&value), "từ content");
    }

    #[test]
    fn test_empty_keyed_field_is_skipped() {
        let value = json!({"text": "", "message": "dùng message"});
        assert_eq!(extract_reply_text(&value), "dùng message");
    }

    #[test]
    fn test_chat_completion_choice() {
        let value = json!({
            "choices": [{"message": {"role": "assistant", "content": "Đà Nẵng đẹp lắm."}}]
        });
        assert_eq!(extract_reply_text(&value), "Đà Nẵng đẹp lắm.");
    }

    #[test]
    fn test_legacy_completion_choice() {
        let value = json!({"choices": [{"text": "Bánh mì Hội An."}]});
        assert_eq!(extract_reply_text(&value), "Bánh mì Hội An.");
    }

    #[test]
    fn test_streaming_chunk_choice() {
        let value = json!({"choices": [{"delta": {"content": "Một phần câu."}}]});
        assert_eq!(extract_reply_text(&value), "Một phần câu.");
    }

    #[test]
    fn test_choice_priority_message_over_text() {
        let value = json!({
            "choices": [{"message": {"content": "chat"}, "text": "legacy"}]
        });
        assert_eq!(extract_reply_text(&value), "chat");
    }

    #[test]
    fn test_choice_priority_text_over_delta() {
        let value = json!({
            "choices": [{"text": "legacy", "delta": {"content": "chunk"}}]
        });
        assert_eq!(extract_reply_text(&value), "legacy");
    }

    #[test]
    fn test_direct_text_outranks_choices() {
        let value = json!({
            "text": "trực tiếp",
            "choices": [{"message": {"content": "trong choices"}}]
        });
        assert_eq!(extract_reply_text(&value), "trực tiếp");
    }

    #[test]
    fn test_empty_choices_falls_through_to_result() {
        let value = json!({"choices": [], "result": "từ result"});
        assert_eq!(extract_reply_text(&value), "từ result");
    }

    #[test]
    fn test_data_and_result_keys() {
        assert_eq!(extract_reply_text(&json!({"data": "từ data"})), "từ data");
        assert_eq!(
            extract_reply_text(&json!({"result": "từ result"})),
            "từ result"
        );
    }

    #[test]
    fn test_message_object_is_not_taken_directly() {
        // `message` holds an object, so the keyed lookup skips it and the
        // nested scan finds the content string instead.
        let value = json!({"message": {"content": "bên trong"}});
        assert_eq!(extract_reply_text(&value), "bên trong");
    }

    #[test]
    fn test_unknown_key_found_by_property_scan() {
        let value = json!({"output": "chuyến đi ba ngày"});
        assert_eq!(extract_reply_text(&value), "chuyến đi ba ngày");
    }

    #[test]
    fn test_property_scan_follows_document_order() {
        // "answer" sorts before "id"; the scan must not reorder keys
        let value = json!({"id": "chatcmpl-42", "answer": "Đi Huế đi."});
        assert_eq!(extract_reply_text(&value), "chatcmpl-42");
    }

    #[test]
    fn test_array_body_found_by_property_scan() {
        let value = json!(["phần tử đầu tiên"]);
        assert_eq!(extract_reply_text(&value), "phần tử đầu tiên");
    }

    #[test]
    fn test_stringless_array_falls_back() {
        assert_eq!(extract_reply_text(&json!([1, 2])), FALLBACK_REPLY);
    }

    #[test]
    fn test_nested_scan_goes_one_level_only() {
        let value = json!({"wrapper": {"reply": "sâu một cấp"}});
        assert_eq!(extract_reply_text(&value), "sâu một cấp");

        let value = json!({"payload": {"inner": {"value": "sâu hai cấp"}}});
        assert_eq!(extract_reply_text(&value), FALLBACK_REPLY);
    }

    #[test]
    fn test_empty_object_uses_fallback_not_object_object() {
        let text = extract_reply_text(&json!({}));
        assert_eq!(text, FALLBACK_REPLY);
        assert_ne!(text, OBJECT_OBJECT);
    }

    #[test]
    fn test_truthy_scalars_stringify() {
        assert_eq!(extract_reply_text(&json!(42)), "42");
        assert_eq!(extract_reply_text(&json!(true)), "true");
    }

    #[test]
    fn test_classify_shapes() {
        assert!(matches!(classify(&json!("hi")), ReplyShape::PlainText("hi")));
        assert!(matches!(
            classify(&json!({"text": "t"})),
            ReplyShape::KeyedField("t")
        ));
        assert!(matches!(
            classify(&json!({"choices": []})),
            ReplyShape::ChoiceList(_)
        ));
        assert!(matches!(
            classify(&json!({"result": "r"})),
            ReplyShape::KeyedField("r")
        ));
        assert!(matches!(classify(&json!({"other": 1})), ReplyShape::Unknown));
        assert!(matches!(classify(&json!(7)), ReplyShape::Unknown));
    }
}
