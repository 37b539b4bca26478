//! Recognized event payload shapes
//!
//! The upstream has emitted several layouts for the same answer over time.
//! Each layout is one `PayloadShape`; a payload is decoded against the shapes
//! in `SHAPE_PRIORITY` order and the first one that yields content decides the
//! record. Payloads that are JSON but match nothing are dropped, payloads
//! that are not JSON at all are plain answer text.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{"error":{"message":"..."}}` or `{"error":"..."}`, synthesized by the relay.
    ErrorEvent,
    /// `{"blocks":[{"markdown_block":{"chunks":[..]} | {"answer":".."}}]}`
    BlockArray,
    /// `{"text":"<JSON array of steps>"}` with a `FINAL` step holding the answer.
    StepArray,
    /// `{"delta":"..."}`
    Delta,
    /// `{"content":"..."}`
    Content,
}

pub const SHAPE_PRIORITY: [PayloadShape; 5] = [
    PayloadShape::ErrorEvent,
    PayloadShape::BlockArray,
    PayloadShape::StepArray,
    PayloadShape::Delta,
    PayloadShape::Content,
];

const FINAL_STEP: &str = "FINAL";

/// What one data record does to the current answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerUpdate {
    /// A record's own ordered fragment list. It replaces whatever earlier
    /// records built; the stream keeps going.
    Fragments(Vec<String>),
    /// The complete answer. Terminal.
    Final(String),
    /// Incremental text.
    Append(String),
    /// Error reported in-band. Terminal.
    Failure(String),
}

impl AnswerUpdate {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnswerUpdate::Final(_) | AnswerUpdate::Failure(_))
    }
}

impl PayloadShape {
    pub fn decode(self, value: &Value) -> Option<AnswerUpdate> {
        match self {
            PayloadShape::ErrorEvent => decode_error(value),
            PayloadShape::BlockArray => decode_blocks(value),
            PayloadShape::StepArray => decode_steps(value),
            PayloadShape::Delta => non_empty_field(value, "delta").map(AnswerUpdate::Append),
            PayloadShape::Content => non_empty_field(value, "content").map(AnswerUpdate::Append),
        }
    }
}

/// `None` means the payload is structured data of no known shape and must be dropped.
pub fn interpret_payload(payload: &str) -> Option<AnswerUpdate> {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => SHAPE_PRIORITY
            .iter()
            .find_map(|shape| shape.decode(&value)),
        Err(_) => Some(AnswerUpdate::Append(payload.to_string())),
    }
}

fn non_empty_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode_error(value: &Value) -> Option<AnswerUpdate> {
    match value.get("error")? {
        Value::String(message) if !message.is_empty() => {
            Some(AnswerUpdate::Failure(message.clone()))
        }
        error @ Value::Object(_) => {
            non_empty_field(error, "message").map(AnswerUpdate::Failure)
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct MarkdownBlock {
    #[serde(default)]
    chunks: Option<Vec<Value>>,
    #[serde(default)]
    answer: Option<Value>,
}

fn decode_blocks(value: &Value) -> Option<AnswerUpdate> {
    let blocks = value.get("blocks")?.as_array()?;

    blocks.iter().find_map(|block| {
        let markdown = block.get("markdown_block")?;
        let markdown: MarkdownBlock = serde_json::from_value(markdown.clone()).ok()?;

        if let Some(chunks) = markdown.chunks {
            let fragments: Vec<String> = chunks
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !fragments.is_empty() {
                return Some(AnswerUpdate::Fragments(fragments));
            }
        }

        markdown
            .answer
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| AnswerUpdate::Final(s.to_string()))
    })
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    step_type: Option<String>,
    #[serde(default)]
    content: Option<StepContent>,
}

#[derive(Debug, Deserialize)]
struct StepContent {
    #[serde(default)]
    answer: Option<Value>,
}

fn decode_steps(value: &Value) -> Option<AnswerUpdate> {
    let text = non_empty_field(value, "text")?;

    let steps = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(steps)) => steps,
        // Not a step array: the text itself is the answer
        _ => return Some(AnswerUpdate::Final(text)),
    };

    steps.into_iter().find_map(|raw| {
        let step: Step = serde_json::from_value(raw).ok()?;
        if step.step_type.as_deref() != Some(FINAL_STEP) {
            return None;
        }
        let answer = step
            .content?
            .answer?
            .as_str()
            .filter(|s| !s.is_empty())?
            .to_string();
        final_step_answer(answer)
    })
}

/// The step answer is usually itself JSON `{"answer": "..."}`.
fn final_step_answer(raw: String) -> Option<AnswerUpdate> {
    match serde_json::from_str::<Value>(&raw) {
        Ok(decoded) => non_empty_field(&decoded, "answer").map(AnswerUpdate::Final),
        Err(_) => Some(AnswerUpdate::Final(raw)),
    }
}
