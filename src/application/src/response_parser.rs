//! Incremental parser for the relay's event stream
//!
//! Feed raw body chunks as they arrive. Every accepted update is reported
//! through the callback before the next record is looked at, so a view can
//! redraw one record at a time. Malformed records never abort the stream.

use crate::answer_buffer::{AnswerBuffer, AnswerPhase};
use crate::payload_shapes::{interpret_payload, AnswerUpdate};
use crate::stream_decoder::LineDecoder;

pub const FALLBACK_ANSWER: &str = "Desculpe, não consegui processar sua pergunta no momento. Posso ajudar com organização de tarefas, definição de prioridades ou dicas de produtividade. O que você gostaria de saber?";

pub const DONE_MARKER: &str = "[DONE]";

const DATA_PREFIX: &str = "data:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseProgress {
    Continue,
    /// Terminator or terminal record seen; stop reading.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Answered,
    Failed,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalAnswer {
    pub content: String,
    pub outcome: AnswerOutcome,
}

#[derive(Debug, Default)]
pub struct ResponseParser {
    lines: LineDecoder,
    answer: AnswerBuffer,
    done: bool,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one transport chunk. `on_update` receives the whole current
    /// answer after each accepted change.
    pub fn feed(&mut self, chunk: &[u8], mut on_update: impl FnMut(&str)) -> ParseProgress {
        if self.done {
            return ParseProgress::Done;
        }

        for line in self.lines.push(chunk) {
            if self.handle_line(&line, &mut on_update) == ParseProgress::Done {
                self.done = true;
                return ParseProgress::Done;
            }
        }
        ParseProgress::Continue
    }

    /// Flush any unterminated record and settle the answer. Empty answers
    /// become `FALLBACK_ANSWER`.
    pub fn finish(&mut self, mut on_update: impl FnMut(&str)) -> FinalAnswer {
        if !self.done {
            if let Some(line) = self.lines.finish() {
                self.handle_line(&line, &mut on_update);
            }
            self.done = true;
        }
        self.answer.seal();

        let content = self.answer.text().trim();
        if content.is_empty() {
            return FinalAnswer {
                content: FALLBACK_ANSWER.to_string(),
                outcome: AnswerOutcome::Fallback,
            };
        }

        let outcome = match self.answer.phase() {
            AnswerPhase::Failed => AnswerOutcome::Failed,
            _ => AnswerOutcome::Answered,
        };
        FinalAnswer {
            content: content.to_string(),
            outcome,
        }
    }

    fn handle_line(&mut self, line: &str, on_update: &mut dyn FnMut(&str)) -> ParseProgress {
        if line.trim().is_empty() {
            return ParseProgress::Continue;
        }
        let Some(payload) = data_payload(line) else {
            return ParseProgress::Continue;
        };
        if payload == DONE_MARKER {
            return ParseProgress::Done;
        }
        if payload.is_empty() {
            return ParseProgress::Continue;
        }

        let Some(update) = interpret_payload(payload) else {
            tracing::trace!(payload, "Skipping record with unrecognized shape");
            return ParseProgress::Continue;
        };

        let terminal = update.is_terminal();
        match update {
            AnswerUpdate::Append(text) => {
                if self.answer.append(&text) {
                    on_update(self.answer.text());
                }
            }
            AnswerUpdate::Fragments(fragments) => {
                self.answer.restart();
                for fragment in &fragments {
                    if self.answer.append(fragment) {
                        on_update(self.answer.text());
                    }
                }
            }
            AnswerUpdate::Final(answer) => {
                if self.answer.replace_final(&answer) {
                    on_update(self.answer.text());
                }
            }
            AnswerUpdate::Failure(message) => {
                self.answer.fail(&message);
                on_update(self.answer.text());
            }
        }

        if terminal {
            ParseProgress::Done
        } else {
            ParseProgress::Continue
        }
    }
}

/// Payload of a `data:` line, one optional leading space removed.
fn data_payload(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DATA_PREFIX)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}
