/// Lifecycle of the answer being assembled from a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerPhase {
    #[default]
    Streaming,
    /// A complete answer arrived; further incremental text is ignored.
    Final,
    /// The stream reported an error; the buffer holds its message.
    Failed,
}

/// Accumulated answer text plus its phase.
#[derive(Debug, Default)]
pub struct AnswerBuffer {
    text: String,
    phase: AnswerPhase,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn phase(&self) -> AnswerPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase != AnswerPhase::Streaming
    }

    /// Returns false when the text was refused.
    pub fn append(&mut self, fragment: &str) -> bool {
        if self.is_terminal() || fragment.is_empty() {
            return false;
        }
        self.text.push_str(fragment);
        true
    }

    /// Replace with a complete answer. Returns whether the text changed.
    pub fn replace_final(&mut self, answer: &str) -> bool {
        if self.phase == AnswerPhase::Failed {
            return false;
        }
        self.phase = AnswerPhase::Final;
        if answer.is_empty() || answer == self.text {
            return false;
        }
        self.text.clear();
        self.text.push_str(answer);
        true
    }

    /// Drop everything received so far so a record can rebuild the answer
    /// from its own fragments. A settled answer is kept.
    pub fn restart(&mut self) {
        if self.phase == AnswerPhase::Streaming {
            self.text.clear();
        }
    }

    pub fn seal(&mut self) {
        if self.phase == AnswerPhase::Streaming {
            self.phase = AnswerPhase::Final;
        }
    }

    pub fn fail(&mut self, message: &str) {
        self.text.clear();
        self.text.push_str(message);
        self.phase = AnswerPhase::Failed;
    }
}
