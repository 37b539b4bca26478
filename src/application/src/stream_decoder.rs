//! Byte chunks to complete text lines
//!
//! Chunks may split a multi-byte UTF-8 sequence or a line anywhere. Both
//! halves are held back until the rest arrives, so no record is ever seen
//! partially or with a corrupted character.

/// Streaming UTF-8 decoder. Invalid sequences become U+FFFD; an incomplete
/// trailing sequence is kept for the next chunk.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());
        let mut start = 0;

        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    start = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + bad;
                        }
                        None => {
                            // Incomplete sequence at the end, wait for more bytes
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
        out
    }

    /// Flush whatever is left once the transport closed.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Splits decoded text on `\n`, buffering the unterminated tail.
#[derive(Debug, Default)]
pub struct LineDecoder {
    utf8: Utf8ChunkDecoder,
    partial: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete lines contained in this chunk, without line terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.utf8.decode(chunk);
        self.partial.push_str(&text);

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.find('\n') {
            let mut line: String = self.partial.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// The trailing line, if the stream ended without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.utf8.finish();
        self.partial.push_str(&rest);
        if self.partial.is_empty() {
            None
        } else {
            let mut line = std::mem::take(&mut self.partial);
            if line.ends_with('\r') {
                line.pop();
            }
            Some(line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "Olá".as_bytes();
        let (head, tail) = bytes.split_at(3); // cuts inside 'á'
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(head), "Ol");
        assert_eq!(decoder.decode(tail), "á");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_invalid_byte_is_replaced() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_truncated_sequence_at_close() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&[b'x', 0xC3]), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_lines_across_chunks() {
        let mut lines = LineDecoder::new();
        assert!(lines.push(b"data: {\"del").is_empty());
        assert_eq!(
            lines.push(b"ta\":\"x\"}\r\n\ndata: [DO"),
            vec!["data: {\"delta\":\"x\"}".to_string(), String::new()]
        );
        assert_eq!(lines.push(b"NE]\n"), vec!["data: [DONE]".to_string()]);
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_unterminated_tail_flushed() {
        let mut lines = LineDecoder::new();
        assert!(lines.push(b"data: tail").is_empty());
        assert_eq!(lines.finish().as_deref(), Some("data: tail"));
    }
}
