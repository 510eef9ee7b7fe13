//! Incremental frame extraction from a response body.
//!
//! Bytes arrive in arbitrary chunks: a multi-byte character or a frame
//! delimiter may be split across two reads. [`FrameDecoder`] carries the
//! incomplete UTF-8 tail between chunks and [`FrameBuffer`] carries the
//! incomplete frame, emitting each `\n\n`-terminated frame exactly once and in
//! arrival order.

const FRAME_DELIMITER: &str = "\n\n";

/// Stateful UTF-8 decoder.
///
/// Invalid sequences are replaced with U+FFFD instead of failing the stream.
/// `\r\n` is normalised to `\n` so CRLF servers frame the same way.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Leading bytes of a character whose remaining bytes have not arrived
    pending: Vec<u8>,
    /// A `\r` seen at the end of the previous chunk
    pending_cr: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, holding back any incomplete trailing character.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // valid_up_to guarantees this prefix is UTF-8
                    text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            text.push('\u{FFFD}');
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        self.normalize_newlines(text)
    }

    /// Flush whatever is held back at end of stream.
    pub fn finish(&mut self) -> String {
        let mut text = String::new();
        if self.pending_cr {
            text.push('\n');
            self.pending_cr = false;
        }
        if !self.pending.is_empty() {
            text.push('\u{FFFD}');
            self.pending.clear();
        }
        text
    }

    fn normalize_newlines(&mut self, text: String) -> String {
        let mut out = String::with_capacity(text.len() + 1);
        if std::mem::take(&mut self.pending_cr) {
            out.push('\r');
        }
        out.push_str(&text);

        if out.ends_with('\r') {
            out.pop();
            self.pending_cr = true;
        }
        // A lone \r is a line break too.
        out.replace("\r\n", "\n").replace('\r', "\n")
    }
}

/// Accumulates decoded text and splits it into complete frames.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    decoder: FrameDecoder,
    buffer: String,
    /// Prefix of `buffer` already searched for a delimiter.
    scanned: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete frame it finishes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);
        self.drain_frames()
    }

    /// Text still waiting for its delimiter.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// End of stream: flushes the decoder and returns the frames that
    /// completes, plus any unterminated remainder.
    pub fn finish(&mut self) -> (Vec<String>, Option<String>) {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        let frames = self.drain_frames();
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        let remainder = if rest.trim().is_empty() { None } else { Some(rest) };
        (frames, remainder)
    }

    fn drain_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(found) = self.buffer[from..].find(FRAME_DELIMITER) {
            let end = from + found;
            let frame = &self.buffer[start..end];
            if !frame.trim().is_empty() {
                frames.push(frame.to_string());
            }
            start = end + FRAME_DELIMITER.len();
            from = start;
        }
        self.buffer.drain(..start);

        // A trailing newline may be the first half of a delimiter.
        self.scanned = if self.buffer.ends_with('\n') {
            self.buffer.len() - 1
        } else {
            self.buffer.len()
        };
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(b"data: {\"a\":1}\n\n");
        assert_eq!(frames, vec!["data: {\"a\":1}".to_string()]);
        assert_eq!(buffer.pending(), "");
    }

    #[test]
    fn test_frame_split_across_reads() {
        let mut buffer = FrameBuffer::new();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        assert!(buffer.push(b":1}\n").is_empty());
        let frames = buffer.push(b"\ndata: {\"b\":2}\n\n");
        assert_eq!(
            frames,
            vec!["data: {\"a\":1}".to_string(), "data: {\"b\":2}".to_string()]
        );
    }

    #[test]
    fn test_partial_trailing_data_stays_buffered() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(b"data: one\n\ndata: tw");
        assert_eq!(frames, vec!["data: one".to_string()]);
        assert_eq!(buffer.pending(), "data: tw");
    }

    #[test]
    fn test_large_frame_in_small_reads_scans_incrementally() {
        let payload = format!("data: {}", "é".repeat(4_000));
        let mut buffer = FrameBuffer::new();
        for chunk in payload.as_bytes().chunks(7) {
            assert!(buffer.push(chunk).is_empty());
            assert_eq!(buffer.scanned, buffer.pending().len());
        }

        assert!(buffer.push(b"\n").is_empty());
        assert_eq!(buffer.scanned, buffer.pending().len() - 1);
        assert_eq!(buffer.push(b"\n"), vec![payload]);
        assert_eq!(buffer.pending(), "");
        assert_eq!(buffer.scanned, 0);
    }

    #[test]
    fn test_many_frames_in_one_read() {
        let body: String = (0..100).map(|n| format!("data: {}\n\n", n)).collect();
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(format!("{}data: tail", body).as_bytes());
        assert_eq!(frames.len(), 100);
        assert_eq!(frames[99], "data: 99");
        assert_eq!(buffer.pending(), "data: tail");
    }

    #[test]
    fn test_multibyte_character_split_across_reads() {
        let text = "data: é😀\n\n".as_bytes();
        // Split inside the four-byte emoji.
        let split = "data: é".len() + 2;
        let mut buffer = FrameBuffer::new();
        assert!(buffer.push(&text[..split]).is_empty());
        let frames = buffer.push(&text[split..]);
        assert_eq!(frames, vec!["data: é😀".to_string()]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_crlf_delimiters() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(b"data: x\r\n\r");
        assert!(frames.is_empty());
        let frames = buffer.push(b"\ndata: y\r\n\r\n");
        assert_eq!(frames, vec!["data: x".to_string(), "data: y".to_string()]);
    }

    #[test]
    fn test_blank_frames_are_skipped() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(b"\n\n\n\ndata: z\n\n");
        assert_eq!(frames, vec!["data: z".to_string()]);
    }

    #[test]
    fn test_finish_returns_unterminated_remainder() {
        let mut buffer = FrameBuffer::new();
        buffer.push(b"data: done\n\ndata: half");
        assert_eq!(buffer.finish(), (vec![], Some("data: half".to_string())));
        assert_eq!(buffer.finish(), (vec![], None));
    }

    #[test]
    fn test_finish_completes_frame_ended_by_carriage_return() {
        let mut buffer = FrameBuffer::new();
        assert!(buffer.push(b"data: last\r\n\r").is_empty());
        assert_eq!(buffer.finish(), (vec!["data: last".to_string()], None));
    }
}
