/// Reassembles lines from arbitrarily split body chunks.
///
/// Splitting happens on raw bytes, so a multi-byte character cut in half by
/// the transport is decoded only once its line is complete. Blank lines are
/// keep-alive pings and never surface.
#[derive(Debug, Default)]
pub struct Framer {
    buffer: Vec<u8>,
}

impl Framer {
    /// Absorb one chunk and return every line it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(i) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.drain(..=i).collect::<Vec<u8>>();
            lines.extend(Self::decode(&line));
        }
        lines
    }

    /// Flush whatever trails the last newline once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        Self::decode(&rest)
    }

    fn decode(bytes: &[u8]) -> Option<String> {
        Some(String::from_utf8_lossy(bytes).trim().to_string()).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut framer = Framer::default();
        let lines = framer.feed(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn holds_partial_line_across_chunks() {
        let mut framer = Framer::default();
        assert!(framer.feed(b"{\"type\":\"game").is_empty());
        assert_eq!(framer.feed(b"Start\"}\n{"), vec!["{\"type\":\"gameStart\"}"]);
        assert_eq!(framer.finish(), Some("{".to_string()));
    }

    #[test]
    fn drops_keep_alives() {
        let mut framer = Framer::default();
        let lines = framer.feed(b"\n\r\n  \n{}\n\n");
        assert_eq!(lines, vec!["{}"]);
    }

    #[test]
    fn multibyte_split_mid_character() {
        let mut framer = Framer::default();
        let text = "{\"text\":\"gg \u{265E}\"}\n".as_bytes();
        let cut = text.len() - 4;
        assert!(framer.feed(&text[..cut]).is_empty());
        assert_eq!(framer.feed(&text[cut..]), vec!["{\"text\":\"gg \u{265E}\"}"]);
    }
}
