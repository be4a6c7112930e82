//! Chat text transform — token substitution over flagged words.
//!
//! Case-insensitive substring scan; each match is replaced by an
//! equal-length `*` mask. There is no word-boundary check, so words
//! containing a flagged substring are mangled too.

/// Compiled flagged-word list.
#[derive(Debug, Clone)]
pub struct ChatFilter {
    words: Vec<String>,
}

impl ChatFilter {
    pub fn new(words: &[String]) -> Self {
        Self {
            words: words
                .iter()
                .filter(|w| !w.trim().is_empty())
                .map(|w| w.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Mask every flagged occurrence. The returned text is the canonical
    /// form of the message — it, not the original, is what gets relayed.
    pub fn apply(&self, text: &str) -> String {
        let mut bytes = text.as_bytes().to_vec();
        for word in &self.words {
            let w = word.as_bytes();
            let mut i = 0;
            while i + w.len() <= bytes.len() {
                if bytes[i..i + w.len()].eq_ignore_ascii_case(w) {
                    bytes[i..i + w.len()].fill(b'*');
                    i += w.len();
                } else {
                    i += 1;
                }
            }
        }
        // Flagged words are ASCII; masking never splits a multi-byte char.
        String::from_utf8(bytes).unwrap_or_else(|_| text.to_string())
    }
}
