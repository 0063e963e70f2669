//! Byte to character offset conversion.
//!
//! Regex matching and string slicing work on UTF-8 byte offsets, while
//! annotation files carry character (Unicode scalar value) offsets. Matchers
//! build one [`CharOffsets`] per document and convert at the emission boundary.

/// Precomputed byte → char index table for one text.
///
/// ASCII text uses the identity mapping and allocates nothing.
#[derive(Debug, Clone)]
pub struct CharOffsets {
    byte_to_char: Vec<usize>,
    is_ascii: bool,
    len: usize,
}

impl CharOffsets {
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                byte_to_char: Vec::new(),
                is_ascii: true,
                len: text.len(),
            };
        }

        let mut map = vec![0usize; text.len() + 1];
        let mut char_count = 0;
        for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
            for slot in &mut map[byte_idx..byte_idx + ch.len_utf8()] {
                *slot = char_idx;
            }
            char_count = char_idx + 1;
        }
        map[text.len()] = char_count;

        Self {
            byte_to_char: map,
            is_ascii: false,
            len: char_count,
        }
    }

    /// Character index of the character containing `byte_idx`.
    ///
    /// `text.len()` maps to the total character count; anything past the end
    /// clamps to it.
    pub fn to_char(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx.min(self.len);
        }
        self.byte_to_char.get(byte_idx).copied().unwrap_or(self.len)
    }

    /// Convert a byte range into a character range.
    pub fn span(&self, byte_start: usize, byte_end: usize) -> (usize, usize) {
        (self.to_char(byte_start), self.to_char(byte_end))
    }
}
