/// Prompt buffer: the letters the player has typed so far.
///
/// One terminal column per letter, so the buffer width is its length.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptBuffer {
    text: String,
}

impl PromptBuffer {
    pub fn new() -> Self {
        PromptBuffer::default()
    }

    /// Append an ASCII letter if the result stays narrower than `max_width`.
    /// Returns whether the character was taken.
    pub fn append_char(&mut self, c: char, max_width: usize) -> bool {
        if !c.is_ascii_alphabetic() || self.text.len() + 1 >= max_width {
            return false;
        }
        self.text.push(c);
        true
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Text as typed (case preserved).
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Text used for matching.
    pub fn lowered(&self) -> String {
        self.text.to_ascii_lowercase()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }
}
