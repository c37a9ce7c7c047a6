//! Document buffer implementation using ropey.

use ropey::Rope;

/// The authoritative plain-text content of the open document, backed by a
/// rope. Single writer (the editor session); search and highlighting read
/// through snapshots or index queries. File I/O lives behind the storage
/// seam, not here.
#[derive(Debug, Clone)]
pub struct DocumentBuffer {
    rope: Rope,
}

impl Default for DocumentBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuffer {
    /// Creates a new empty buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Creates a buffer from a string.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the total number of bytes in the buffer.
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Returns the total number of lines in the buffer.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Inserts a string at the given character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let idx = char_idx.min(self.len_chars());
        self.rope.insert(idx, text);
    }

    /// Removes text in the given character range.
    pub fn remove(&mut self, start: usize, end: usize) {
        let start = start.min(self.len_chars());
        let end = end.min(self.len_chars());
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Replaces the entire buffer content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Converts a byte offset to a character index.
    /// Match spans carry byte offsets; the rope speaks characters.
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        let idx = byte_idx.min(self.rope.len_bytes());
        self.rope.byte_to_char(idx)
    }

    /// Converts a character index to a byte offset.
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        let idx = char_idx.min(self.len_chars());
        self.rope.char_to_byte(idx)
    }

    /// Returns the 0-indexed line containing the given byte offset.
    pub fn line_of_byte(&self, byte_idx: usize) -> usize {
        let idx = byte_idx.min(self.rope.len_bytes());
        self.rope.byte_to_line(idx)
    }

    /// Converts a character index to a (line, column) position.
    /// Both line and column are 0-indexed.
    pub fn char_to_line_col(&self, char_idx: usize) -> (usize, usize) {
        let char_idx = char_idx.min(self.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        (line, char_idx - line_start)
    }

    /// Returns the length of a line in characters (excluding newline).
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            return 0;
        }
        let line_slice = self.rope.line(line);
        let len = line_slice.len_chars();
        if len > 0 && line_slice.char(len - 1) == '\n' {
            return len - 1;
        }
        len
    }

    /// Returns the line at the given index as a string.
    pub fn line(&self, line: usize) -> Option<String> {
        if line >= self.len_lines() {
            None
        } else {
            let mut s = self.rope.line(line).to_string();
            if s.ends_with('\n') {
                s.pop();
            }
            Some(s)
        }
    }

    /// Returns the entire buffer as a string.
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }
}
