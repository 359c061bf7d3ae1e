//! Word wrapping for proportional fonts and a scrolling text box.
//!
//! Nothing here touches a font directly: callers pass a `measure` closure that
//! returns the pixel width of a string, e.g. Macroquad's `measure_text`.

use std::collections::VecDeque;

/// Greedy word wrap of `text` to lines at most `max_width` pixels wide.
///
/// Words are split on whitespace and joined with single spaces. A line that
/// measures exactly `max_width` still fits. A word wider than `max_width` is
/// put alone on its own line, never split.
pub fn wrap_words<F>(text: &str, max_width: f32, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_owned()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrapped lines inside a fixed pixel box; the oldest lines scroll off the
/// top once the box is full.
#[derive(Debug, Clone)]
pub struct TextBox {
    width: f32,
    height: f32,
    line_height: f32,
    lines: VecDeque<String>,
}

impl TextBox {
    /// A box `width` x `height` pixels whose lines are `line_height` apart.
    pub fn new(width: f32, height: f32, line_height: f32) -> Self {
        Self {
            width,
            height,
            line_height,
            lines: VecDeque::new(),
        }
    }

    /// Most lines that fit; always at least one.
    pub fn capacity(&self) -> usize {
        if self.line_height > 0.0 {
            ((self.height / self.line_height) as usize).max(1)
        } else {
            1
        }
    }

    /// Wrap `text` to the box width, append it and drop scrollback that no
    /// longer fits.
    pub fn add_text<F>(&mut self, text: &str, measure: F)
    where
        F: FnMut(&str) -> f32,
    {
        self.lines.extend(wrap_words(text, self.width, measure));
        let cap = self.capacity();
        while self.lines.len() > cap {
            self.lines.pop_front();
        }
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Visible lines, top first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// `true` when nothing has been added since the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Pixel distance between consecutive lines.
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }
}
