//! Output trait for rendering reports to different formats.

/// Target output for reports.
///
/// Reports describe *what* to output using these semantic methods.
/// Implementations decide *how* to render.
pub trait Output {
    /// Start a new section with a heading.
    fn section(&mut self, name: &str);

    /// Render a key-value pair.
    fn key_value(&mut self, key: &str, value: &str);

    /// Render a bullet list item.
    fn list_item(&mut self, text: &str);

    /// Render an added item (e.g., a written file).
    fn added_item(&mut self, text: &str);

    /// Render an item that was left alone.
    fn kept_item(&mut self, text: &str);

    /// Render a warning message.
    fn warning(&mut self, msg: &str);

    fn preformatted(&mut self, text: &str);
}

/// A report that can render itself to an output.
pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Terminal output implementation.
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for TerminalOutput {
    fn section(&mut self, name: &str) {
        println!("{}:", name);
    }

    fn key_value(&mut self, key: &str, value: &str) {
        println!("{}: {}", key, value);
    }

    fn list_item(&mut self, text: &str) {
        println!("  - {}", text);
    }

    fn added_item(&mut self, text: &str) {
        println!("  + {}", text);
    }

    fn kept_item(&mut self, text: &str) {
        println!("  = {}", text);
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("warning: {}", msg);
    }

    fn preformatted(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Collects rendered lines, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct BufferOutput {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl Output for BufferOutput {
    fn section(&mut self, name: &str) {
        self.lines.push(format!("{}:", name));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.lines.push(format!("{}: {}", key, value));
    }

    fn list_item(&mut self, text: &str) {
        self.lines.push(format!("  - {}", text));
    }

    fn added_item(&mut self, text: &str) {
        self.lines.push(format!("  + {}", text));
    }

    fn kept_item(&mut self, text: &str) {
        self.lines.push(format!("  = {}", text));
    }

    fn warning(&mut self, msg: &str) {
        self.lines.push(format!("warning: {}", msg));
    }

    fn preformatted(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
