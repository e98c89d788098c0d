use crate::kernel::services::ports::TextBufferWidget;

/// Plain string buffer, used by the line-oriented frontend.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlainBuffer {
    text: String,
}

impl PlainBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TextBufferWidget for PlainBuffer {
    fn set_content(&mut self, content: &str) {
        self.text.clear();
        self.text.push_str(content);
    }

    fn content(&self) -> String {
        self.text.clone()
    }
}
