/// The single user-visible channel for pipeline failures.
///
/// Each report replaces the previous message; nothing is queued.
pub trait ErrorSurface {
    fn report(&mut self, message: &str);
}

/// In-memory error region: a visibility flag and the latest message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRegion {
    visible: bool,
    text: String,
}

impl MessageRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl ErrorSurface for MessageRegion {
    fn report(&mut self, message: &str) {
        self.visible = true;
        self.text.clear();
        self.text.push_str(message);
    }
}
