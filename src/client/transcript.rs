/// Running log of received stream messages.
///
/// Every message is appended after a newline, so after N messages the text is
/// `"\n" + messages.join("\n")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
    messages: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: &str) {
        self.text.push('\n');
        self.text.push_str(message);
        self.messages += 1;
    }

    /// Replace the whole text, as an error report does
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.text = status.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_joins_with_newlines() {
        let mut transcript = Transcript::new();
        for message in ["alpha", "beta", "gamma"] {
            transcript.append(message);
        }
        assert_eq!(transcript.text(), "\nalpha\nbeta\ngamma");
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_set_status_overwrites() {
        let mut transcript = Transcript::new();
        transcript.append("alpha");
        transcript.set_status("Notification permission denied");
        assert_eq!(transcript.text(), "Notification permission denied");
    }

    #[test]
    fn test_multiline_message_kept_whole() {
        let mut transcript = Transcript::new();
        transcript.append("one\ntwo");
        transcript.append("three");
        assert_eq!(transcript.text(), "\none\ntwo\nthree");
        assert_eq!(transcript.len(), 2);
        assert!(!transcript.is_empty());
    }
}
