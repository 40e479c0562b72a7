//! Incremental `text/event-stream` parser.

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// `event:` field; `None` for unnamed message events
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

impl StreamEvent {
    /// Unnamed events carry the relayed text; named ones are control events.
    pub fn is_message(&self) -> bool {
        self.event.as_deref().map_or(true, |name| name == "message")
    }
}

/// Accumulates bytes as they arrive and yields complete events.
///
/// Lines end in `\n` or `\r\n`. A blank line dispatches the pending event;
/// events without any `data:` line are dropped, and comment lines (leading
/// `:`) are ignored. Multiple `data:` lines are joined with `\n`.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
    event: Option<String>,
    id: Option<String>,
    data: Option<String>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => match self.data.as_mut() {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // retry and unknown fields
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<StreamEvent> {
        let event = self.event.take();
        let id = self.id.take();
        let data = self.data.take()?;
        Some(StreamEvent { event, id, data })
    }
}
