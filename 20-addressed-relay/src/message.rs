/// Destination that asks the server to close the sender's connection.
pub const LEAVE_KEYWORD: &str = "salir";

/// Checks a display name before it is sent as a client's first frame.
///
/// Blank names would be skipped by the framer, so the next line typed would
/// register instead; line breaks would split the name across frames.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("display name cannot be empty");
    }
    if name.contains(['\n', '\r']) {
        return Err("display name cannot contain line breaks");
    }
    Ok(())
}

/// What an active connection asked for with one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Leave,
    Send { destination: String, content: String },
}

impl Request {
    /// Splits a frame on its first colon into destination and content.
    ///
    /// Returns `None` for frames without a colon. The content keeps any further
    /// colons verbatim. Only the leave keyword is matched case-insensitively;
    /// destinations are otherwise left untouched for exact lookup.
    pub fn parse(frame: &str) -> Option<Self> {
        let (destination, content) = frame.split_once(':')?;

        if destination.eq_ignore_ascii_case(LEAVE_KEYWORD) {
            return Some(Request::Leave);
        }

        Some(Request::Send {
            destination: destination.to_string(),
            content: content.to_string(),
        })
    }
}

/// A routed message. Built per frame and dropped once handed to the recipient's outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub destination: String,
    pub content: String,
}

impl Message {
    /// Bytes the recipient sees, minus the frame delimiter.
    pub fn payload(&self) -> String {
        format!("{}: {}", self.sender, self.content)
    }
}
