//! The mailbox message value type and its wire rendering.

use chrono::{DateTime, Local};

// ----------------------------------------------------------------------------
// Message
// ----------------------------------------------------------------------------

/// One undelivered mailbox entry: who sent it, the ciphertext, and the
/// wall-clock send time. Owned by the registry until the recipient drains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub ciphertext: String,
    pub sent_at: DateTime<Local>,
}

impl Message {
    /// Stamp a new message with the current wall-clock time.
    pub fn new(sender: impl Into<String>, ciphertext: impl Into<String>) -> Self {
        Self::at(sender, ciphertext, Local::now())
    }

    pub fn at(
        sender: impl Into<String>,
        ciphertext: impl Into<String>,
        sent_at: DateTime<Local>,
    ) -> Self {
        Self {
            sender: sender.into(),
            ciphertext: ciphertext.into(),
            sent_at,
        }
    }

    /// Wire rendering, sent right after a `DECRYPT` token:
    ///
    /// ```text
    ///    [HH:MM]<sender> ciphertext
    /// ```
    pub fn formatted(&self) -> String {
        format!(
            "[{}]<{}> {}",
            self.sent_at.format("%H:%M"),
            self.sender,
            self.ciphertext
        )
    }
}

/// Split a wire line into the `[HH:MM]<sender>` prefix and the ciphertext.
/// The receiving client decrypts the suffix and reassembles the line.
pub fn split_wire_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(' ')
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_send_time_and_sender() {
        let sent_at = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 33).unwrap();
        let message = Message::at("bob", "Y2lwaGVy", sent_at);
        assert_eq!(message.formatted(), "[09:07]<bob> Y2lwaGVy");
    }

    #[test]
    fn wire_line_splits_at_first_space() {
        let (prefix, cipher) = split_wire_line("[09:07]<bob> abc def").unwrap();
        assert_eq!(prefix, "[09:07]<bob>");
        assert_eq!(cipher, "abc def");
    }

    #[test]
    fn wire_line_without_space_does_not_split() {
        assert!(split_wire_line("nospace").is_none());
    }
}
