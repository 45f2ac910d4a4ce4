use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

/// Confirmation emitted after a committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    ContactAdded,
    ContactUpdated,
    ContactDeleted,
}

impl Notice {
    pub const fn message(self) -> &'static str {
        match self {
            Notice::ContactAdded => "contact added",
            Notice::ContactUpdated => "contact updated",
            Notice::ContactDeleted => "contact deleted",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One-shot notice slot: the next reader takes the notice and clears it.
///
/// Posting over an unread notice replaces it; only the latest confirmation
/// is ever delivered, and at most once.
#[derive(Debug, Default)]
pub struct Flash {
    slot: Mutex<Option<Notice>>,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, notice: Notice) {
        *self.slot.lock() = Some(notice);
    }

    pub fn take(&self) -> Option<Notice> {
        self.slot.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_is_delivered_once() {
        let flash = Flash::new();
        flash.post(Notice::ContactAdded);
        assert_eq!(flash.take(), Some(Notice::ContactAdded));
        assert_eq!(flash.take(), None);
    }

    #[test]
    fn latest_notice_wins() {
        let flash = Flash::new();
        flash.post(Notice::ContactAdded);
        flash.post(Notice::ContactDeleted);
        assert_eq!(flash.take().map(Notice::message), Some("contact deleted"));
    }
}
