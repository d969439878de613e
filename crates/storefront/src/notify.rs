//! User-facing cart notifications.
//!
//! Cart operations never return errors to their caller. Instead, anything the
//! shopper should hear about is pushed to a [`NotificationSink`] as a
//! [`Notice`], and the UI decides how to present it (toast, status line, ...).

use std::fmt;
use std::sync::Mutex;

/// A human-readable message about a cart operation that did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Stock cannot cover the requested quantity.
    OutOfStock,
    /// Adding a new product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a product's quantity failed.
    UpdateFailed,
}

impl Notice {
    /// The text shown to the shopper.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity out of stock",
            Self::AddFailed => "Error adding product",
            Self::RemoveFailed => "Error removing product",
            Self::UpdateFailed => "Error changing product quantity",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives error-level notices for display. Fire-and-forget.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Sink that buffers notices until the UI drains them.
#[derive(Debug, Default)]
pub struct CollectingSink {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }

    /// Copy of the buffered notices without draining them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&self, notice: Notice) {
        tracing::debug!(notice = ?notice, "Cart notice");
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
