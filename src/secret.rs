//! Transient user secrets (upload passwords and OTPs)
//!
//! A [`Secret`] is held in memory only for one transfer session. It never
//! appears in `Debug`/`Display` output, and its buffer is overwritten with
//! zeroes when cleared or dropped.

use std::fmt;

/// A password or one-time code supplied by the user
#[derive(Default)]
pub struct Secret {
    value: String,
}

impl Secret {
    /// Wrap a user-supplied value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Borrow the raw value for the single request it was collected for
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Whether the secret is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Whether the secret holds no characters at all
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Overwrite the buffer with zeroes and empty it
    pub fn clear(&mut self) {
        let mut bytes = std::mem::take(&mut self.value).into_bytes();
        bytes.fill(0);
        std::hint::black_box(&bytes);
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "Secret(<empty>)")
        } else {
            write!(f, "Secret(<redacted>)")
        }
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}
