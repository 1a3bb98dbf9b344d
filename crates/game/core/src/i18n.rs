//! Localization seam.
//!
//! String formatting belongs to the host. The core only needs to turn message
//! keys into display text when it renders fragments such as
//! [`BaseModifier::chat_html`](crate::modifier::BaseModifier::chat_html).

use crate::time::DurationValue;

/// Host-provided message formatter.
pub trait MessageFormatter {
    /// Resolves a message key such as `"SOHL.BaseModifier.Value"`.
    fn format(&self, key: &str) -> String;

    fn format_duration(&self, duration: &DurationValue) -> String {
        duration.to_string()
    }
}

/// Formatter that echoes keys back unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyFormatter;

impl MessageFormatter for KeyFormatter {
    fn format(&self, key: &str) -> String {
        key.to_string()
    }
}
