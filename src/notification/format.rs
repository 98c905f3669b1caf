//! Placeholder substitution for user-supplied message formats.

use super::NotifyError;

/// The token that marks where the notification text goes.
pub const MESSAGE_PLACEHOLDER: &str = "{{message}}";

/// Applies a channel's `messageFormat` to `message`.
///
/// An empty format passes the message through. Otherwise the format must
/// contain [`MESSAGE_PLACEHOLDER`], and only its first occurrence is replaced.
pub fn format_message(format: &str, message: &str) -> Result<String, NotifyError> {
    if format.is_empty() {
        return Ok(message.to_string());
    }
    substitute(format, message).ok_or(NotifyError::MissingPlaceholder("messageFormat"))
}

/// Replaces the first placeholder in `template`, or `None` if there is none.
pub(crate) fn substitute(template: &str, message: &str) -> Option<String> {
    template
        .contains(MESSAGE_PLACEHOLDER)
        .then(|| template.replacen(MESSAGE_PLACEHOLDER, message, 1))
}
