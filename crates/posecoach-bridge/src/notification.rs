/// Severity or category for user-visible notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// Neutral informational message that does not indicate success or failure.
    Info,
    /// Indicates a successful operation or positive outcome.
    Success,
    /// Indicates a non-critical issue that the user should be aware of, but
    /// does not prevent the exercise from continuing.
    Warning,
    /// Indicates a failure the user can retry (e.g., missing permissions).
    Error,
}

/// A notification payload intended for the user interface.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    /// The type/severity of the notification, determining its visual style.
    pub notification_type: NotificationType,
    /// The text content to display to the user.
    pub message: String,
}
