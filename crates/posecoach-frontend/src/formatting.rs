use posecoach_bridge::{
    MessageFromBackend,
    audio::{RouteSummary, SpeechRoute},
    notification::NotificationType,
    state::ResourceState,
};

/// One-line rendering of the aggregate resource state.
pub fn format_resource_state(state: &ResourceState) -> String {
    let mut out = format!("[session] {}", state.phase);
    if state.phase.is_starting() {
        out.push_str("...");
    }
    if !state.is_initialized {
        out.push_str(" (subsystems not registered)");
    }
    if let Some(error) = &state.last_error {
        out.push_str(&format!(" - last error: {error}"));
    }
    out
}

fn format_route(route: &RouteSummary) -> String {
    let list = |ports: &[String]| {
        if ports.is_empty() {
            "none".to_string()
        } else {
            ports.join(", ")
        }
    };
    format!(
        "[route] in: {} / out: {}{}",
        list(&route.inputs),
        list(&route.outputs),
        if route.bluetooth { " (bluetooth)" } else { "" }
    )
}

/// Renders a backend message for the console, `None` for messages that are
/// not shown.
pub fn format_message(message: &MessageFromBackend) -> Option<String> {
    let line = match message {
        MessageFromBackend::NotificationMessage(notification) => {
            let tag = match notification.notification_type {
                NotificationType::Info => "info",
                NotificationType::Success => "ok",
                NotificationType::Warning => "warning",
                NotificationType::Error => "error",
            };
            format!("[{tag}] {}", notification.message)
        }
        MessageFromBackend::ConfigurationResponse(config) => format!("[config] {config:?}"),
        MessageFromBackend::ResourceStateUpdate(state) => format_resource_state(state),
        MessageFromBackend::ExerciseSessionStarted { success: true } => {
            "[session] started, follow the coach".to_string()
        }
        MessageFromBackend::ExerciseSessionStarted { success: false } => {
            "[session] could not start, try again".to_string()
        }
        MessageFromBackend::ExerciseSessionStopped => return None,
        MessageFromBackend::SpeechRouteSelected(SpeechRoute::Bluetooth) => {
            "[speech] playing through Bluetooth".to_string()
        }
        MessageFromBackend::SpeechRouteSelected(SpeechRoute::Speaker) => {
            "[speech] playing through the speaker".to_string()
        }
        MessageFromBackend::AudioRouteReport(route) => format_route(route),
    };
    Some(line)
}
