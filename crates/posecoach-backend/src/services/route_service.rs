use posecoach_audio::AudioRoute;
use posecoach_bridge::{
    MessageFromBackend,
    audio::{RouteChangeReason, RouteSummary, SpeechRoute},
    notification::NotificationType,
};

use crate::error::SessionError;

fn summarize(route: &AudioRoute) -> RouteSummary {
    RouteSummary {
        inputs: route.inputs.iter().map(|port| port.name.clone()).collect(),
        outputs: route.outputs.iter().map(|port| port.name.clone()).collect(),
        bluetooth: route.has_bluetooth(),
    }
}

/// Handles a request to route the next spoken message (see
/// [`posecoach_bridge::MessageToBackend::PrepareSpeech`]).
pub async fn handle_prepare_speech_request(context: super::AppContextHandle) {
    match context.coordinator.prepare_for_speech().await {
        Ok(plan) => {
            let route = if plan.uses_bluetooth() {
                SpeechRoute::Bluetooth
            } else {
                SpeechRoute::Speaker
            };
            context
                .send(MessageFromBackend::SpeechRouteSelected(route))
                .await;
        }
        Err(SessionError::NotActive) => {
            log::debug!("Ignoring speech preparation outside of an exercise session");
        }
        Err(err) => {
            log::warn!("{err}");
            context
                .send_notification(NotificationType::Warning, err.to_string())
                .await;
        }
    }
}

/// Handles an OS audio route change notification (see
/// [`posecoach_bridge::MessageToBackend::AudioRouteChanged`]).
pub async fn handle_route_change(context: super::AppContextHandle, reason: RouteChangeReason) {
    let route = context.coordinator.handle_route_change(reason);
    context
        .send(MessageFromBackend::AudioRouteReport(summarize(&route)))
        .await;
}
