//! Application context and message dispatching utilities.
//!
//! The context holds the shared state and the session coordinator, and
//! provides helpers for sending responses and notifications back to the
//! frontend bridge.

use std::sync::Arc;

use posecoach_bridge::{MessageFromBackend, MessageToBackend, notification};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::coordinator::SessionCoordinator;
use crate::services;
use crate::state::SharedState;

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Runtime application state shared across services.
    pub state: SharedState,
    /// The single coordinator of the exercise session.
    pub coordinator: Arc<SessionCoordinator>,
    /// Outbound channel to the frontend bridge.
    pub tx: Sender<MessageFromBackend>,
}

impl AppContext {
    /// Read and dispatch messages from the frontend bridge until it closes.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a frontend message: {message:?}");
            self.dispatch_message(message).await;
        }
        log::info!("Frontend bridge closed");
    }

    /// Dispatches the received message from frontend down to individual
    /// service handlers.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        match message {
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::StartExerciseSession => {
                services::session_service::handle_start_request(self.clone());
            }
            MessageToBackend::StopExerciseSession => {
                services::session_service::handle_stop_request(self.clone());
            }
            MessageToBackend::PrepareSpeech => {
                services::route_service::handle_prepare_speech_request(self.clone()).await;
            }
            MessageToBackend::AudioRouteChanged(reason) => {
                services::route_service::handle_route_change(self.clone(), reason).await;
            }
        }
    }

    /// Send a message to the frontend bridge.
    pub async fn send(&self, message: MessageFromBackend) {
        if let Err(err) = self.tx.send(message).await {
            log::warn!("Dropping message for closed frontend: {:?}", err.0);
        }
    }

    /// Send a notification message to the frontend bridge.
    pub async fn send_notification(
        &self,
        notification_type: notification::NotificationType,
        content: impl Into<String>,
    ) {
        self.send(MessageFromBackend::NotificationMessage(
            notification::NotificationMessage {
                notification_type,
                message: content.into(),
            },
        ))
        .await;
    }
}
