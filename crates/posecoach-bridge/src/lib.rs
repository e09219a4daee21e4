//! Communication bridge between the exercise UI and the session backend.
//!
//! This crate defines the types and protocols used to connect a frontend
//! (screens, skeleton overlay, console) with the asynchronous backend that
//! coordinates camera, vision and voice around one shared audio session.
//!
//! The design is lightweight and unidirectional:
//! - The frontend sends commands (e.g., start or stop an exercise session,
//!   prepare the route before a spoken message).
//! - The backend pushes events (e.g., resource state changes, session start
//!   results, notifications).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`].

pub mod audio;
pub mod config;
pub mod notification;
pub mod state;

use tokio::sync::mpsc::{self, Receiver, Sender};

/// Messages emitted by the backend to inform the frontend of state updates.
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// Generic message for all notifications in the application.
    NotificationMessage(notification::NotificationMessage),
    /// Response to the configuration request from the frontend.
    ConfigurationResponse(config::Config),
    /// The aggregate resource state changed.
    ResourceStateUpdate(state::ResourceState),
    /// Completion of a [`MessageToBackend::StartExerciseSession`] request.
    ExerciseSessionStarted { success: bool },
    /// Completion of a [`MessageToBackend::StopExerciseSession`] request.
    /// Sent for every stop request, including ones that were no-ops.
    ExerciseSessionStopped,
    /// Route chosen for the next spoken message.
    SpeechRouteSelected(audio::SpeechRoute),
    /// Current audio route, reported after an OS route change.
    AudioRouteReport(audio::RouteSummary),
}

/// Commands issued by the frontend to control or query the backend.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    StartExerciseSession,
    StopExerciseSession,
    /// A spoken message is about to play; re-evaluate the output route.
    PrepareSpeech,
    /// The OS reported a change of the audio route.
    AudioRouteChanged(audio::RouteChangeReason),
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// frontend and backend.
pub struct BridgeChannels {
    /// Receiver used by the frontend to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the frontend to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the frontend.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the frontend.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
