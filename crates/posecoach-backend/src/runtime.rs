//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, the permission gate, the audio
//! session arbiter and the session coordinator, and runs the message
//! dispatch loop that listens to frontend bridge requests.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use posecoach_audio::{AudioSessionArbiter, device::HostAudioSession};
use posecoach_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::app::AppContext;
use crate::coordinator::SessionCoordinator;
use crate::permissions::PermissionGate;
use crate::services;
use crate::state::State;
use crate::subsystems::SubsystemHandles;

/// Initialize backend state and start processing frontend messages.
async fn setup_backend(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    subsystems: SubsystemHandles,
) {
    let config = crate::config::load_config_or_default().await;

    let permissions = PermissionGate::from_host_config(&config.host_permissions);
    let arbiter = AudioSessionArbiter::new(Arc::new(HostAudioSession::new()));
    let coordinator = Arc::new(SessionCoordinator::new(permissions, arbiter));
    coordinator.register_subsystems(subsystems);

    let state = Arc::new(RwLock::new(State { config }));
    let context = Arc::new(AppContext {
        state,
        coordinator,
        tx,
    });

    tokio::spawn(services::session_service::forward_resource_state(
        context.clone(),
    ));
    context.consume_bridge_messages(rx).await;

    // the frontend is gone, release whatever is still held
    context.coordinator.stop_exercise_session().await;
}

/// Spawn the backend runtime and begin processing bridge messages.
///
/// The returned thread finishes once the frontend side of the bridge closes
/// and any running exercise session has been released.
pub fn run(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    subsystems: SubsystemHandles,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                log::error!("Failed to build the backend runtime: {err}");
                return;
            }
        };
        runtime.block_on(async { setup_backend(rx, tx, subsystems).await });
    })
}
