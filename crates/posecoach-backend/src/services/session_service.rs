use posecoach_bridge::{
    MessageFromBackend, notification::NotificationType, state::SessionPhase,
};

use crate::error::SessionError;

/// Handles a start request (see
/// [`posecoach_bridge::MessageToBackend::StartExerciseSession`]).
///
/// The start sequence awaits the OS, so it runs on its own task; a stop
/// arriving meanwhile is dispatched immediately and supersedes it.
pub fn handle_start_request(context: super::AppContextHandle) {
    tokio::spawn(async move {
        let success = context.coordinator.start_exercise_session().await;

        if success {
            context
                .send_notification(NotificationType::Success, "Exercise session started")
                .await;
            let auto_start = context.state.read().await.config.auto_start_subsystems;
            if auto_start {
                match context.coordinator.start_subsystems().await {
                    Ok(()) => {}
                    Err(SessionError::NotActive) => {
                        log::debug!("Session stopped before all subsystems started");
                    }
                    Err(err) => {
                        log::error!("{err}");
                        context
                            .send_notification(NotificationType::Warning, err.to_string())
                            .await;
                    }
                }
            }
        } else if let Some(reason) = context.coordinator.resource_state().last_error {
            context
                .send_notification(NotificationType::Error, reason)
                .await;
        }

        context
            .send(MessageFromBackend::ExerciseSessionStarted { success })
            .await;
    });
}

/// Handles a stop request (see
/// [`posecoach_bridge::MessageToBackend::StopExerciseSession`]). Every
/// request is answered, including ones that had nothing to stop.
pub fn handle_stop_request(context: super::AppContextHandle) {
    tokio::spawn(async move {
        let was_running = context.coordinator.phase() != SessionPhase::Idle;
        context.coordinator.stop_exercise_session().await;
        if was_running {
            context
                .send_notification(NotificationType::Info, "Exercise session ended")
                .await;
        }
        context.send(MessageFromBackend::ExerciseSessionStopped).await;
    });
}

/// Pushes every published resource state to the frontend until the
/// coordinator goes away.
pub async fn forward_resource_state(context: super::AppContextHandle) {
    let mut states = context.coordinator.subscribe();
    loop {
        let state = states.borrow_and_update().clone();
        context
            .send(MessageFromBackend::ResourceStateUpdate(state))
            .await;
        if states.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use posecoach_bridge::config::Config;
    use tokio::sync::{RwLock, mpsc};

    use super::*;
    use crate::app::AppContext;
    use crate::permissions::{CameraAuthorization, RecordPermission};
    use crate::subsystems::{CameraSubsystem, VisionSubsystem};
    use crate::state::State;
    use crate::testing::Harness;

    fn context(
        harness: &Harness,
        config: Config,
    ) -> (Arc<AppContext>, mpsc::Receiver<MessageFromBackend>) {
        let (tx, rx) = mpsc::channel(16);
        let context = Arc::new(AppContext {
            state: Arc::new(RwLock::new(State { config })),
            coordinator: harness.coordinator.clone(),
            tx,
        });
        (context, rx)
    }

    async fn next_completion(rx: &mut mpsc::Receiver<MessageFromBackend>) -> MessageFromBackend {
        loop {
            match rx.recv().await {
                Some(MessageFromBackend::NotificationMessage(_)) => continue,
                Some(message) => return message,
                None => panic!("backend channel closed"),
            }
        }
    }

    #[tokio::test]
    async fn start_request_starts_subsystems() {
        let harness = Harness::granted();
        let (context, mut rx) = context(&harness, Config::default());

        handle_start_request(context.clone());
        assert!(matches!(
            next_completion(&mut rx).await,
            MessageFromBackend::ExerciseSessionStarted { success: true }
        ));
        assert_eq!(
            harness.log.since("camera.start"),
            ["camera.start", "vision.start", "voice.start"]
        );

        handle_stop_request(context);
        assert!(matches!(
            next_completion(&mut rx).await,
            MessageFromBackend::ExerciseSessionStopped
        ));
    }

    #[tokio::test]
    async fn failed_start_notifies_reason() {
        let harness = Harness::new(CameraAuthorization::Authorized, RecordPermission::Denied);
        let (context, mut rx) = context(&harness, Config::default());

        handle_start_request(context);
        match rx.recv().await {
            Some(MessageFromBackend::NotificationMessage(notification)) => {
                assert_eq!(notification.notification_type, NotificationType::Error);
                assert_eq!(notification.message, "Missing required permissions");
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(matches!(
            rx.recv().await,
            Some(MessageFromBackend::ExerciseSessionStarted { success: false })
        ));
    }

    #[tokio::test]
    async fn disabled_auto_start_leaves_subsystems_alone() {
        let harness = Harness::granted();
        let config = Config {
            auto_start_subsystems: false,
            ..Config::default()
        };
        let (context, mut rx) = context(&harness, config);

        handle_start_request(context);
        next_completion(&mut rx).await;
        assert_eq!(harness.log.count("camera.start"), 0);
    }

    #[tokio::test]
    async fn stop_between_session_start_and_subsystem_start() {
        let harness = Harness::granted();
        let hold = harness.camera.hold_start();
        let (context, mut rx) = context(&harness, Config::default());

        handle_start_request(context.clone());
        hold.entered().await;
        handle_stop_request(context);

        assert!(matches!(
            next_completion(&mut rx).await,
            MessageFromBackend::ExerciseSessionStopped
        ));
        hold.release();
        assert!(matches!(
            next_completion(&mut rx).await,
            MessageFromBackend::ExerciseSessionStarted { success: true }
        ));

        assert!(!harness.camera.is_active());
        assert!(!harness.vision.is_active());
        assert_eq!(harness.coordinator.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn stop_after_session_announces_the_end() {
        let harness = Harness::granted();
        let (context, mut rx) = context(&harness, Config::default());
        assert!(harness.coordinator.start_exercise_session().await);

        handle_stop_request(context);
        match rx.recv().await {
            Some(MessageFromBackend::NotificationMessage(notification)) => {
                assert_eq!(notification.notification_type, NotificationType::Info);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(matches!(
            rx.recv().await,
            Some(MessageFromBackend::ExerciseSessionStopped)
        ));
    }
}
