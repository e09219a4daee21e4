//! Exercise session state machine.
//!
//! ```text
//! Idle -> CheckingPermissions -> ConfiguringAudio -> Active
//!   ^            |                      |              |
//!   |            +---- denied/failed ---+              | stop
//!   |                                                  v
//!   +----------------------------------------------- CleaningUp
//! ```
//!
//! All transitions happen under one lock and are published as a
//! [`ResourceState`] snapshot. The lock is never held across an await; the
//! asynchronous steps (permission prompt, audio activation, subsystem stops)
//! run between two short critical sections. A stop bumps the generation
//! counter, which tells an in-flight start that it was superseded.

use std::sync::{Arc, Mutex, MutexGuard};

use posecoach_audio::{AudioRoute, AudioSessionArbiter, RoutePlan};
use posecoach_bridge::{
    audio::RouteChangeReason,
    state::{ResourceState, SessionPhase},
};
use tokio::sync::watch;

use crate::error::SessionError;
use crate::permissions::PermissionGate;
use crate::subsystems::{SubsystemHandles, SubsystemKind};

#[derive(Debug, Default)]
struct Inner {
    phase: SessionPhase,
    /// Incremented by every start and every stop that does work.
    generation: u64,
    initialized: bool,
    last_error: Option<String>,
}

/// Coordinates permissions, the shared audio session and the subsystems for
/// one exercise session at a time.
pub struct SessionCoordinator {
    permissions: PermissionGate,
    arbiter: AudioSessionArbiter,
    subsystems: Mutex<Option<SubsystemHandles>>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<ResourceState>,
}

impl SessionCoordinator {
    pub fn new(permissions: PermissionGate, arbiter: AudioSessionArbiter) -> Self {
        let (state_tx, _) = watch::channel(ResourceState::default());
        Self {
            permissions,
            arbiter,
            subsystems: Mutex::new(None),
            inner: Mutex::new(Inner::default()),
            state_tx,
        }
    }

    /// Receiver observing every published [`ResourceState`].
    pub fn subscribe(&self) -> watch::Receiver<ResourceState> {
        self.state_tx.subscribe()
    }

    /// The most recently published state.
    pub fn resource_state(&self) -> ResourceState {
        self.state_tx.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    /// Registers the subsystem references and marks the state initialized.
    pub fn register_subsystems(&self, handles: SubsystemHandles) {
        *self
            .subsystems
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handles);

        let mut inner = self.lock();
        inner.initialized = true;
        self.publish(&inner);
        log::info!("Subsystems registered with the session coordinator");
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // transitions are single assignments, a poisoned state is consistent
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn subsystems(&self) -> Option<SubsystemHandles> {
        self.subsystems
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(ResourceState::new(
            inner.phase,
            inner.initialized,
            inner.last_error.clone(),
        ));
    }

    fn transition(&self, inner: &mut Inner, phase: SessionPhase) {
        log::info!("Exercise session: {} -> {}", inner.phase, phase);
        inner.phase = phase;
        self.publish(inner);
    }

    fn fail_start(&self, inner: &mut Inner, error: SessionError) -> bool {
        match std::error::Error::source(&error) {
            Some(cause) => log::error!("Exercise session failed to start: {error}: {cause}"),
            None => log::error!("Exercise session failed to start: {error}"),
        }
        inner.last_error = Some(error.to_string());
        self.transition(inner, SessionPhase::Idle);
        false
    }

    /// Runs the start sequence: permission check, audio configuration,
    /// activation. Resolves to whether the session is active.
    ///
    /// A start while another one is in flight, or while cleaning up, is
    /// rejected. A start while already active succeeds without doing work.
    pub async fn start_exercise_session(&self) -> bool {
        let generation = {
            let mut inner = self.lock();
            match inner.phase {
                SessionPhase::Idle => {}
                SessionPhase::Active => {
                    log::debug!("Exercise session is already active");
                    return true;
                }
                phase => {
                    log::warn!("Rejecting exercise session start while {phase}");
                    return false;
                }
            }
            inner.generation += 1;
            inner.last_error = None;
            self.transition(&mut inner, SessionPhase::CheckingPermissions);
            inner.generation
        };

        let snapshot = self.permissions.check_all().await;
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                log::debug!("Exercise session start superseded during permission check");
                return false;
            }
            if !PermissionGate::all_granted(&snapshot) {
                return self.fail_start(&mut inner, SessionError::PermissionDenied);
            }
            self.transition(&mut inner, SessionPhase::ConfiguringAudio);
        }

        let configured = self.arbiter.configure_for_session().await;
        {
            let mut inner = self.lock();
            if inner.generation == generation {
                return match configured {
                    Ok(_) => {
                        self.transition(&mut inner, SessionPhase::Active);
                        true
                    }
                    Err(err) => self.fail_start(&mut inner, SessionError::AudioConfiguration(err)),
                };
            }
        }

        // the superseding stop may have torn down before this configuration
        // was applied
        log::debug!("Exercise session start superseded during audio configuration");
        if let Ok(epoch) = configured {
            if let Err(err) = self.arbiter.release(epoch).await {
                log::warn!("Releasing superseded audio configuration: {err}");
            }
        }
        false
    }

    /// Releases the session: camera, vision, voice, then the audio session.
    ///
    /// Safe to call any number of times from any trigger. When idle it
    /// returns without doing anything; when another stop is cleaning up it
    /// waits for that stop to finish. A stop during a start supersedes it.
    pub async fn stop_exercise_session(&self) {
        let cleanup_running = {
            let mut inner = self.lock();
            match inner.phase {
                SessionPhase::Idle => {
                    log::debug!("Exercise session stop ignored while idle");
                    return;
                }
                SessionPhase::CleaningUp => true,
                _ => {
                    inner.generation += 1;
                    self.transition(&mut inner, SessionPhase::CleaningUp);
                    false
                }
            }
        };

        if cleanup_running {
            log::debug!("Exercise session is already cleaning up, waiting for it");
            let mut states = self.subscribe();
            // the sender lives in `self`, so this only resolves on a phase change
            let _ = states
                .wait_for(|state| state.phase != SessionPhase::CleaningUp)
                .await;
            return;
        }

        if let Some(subsystems) = self.subsystems() {
            subsystems.stop_all().await;
        }

        if let Err(err) = self.arbiter.teardown().await {
            log::warn!("Continuing exercise session stop: {err}");
        }

        let mut inner = self.lock();
        self.transition(&mut inner, SessionPhase::Idle);
    }

    /// Starts camera, vision and voice in that order. Only allowed while the
    /// session is active, so capture never starts before permissions and the
    /// audio session are ready.
    ///
    /// A stop arriving while a subsystem is starting wins: whatever was
    /// started is stopped again and [`SessionError::NotActive`] is returned.
    pub async fn start_subsystems(&self) -> Result<(), SessionError> {
        let generation = {
            let inner = self.lock();
            if inner.phase != SessionPhase::Active {
                return Err(SessionError::NotActive);
            }
            inner.generation
        };
        let Some(subsystems) = self.subsystems() else {
            return Ok(());
        };

        for (index, kind) in SubsystemKind::ORDER.into_iter().enumerate() {
            subsystems
                .start(kind)
                .await
                .map_err(|source| SessionError::SubsystemStart { kind, source })?;

            if self.lock().generation != generation {
                log::debug!("Exercise session stopped while the {kind} subsystem started");
                for started in &SubsystemKind::ORDER[..=index] {
                    subsystems.stop(*started).await;
                }
                return Err(SessionError::NotActive);
            }
        }
        log::info!("Subsystems started: {:?}", subsystems.activity());
        Ok(())
    }

    /// Re-evaluates the output route before a spoken message plays.
    pub async fn prepare_for_speech(&self) -> Result<RoutePlan, SessionError> {
        if self.phase() != SessionPhase::Active {
            return Err(SessionError::NotActive);
        }
        let bluetooth = self
            .subsystems()
            .is_some_and(|subsystems| subsystems.is_bluetooth_connected());

        let plan = self
            .arbiter
            .route_for_speech(bluetooth)
            .await
            .map_err(SessionError::AudioRoute)?;
        log::info!(
            "Speech routed to {}",
            if plan.uses_bluetooth() { "Bluetooth" } else { "speaker" }
        );
        Ok(plan)
    }

    /// Handles an OS route change notification. The route is only logged;
    /// it is re-evaluated before the next spoken message.
    pub fn handle_route_change(&self, reason: RouteChangeReason) -> AudioRoute {
        let route = self.arbiter.current_route();
        log::info!(
            "Audio route changed ({reason:?}) while {}: {route}",
            self.phase()
        );
        route
    }
}
