use std::{fmt, sync::Arc};

use tokio::sync::Mutex;

use crate::backend::{AudioSessionBackend, BackendError};
use crate::route::{self, AudioRoute, RoutePlan};
use crate::session::AudioSessionConfig;

/// Step of [`AudioSessionArbiter::configure_for_session`] that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStage {
    /// Deactivating a previously active session.
    Deactivate,
    /// Applying category, mode and options.
    Category,
    /// Activating the configured session.
    Activate,
}

impl fmt::Display for ConfigStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deactivate => "deactivate",
            Self::Category => "category",
            Self::Activate => "activate",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while arbitrating the shared audio session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// Configuration was aborted. The session is left in whatever state the
    /// OS put it in.
    #[error("audio session configuration failed at {stage} stage: {source}")]
    ConfigurationFailed {
        stage: ConfigStage,
        #[source]
        source: BackendError,
    },
    /// Deactivation failed on teardown. Non-fatal.
    #[error("audio teardown failed: {0}")]
    TeardownFailed(#[source] BackendError),
    /// The output route or mode for a spoken message could not be applied.
    #[error("failed to apply audio route: {0}")]
    RouteFailed(#[source] BackendError),
}

#[derive(Debug, Default)]
struct ArbiterState {
    /// Set once a configuration completed, cleared on teardown.
    configured: bool,
    /// Incremented by every configuration attempt.
    epoch: u64,
}

/// Sole owner of the shared audio session configuration.
///
/// Every mutation takes the internal lock for its whole duration, so a
/// teardown requested while a configuration is in flight runs once that
/// configuration finished and never interleaves with it.
pub struct AudioSessionArbiter {
    backend: Arc<dyn AudioSessionBackend>,
    config: AudioSessionConfig,
    state: Mutex<ArbiterState>,
}

impl AudioSessionArbiter {
    /// Creates an arbiter applying the canonical dual-duplex configuration.
    pub fn new(backend: Arc<dyn AudioSessionBackend>) -> Self {
        Self {
            backend,
            config: AudioSessionConfig::dual_duplex(),
            state: Mutex::new(ArbiterState::default()),
        }
    }

    /// Whether the last configuration succeeded and was not torn down yet.
    pub async fn is_configured(&self) -> bool {
        self.state.lock().await.configured
    }

    /// Applies the configuration: deactivate, configure, set hints, activate.
    ///
    /// Resolves to the epoch of the applied configuration, which
    /// [`Self::release`] takes to undo exactly this configuration.
    pub async fn configure_for_session(&self) -> Result<u64, AudioError> {
        let mut state = self.state.lock().await;
        state.configured = false;
        state.epoch += 1;

        match self.backend.set_active(false, false).await {
            Ok(()) | Err(BackendError::NotActive) => {}
            Err(source) => {
                return Err(AudioError::ConfigurationFailed {
                    stage: ConfigStage::Deactivate,
                    source,
                });
            }
        }

        self.backend
            .set_category(self.config.category, self.config.mode, self.config.options)
            .map_err(|source| AudioError::ConfigurationFailed {
                stage: ConfigStage::Category,
                source,
            })?;

        self.apply_hints();

        self.backend
            .set_active(true, true)
            .await
            .map_err(|source| AudioError::ConfigurationFailed {
                stage: ConfigStage::Activate,
                source,
            })?;

        state.configured = true;
        log::info!(
            "Audio session configured ({:?}/{:?}), running at {} Hz with {:?} buffers. Route: {}",
            self.config.category,
            self.config.mode,
            self.backend.sample_rate(),
            self.backend.io_buffer_duration(),
            self.backend.current_route(),
        );
        Ok(state.epoch)
    }

    // hardware may not honour the preferred values; mismatches are not errors
    fn apply_hints(&self) {
        if let Err(err) = self
            .backend
            .set_preferred_sample_rate(self.config.preferred_sample_rate)
        {
            log::warn!("Preferred sample rate was not accepted: {err}");
        }
        if let Err(err) = self
            .backend
            .set_preferred_io_buffer_duration(self.config.preferred_io_buffer_duration)
        {
            log::warn!("Preferred I/O buffer duration was not accepted: {err}");
        }
    }

    /// Deactivates the session and lets other audio clients resume.
    ///
    /// Deactivating an inactive session is a success. Any other failure is
    /// returned for the caller to log; the session should be considered
    /// released either way.
    pub async fn teardown(&self) -> Result<(), AudioError> {
        let mut state = self.state.lock().await;
        self.deactivate(&mut state).await
    }

    /// Tears down the configuration of `epoch` if it is still in place.
    ///
    /// Does nothing when that configuration was already torn down or a newer
    /// one replaced it.
    pub async fn release(&self, epoch: u64) -> Result<(), AudioError> {
        let mut state = self.state.lock().await;
        if state.epoch != epoch || !state.configured {
            log::debug!(
                "Audio configuration {epoch} already released (current: {}, configured: {})",
                state.epoch,
                state.configured
            );
            return Ok(());
        }
        self.deactivate(&mut state).await
    }

    async fn deactivate(&self, state: &mut ArbiterState) -> Result<(), AudioError> {
        let was_configured = std::mem::take(&mut state.configured);

        match self.backend.set_active(false, true).await {
            Ok(()) => {
                log::info!("Audio session deactivated");
                Ok(())
            }
            Err(BackendError::NotActive) => {
                log::debug!(
                    "Audio session was already inactive (configured: {was_configured})"
                );
                Ok(())
            }
            Err(err) => Err(AudioError::TeardownFailed(err)),
        }
    }

    /// Applies the routing decision for the next spoken message.
    pub async fn apply_route(&self, plan: RoutePlan) -> Result<(), AudioError> {
        let _state = self.state.lock().await;

        if let Some(mode) = plan.mode {
            self.backend.set_mode(mode).map_err(AudioError::RouteFailed)?;
        }
        self.backend
            .override_output_port(plan.output)
            .map_err(AudioError::RouteFailed)?;

        log::debug!("Applied route {plan:?}, now {}", self.backend.current_route());
        Ok(())
    }

    /// Selects and applies the route for a spoken message.
    pub async fn route_for_speech(&self, bluetooth_connected: bool) -> Result<RoutePlan, AudioError> {
        let plan = route::select_route(bluetooth_connected);
        self.apply_route(plan).await?;
        Ok(plan)
    }

    /// Current route, for diagnostics.
    pub fn current_route(&self) -> AudioRoute {
        self.backend.current_route()
    }
}
