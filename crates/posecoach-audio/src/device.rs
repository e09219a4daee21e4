//! Desktop host implementation of the audio session backend.
//!
//! Desktop hosts have no system-wide audio session object, so category, mode
//! and override settings are kept in memory while activation and route
//! queries go to the default `cpal` host.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use cpal::{
    Device,
    traits::{DeviceTrait, HostTrait},
};

use crate::backend::{AudioSessionBackend, BackendError};
use crate::route::{AudioPort, AudioRoute, OutputOverride, PortKind};
use crate::session::{AudioCategory, AudioMode, CategoryOptions};

/// Fallback rate reported when the output device cannot be queried.
const FALLBACK_SAMPLE_RATE: f64 = 48_000.0;

#[derive(Debug)]
struct HostSessionState {
    active: bool,
    category: AudioCategory,
    mode: AudioMode,
    options: CategoryOptions,
    output_override: OutputOverride,
    preferred_sample_rate: Option<f64>,
    preferred_io_buffer_duration: Option<Duration>,
}

impl Default for HostSessionState {
    fn default() -> Self {
        Self {
            active: false,
            category: AudioCategory::Ambient,
            mode: AudioMode::Default,
            options: CategoryOptions::default(),
            output_override: OutputOverride::None,
            preferred_sample_rate: None,
            preferred_io_buffer_duration: None,
        }
    }
}

/// Audio session backed by the default `cpal` host.
#[derive(Debug, Default)]
pub struct HostAudioSession {
    state: Mutex<HostSessionState>,
}

impl HostAudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, HostSessionState> {
        // the state holds plain values, a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn describe(device: &Device) -> String {
    device
        .description()
        .map(|description| description.to_string())
        .unwrap_or_else(|_| "unknown device".to_string())
}

fn port_for(device: &Device, input: bool) -> AudioPort {
    let name = describe(device);
    AudioPort {
        kind: PortKind::from_description(&name, input),
        name,
    }
}

#[async_trait]
impl AudioSessionBackend for HostAudioSession {
    async fn set_active(&self, active: bool, notify_others: bool) -> Result<(), BackendError> {
        if !active {
            let mut state = self.state();
            if !state.active {
                return Err(BackendError::NotActive);
            }
            state.active = false;
            log::debug!("Host audio session deactivated (notify others: {notify_others})");
            return Ok(());
        }

        let category = self.state().category;
        let host = cpal::default_host();
        let needs_input = matches!(category, AudioCategory::Record | AudioCategory::PlayAndRecord);
        if needs_input && host.default_input_device().is_none() {
            return Err(BackendError::NoDevice("input"));
        }
        if category != AudioCategory::Record && host.default_output_device().is_none() {
            return Err(BackendError::NoDevice("output"));
        }

        let mut state = self.state();
        state.active = true;
        log::debug!(
            "Host audio session activated as {:?}/{:?} with {:?} (notify others: {notify_others})",
            state.category,
            state.mode,
            state.options,
        );
        Ok(())
    }

    fn set_category(
        &self,
        category: AudioCategory,
        mode: AudioMode,
        options: CategoryOptions,
    ) -> Result<(), BackendError> {
        let mut state = self.state();
        state.category = category;
        state.mode = mode;
        state.options = options;
        Ok(())
    }

    fn set_mode(&self, mode: AudioMode) -> Result<(), BackendError> {
        self.state().mode = mode;
        Ok(())
    }

    fn set_preferred_sample_rate(&self, sample_rate: f64) -> Result<(), BackendError> {
        if sample_rate <= 0.0 {
            return Err(BackendError::Rejected(format!(
                "invalid sample rate {sample_rate}"
            )));
        }
        self.state().preferred_sample_rate = Some(sample_rate);
        Ok(())
    }

    fn set_preferred_io_buffer_duration(&self, duration: Duration) -> Result<(), BackendError> {
        self.state().preferred_io_buffer_duration = Some(duration);
        Ok(())
    }

    fn override_output_port(&self, port: OutputOverride) -> Result<(), BackendError> {
        let mut state = self.state();
        if port == OutputOverride::Speaker && state.category != AudioCategory::PlayAndRecord {
            return Err(BackendError::Rejected(
                "speaker override requires the play-and-record category".to_string(),
            ));
        }
        state.output_override = port;
        Ok(())
    }

    fn current_route(&self) -> AudioRoute {
        let host = cpal::default_host();
        let output_override = self.state().output_override;

        let inputs = host
            .default_input_device()
            .map(|device| port_for(&device, true))
            .into_iter()
            .collect();

        let outputs = match output_override {
            OutputOverride::Speaker => host
                .output_devices()
                .ok()
                .and_then(|devices| {
                    devices
                        .map(|device| port_for(&device, false))
                        .find(|port| port.kind == PortKind::BuiltInSpeaker)
                })
                .or_else(|| {
                    host.default_output_device()
                        .map(|device| port_for(&device, false))
                }),
            OutputOverride::None => host
                .default_output_device()
                .map(|device| port_for(&device, false)),
        }
        .into_iter()
        .collect();

        AudioRoute { inputs, outputs }
    }

    fn sample_rate(&self) -> f64 {
        cpal::default_host()
            .default_output_device()
            .and_then(|device| device.default_output_config().ok())
            .map(|config| config.sample_rate() as f64)
            .unwrap_or_else(|| {
                self.state()
                    .preferred_sample_rate
                    .unwrap_or(FALLBACK_SAMPLE_RATE)
            })
    }

    fn io_buffer_duration(&self) -> Duration {
        let state = self.state();
        state
            .preferred_io_buffer_duration
            .unwrap_or(Duration::from_millis(10))
    }
}
