//! Host stand-ins for the capture, pose and speech engines. They track their
//! running state and log the lifecycle calls the coordinator makes.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use posecoach_audio::{AudioSessionBackend, device::HostAudioSession};
use posecoach_backend::{CameraSubsystem, SubsystemError, VisionSubsystem, VoiceSubsystem};

#[derive(Default)]
pub struct HostCamera {
    running: AtomicBool,
}

#[async_trait]
impl CameraSubsystem for HostCamera {
    async fn start_session(&self) -> Result<(), SubsystemError> {
        if self.running.swap(true, Ordering::SeqCst) {
            log::debug!("Camera capture already running");
        } else {
            log::info!("Camera capture started");
        }
        Ok(())
    }

    async fn reset_session(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            log::info!("Camera capture released");
        }
    }

    fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct HostVision {
    processing: AtomicBool,
}

#[async_trait]
impl VisionSubsystem for HostVision {
    async fn start_processing(&self) -> Result<(), SubsystemError> {
        self.processing.store(true, Ordering::SeqCst);
        log::info!("Pose processing started");
        Ok(())
    }

    async fn stop_processing(&self) {
        if self.processing.swap(false, Ordering::SeqCst) {
            log::info!("Pose processing stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct HostVoice {
    listening: AtomicBool,
}

#[async_trait]
impl VoiceSubsystem for HostVoice {
    async fn start_listening(&self) -> Result<(), SubsystemError> {
        self.listening.store(true, Ordering::SeqCst);
        log::info!("Voice recognition listening");
        Ok(())
    }

    async fn stop_speaking(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            log::info!("Voice output and recognition stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn is_bluetooth_connected(&self) -> bool {
        HostAudioSession::new().current_route().has_bluetooth()
    }
}
