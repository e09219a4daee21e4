//! Control surfaces of the camera, vision and voice subsystems.
//!
//! The application root owns the subsystems. The coordinator only keeps weak
//! references and resolves them at call time; a subsystem that is already
//! gone is skipped as if the call succeeded.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use async_trait::async_trait;

/// Identifies a subsystem in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemKind {
    Camera,
    Vision,
    Voice,
}

impl SubsystemKind {
    /// Capture order for starts. Releases use the same order.
    pub const ORDER: [SubsystemKind; 3] = [Self::Camera, Self::Vision, Self::Voice];
}

impl fmt::Display for SubsystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Camera => "camera",
            Self::Vision => "vision",
            Self::Voice => "voice",
        };
        f.write_str(name)
    }
}

/// Failure reported by a subsystem while starting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SubsystemError(pub String);

/// Camera capture. Exclusively owns the camera sensor.
#[async_trait]
pub trait CameraSubsystem: Send + Sync {
    async fn start_session(&self) -> Result<(), SubsystemError>;

    /// Releases the camera hardware. Safe to call when not running.
    async fn reset_session(&self);

    fn is_active(&self) -> bool;
}

/// Pose estimation consuming camera frames.
#[async_trait]
pub trait VisionSubsystem: Send + Sync {
    async fn start_processing(&self) -> Result<(), SubsystemError>;

    /// Stops consuming frames. Safe to call when idle.
    async fn stop_processing(&self);

    fn is_active(&self) -> bool;
}

/// Speech synthesis and recognition.
#[async_trait]
pub trait VoiceSubsystem: Send + Sync {
    async fn start_listening(&self) -> Result<(), SubsystemError>;

    /// Cuts in-flight synthesis and recognition. Safe to call when idle.
    async fn stop_speaking(&self);

    fn is_active(&self) -> bool;

    /// Whether a Bluetooth audio device is currently connected.
    fn is_bluetooth_connected(&self) -> bool;
}

/// Non-owning references to the three subsystems.
#[derive(Clone)]
pub struct SubsystemHandles {
    camera: Weak<dyn CameraSubsystem>,
    vision: Weak<dyn VisionSubsystem>,
    voice: Weak<dyn VoiceSubsystem>,
}

impl SubsystemHandles {
    pub fn new<C, V, S>(camera: &Arc<C>, vision: &Arc<V>, voice: &Arc<S>) -> Self
    where
        C: CameraSubsystem + 'static,
        V: VisionSubsystem + 'static,
        S: VoiceSubsystem + 'static,
    {
        let camera: Weak<dyn CameraSubsystem> = Arc::<C>::downgrade(camera);
        let vision: Weak<dyn VisionSubsystem> = Arc::<V>::downgrade(vision);
        let voice: Weak<dyn VoiceSubsystem> = Arc::<S>::downgrade(voice);
        Self {
            camera,
            vision,
            voice,
        }
    }

    pub fn camera(&self) -> Option<Arc<dyn CameraSubsystem>> {
        resolve(&self.camera, SubsystemKind::Camera)
    }

    pub fn vision(&self) -> Option<Arc<dyn VisionSubsystem>> {
        resolve(&self.vision, SubsystemKind::Vision)
    }

    pub fn voice(&self) -> Option<Arc<dyn VoiceSubsystem>> {
        resolve(&self.voice, SubsystemKind::Voice)
    }

    /// Starts one subsystem. A subsystem that is gone counts as started.
    pub async fn start(&self, kind: SubsystemKind) -> Result<(), SubsystemError> {
        match kind {
            SubsystemKind::Camera => match self.camera() {
                Some(camera) => camera.start_session().await,
                None => Ok(()),
            },
            SubsystemKind::Vision => match self.vision() {
                Some(vision) => vision.start_processing().await,
                None => Ok(()),
            },
            SubsystemKind::Voice => match self.voice() {
                Some(voice) => voice.start_listening().await,
                None => Ok(()),
            },
        }
    }

    /// Issues the stop signal of one subsystem.
    pub async fn stop(&self, kind: SubsystemKind) {
        match kind {
            SubsystemKind::Camera => {
                if let Some(camera) = self.camera() {
                    camera.reset_session().await;
                    log::debug!("Camera session reset");
                }
            }
            SubsystemKind::Vision => {
                if let Some(vision) = self.vision() {
                    vision.stop_processing().await;
                    log::debug!("Vision processing stopped");
                }
            }
            SubsystemKind::Voice => {
                if let Some(voice) = self.voice() {
                    voice.stop_speaking().await;
                    log::debug!("Voice stopped");
                }
            }
        }
    }

    /// Issues the stop signals in the fixed release order: camera, vision,
    /// voice.
    pub async fn stop_all(&self) {
        for kind in SubsystemKind::ORDER {
            self.stop(kind).await;
        }
    }

    /// Whether the voice subsystem reports a Bluetooth device. A missing
    /// voice subsystem counts as no Bluetooth.
    pub fn is_bluetooth_connected(&self) -> bool {
        self.voice()
            .is_some_and(|voice| voice.is_bluetooth_connected())
    }

    /// Active flags of camera, vision and voice, `false` for gone ones.
    pub fn activity(&self) -> [(SubsystemKind, bool); 3] {
        [
            (
                SubsystemKind::Camera,
                self.camera().is_some_and(|camera| camera.is_active()),
            ),
            (
                SubsystemKind::Vision,
                self.vision().is_some_and(|vision| vision.is_active()),
            ),
            (
                SubsystemKind::Voice,
                self.voice().is_some_and(|voice| voice.is_active()),
            ),
        ]
    }
}

fn resolve<T: ?Sized>(handle: &Weak<T>, kind: SubsystemKind) -> Option<Arc<T>> {
    let resolved = handle.upgrade();
    if resolved.is_none() {
        log::debug!("The {kind} subsystem is no longer available, skipping");
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, FakeCamera, FakeVision, FakeVoice};

    #[tokio::test]
    async fn stop_all_follows_release_order() {
        let log = CallLog::default();
        let camera = Arc::new(FakeCamera::new(&log));
        let vision = Arc::new(FakeVision::new(&log));
        let voice = Arc::new(FakeVoice::new(&log));
        let handles = SubsystemHandles::new(&camera, &vision, &voice);

        handles.stop_all().await;
        assert_eq!(log.calls(), ["camera.reset", "vision.stop", "voice.stop"]);
    }

    #[tokio::test]
    async fn dropped_subsystems_are_skipped() {
        let log = CallLog::default();
        let camera = Arc::new(FakeCamera::new(&log));
        let vision = Arc::new(FakeVision::new(&log));
        let voice = Arc::new(FakeVoice::new(&log));
        voice.set_bluetooth(true);
        let handles = SubsystemHandles::new(&camera, &vision, &voice);

        drop(vision);
        drop(voice);
        handles.stop_all().await;
        for kind in SubsystemKind::ORDER {
            handles.start(kind).await.unwrap();
        }

        assert_eq!(log.calls(), ["camera.reset", "camera.start"]);
        assert!(!handles.is_bluetooth_connected());
    }

    #[tokio::test]
    async fn start_failure_is_reported() {
        let log = CallLog::default();
        let camera = Arc::new(FakeCamera::new(&log));
        let vision = Arc::new(FakeVision::new(&log));
        let voice = Arc::new(FakeVoice::new(&log));
        vision.fail_start("model missing");
        let handles = SubsystemHandles::new(&camera, &vision, &voice);

        handles.start(SubsystemKind::Camera).await.unwrap();
        let err = handles.start(SubsystemKind::Vision).await.unwrap_err();
        assert_eq!(err.0, "model missing");
        assert_eq!(log.calls(), ["camera.start", "vision.start"]);
        assert_eq!(
            handles.activity(),
            [
                (SubsystemKind::Camera, true),
                (SubsystemKind::Vision, false),
                (SubsystemKind::Voice, false),
            ]
        );
    }
}
