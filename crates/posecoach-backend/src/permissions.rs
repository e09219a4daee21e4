//! Camera and microphone authorization.
//!
//! The OS decides; the gate only asks. A resource that was never decided is
//! prompted once per check, anything already decided is reported as is.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use posecoach_bridge::config::{HostAuthorization, HostPermissionsConfig, MicrophoneApi};
use tokio::sync::oneshot;

/// Camera authorization status as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAuthorization {
    NotDetermined,
    /// Blocked by policy (e.g., parental controls); cannot be prompted.
    Restricted,
    Denied,
    Authorized,
}

/// Microphone record permission as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPermission {
    Undetermined,
    Denied,
    Granted,
}

/// Completion handler of the legacy microphone permission request.
pub type PermissionCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// OS camera authorization API.
#[async_trait]
pub trait CameraPermissionApi: Send + Sync {
    fn authorization_status(&self) -> CameraAuthorization;

    /// Shows the OS prompt and resolves with the user's answer.
    async fn request_access(&self) -> bool;
}

/// Current OS microphone permission API.
#[async_trait]
pub trait RecordPermissionApi: Send + Sync {
    fn record_permission(&self) -> RecordPermission;

    async fn request_record_permission(&self) -> bool;
}

/// Legacy OS microphone permission API reporting through a callback.
pub trait LegacyRecordPermissionApi: Send + Sync {
    fn record_permission(&self) -> RecordPermission;

    fn request_record_permission(&self, callback: PermissionCallback);
}

/// Microphone permission behind either OS API shape.
#[derive(Clone)]
pub enum MicrophonePermission {
    Current(Arc<dyn RecordPermissionApi>),
    Legacy(Arc<dyn LegacyRecordPermissionApi>),
}

impl MicrophonePermission {
    fn record_permission(&self) -> RecordPermission {
        match self {
            Self::Current(api) => api.record_permission(),
            Self::Legacy(api) => api.record_permission(),
        }
    }

    async fn request(&self) -> bool {
        match self {
            Self::Current(api) => api.request_record_permission().await,
            Self::Legacy(api) => {
                let (tx, rx) = oneshot::channel();
                api.request_record_permission(Box::new(move |granted| {
                    let _ = tx.send(granted);
                }));
                // a callback dropped without firing counts as a refusal
                rx.await.unwrap_or(false)
            }
        }
    }

    /// Resolves to whether recording is allowed, prompting if undecided.
    pub async fn authorize(&self) -> bool {
        match self.record_permission() {
            RecordPermission::Granted => true,
            RecordPermission::Denied => false,
            RecordPermission::Undetermined => self.request().await,
        }
    }
}

/// Result of one permission check cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionSnapshot {
    pub camera_authorized: bool,
    pub microphone_authorized: bool,
}

/// Checks and requests the camera and microphone permissions an exercise
/// session needs.
#[derive(Clone)]
pub struct PermissionGate {
    camera: Arc<dyn CameraPermissionApi>,
    microphone: MicrophonePermission,
}

impl PermissionGate {
    pub fn new(camera: Arc<dyn CameraPermissionApi>, microphone: MicrophonePermission) -> Self {
        Self { camera, microphone }
    }

    /// Builds a gate over the host permission store described by `config`.
    pub fn from_host_config(config: &HostPermissionsConfig) -> Self {
        let store = Arc::new(HostPermissions::new(config));
        let microphone = match config.microphone_api {
            MicrophoneApi::Current => MicrophonePermission::Current(store.clone()),
            MicrophoneApi::Legacy => MicrophonePermission::Legacy(store.clone()),
        };
        Self::new(store, microphone)
    }

    /// Queries both permissions, prompting for the undecided ones.
    ///
    /// Never fails; a missing permission is reported as `false`.
    pub async fn check_all(&self) -> PermissionSnapshot {
        let camera_authorized = match self.camera.authorization_status() {
            CameraAuthorization::Authorized => true,
            CameraAuthorization::Denied | CameraAuthorization::Restricted => false,
            CameraAuthorization::NotDetermined => self.camera.request_access().await,
        };
        let microphone_authorized = self.microphone.authorize().await;

        let snapshot = PermissionSnapshot {
            camera_authorized,
            microphone_authorized,
        };
        log::info!("Permission check finished: {snapshot:?}");
        snapshot
    }

    pub fn all_granted(snapshot: &PermissionSnapshot) -> bool {
        snapshot.camera_authorized && snapshot.microphone_authorized
    }
}

#[derive(Debug)]
struct HostDecisions {
    camera: HostAuthorization,
    microphone: HostAuthorization,
}

/// Desktop stand-in for the OS permission store.
///
/// Answers undecided prompts with the configured `grant_on_prompt` value and
/// remembers the answer, so later checks report the decision without
/// prompting again.
#[derive(Debug)]
pub struct HostPermissions {
    decisions: Mutex<HostDecisions>,
    grant_on_prompt: bool,
    prompts: AtomicUsize,
}

impl HostPermissions {
    pub fn new(config: &HostPermissionsConfig) -> Self {
        Self {
            decisions: Mutex::new(HostDecisions {
                camera: config.camera,
                microphone: config.microphone,
            }),
            grant_on_prompt: config.grant_on_prompt,
            prompts: AtomicUsize::new(0),
        }
    }

    /// Number of prompts shown so far.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    fn decisions(&self) -> std::sync::MutexGuard<'_, HostDecisions> {
        self.decisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn prompt(&self, select: impl FnOnce(&mut HostDecisions) -> &mut HostAuthorization) -> bool {
        let mut decisions = self.decisions();
        let decision = select(&mut *decisions);
        if *decision == HostAuthorization::NotDetermined {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            *decision = if self.grant_on_prompt {
                HostAuthorization::Authorized
            } else {
                HostAuthorization::Denied
            };
        }
        *decision == HostAuthorization::Authorized
    }

    fn microphone_permission(&self) -> RecordPermission {
        match self.decisions().microphone {
            HostAuthorization::Authorized => RecordPermission::Granted,
            HostAuthorization::Denied => RecordPermission::Denied,
            HostAuthorization::NotDetermined => RecordPermission::Undetermined,
        }
    }
}

#[async_trait]
impl CameraPermissionApi for HostPermissions {
    fn authorization_status(&self) -> CameraAuthorization {
        match self.decisions().camera {
            HostAuthorization::Authorized => CameraAuthorization::Authorized,
            HostAuthorization::Denied => CameraAuthorization::Denied,
            HostAuthorization::NotDetermined => CameraAuthorization::NotDetermined,
        }
    }

    async fn request_access(&self) -> bool {
        self.prompt(|decisions| &mut decisions.camera)
    }
}

#[async_trait]
impl RecordPermissionApi for HostPermissions {
    fn record_permission(&self) -> RecordPermission {
        self.microphone_permission()
    }

    async fn request_record_permission(&self) -> bool {
        self.prompt(|decisions| &mut decisions.microphone)
    }
}

impl LegacyRecordPermissionApi for HostPermissions {
    fn record_permission(&self) -> RecordPermission {
        self.microphone_permission()
    }

    fn request_record_permission(&self, callback: PermissionCallback) {
        callback(self.prompt(|decisions| &mut decisions.microphone));
    }
}
