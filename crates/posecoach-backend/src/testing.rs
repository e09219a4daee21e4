//! Recording test doubles for the subsystems, the permission APIs and the OS
//! audio session.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use posecoach_audio::{
    AudioCategory, AudioMode, AudioRoute, AudioSessionArbiter, AudioSessionBackend, BackendError,
    CategoryOptions, OutputOverride,
};
use tokio::sync::Notify;

use crate::coordinator::SessionCoordinator;
use crate::permissions::{
    CameraAuthorization, CameraPermissionApi, MicrophonePermission, PermissionGate,
    RecordPermission, RecordPermissionApi,
};
use crate::subsystems::{
    CameraSubsystem, SubsystemError, SubsystemHandles, VisionSubsystem, VoiceSubsystem,
};

/// Ordered record of calls made on the doubles.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// Calls recorded after the first occurrence of `marker`, inclusive.
    pub fn since(&self, marker: &str) -> Vec<String> {
        let calls = self.calls();
        match calls.iter().position(|call| call == marker) {
            Some(index) => calls[index..].to_vec(),
            None => Vec::new(),
        }
    }
}

fn start_result(
    log: &CallLog,
    name: &str,
    failure: &Mutex<Option<String>>,
    active: &AtomicBool,
) -> Result<(), SubsystemError> {
    log.record(format!("{name}.start"));
    match failure.lock().unwrap().clone() {
        Some(message) => Err(SubsystemError(message)),
        None => {
            active.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}

/// Parks a call until the test releases it.
#[derive(Default)]
pub struct Hold {
    entered: Notify,
    release: Notify,
}

impl Hold {
    async fn block(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    /// Resolves once the held call is parked.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

fn take_hold(slot: &Mutex<Option<Arc<Hold>>>) -> Option<Arc<Hold>> {
    slot.lock().unwrap().take()
}

fn set_hold(slot: &Mutex<Option<Arc<Hold>>>) -> Arc<Hold> {
    let hold = Arc::new(Hold::default());
    *slot.lock().unwrap() = Some(hold.clone());
    hold
}

pub struct FakeCamera {
    log: CallLog,
    active: AtomicBool,
    failure: Mutex<Option<String>>,
    start_hold: Mutex<Option<Arc<Hold>>>,
    reset_hold: Mutex<Option<Arc<Hold>>>,
}

impl FakeCamera {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            active: AtomicBool::new(false),
            failure: Mutex::new(None),
            start_hold: Mutex::new(None),
            reset_hold: Mutex::new(None),
        }
    }

    /// Parks the next `start_session` before the camera comes up.
    pub fn hold_start(&self) -> Arc<Hold> {
        set_hold(&self.start_hold)
    }

    /// Parks the next `reset_session` after it was recorded.
    pub fn hold_reset(&self) -> Arc<Hold> {
        set_hold(&self.reset_hold)
    }
}

#[async_trait]
impl CameraSubsystem for FakeCamera {
    async fn start_session(&self) -> Result<(), SubsystemError> {
        if let Some(hold) = take_hold(&self.start_hold) {
            hold.block().await;
        }
        start_result(&self.log, "camera", &self.failure, &self.active)
    }

    async fn reset_session(&self) {
        self.log.record("camera.reset");
        if let Some(hold) = take_hold(&self.reset_hold) {
            hold.block().await;
        }
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

pub struct FakeVision {
    log: CallLog,
    active: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl FakeVision {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            active: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_start(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl VisionSubsystem for FakeVision {
    async fn start_processing(&self) -> Result<(), SubsystemError> {
        start_result(&self.log, "vision", &self.failure, &self.active)
    }

    async fn stop_processing(&self) {
        self.log.record("vision.stop");
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

pub struct FakeVoice {
    log: CallLog,
    active: AtomicBool,
    bluetooth: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl FakeVoice {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            active: AtomicBool::new(false),
            bluetooth: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }

    pub fn set_bluetooth(&self, connected: bool) {
        self.bluetooth.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoiceSubsystem for FakeVoice {
    async fn start_listening(&self) -> Result<(), SubsystemError> {
        start_result(&self.log, "voice", &self.failure, &self.active)
    }

    async fn stop_speaking(&self) {
        self.log.record("voice.stop");
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn is_bluetooth_connected(&self) -> bool {
        self.bluetooth.load(Ordering::SeqCst)
    }
}

/// OS audio session double. Calls are recorded with an `audio.` prefix.
pub struct FakeAudioBackend {
    log: CallLog,
    active: Mutex<bool>,
    failures: Mutex<Vec<(&'static str, BackendError)>>,
    activation_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeAudioBackend {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            active: Mutex::new(false),
            failures: Mutex::new(Vec::new()),
            activation_gate: Mutex::new(None),
        }
    }

    /// Makes the named call (e.g. `"activate"`) fail with `error`.
    pub fn fail(&self, call: &'static str, error: BackendError) {
        self.failures.lock().unwrap().push((call, error));
    }

    /// Holds activation until the returned gate is notified.
    pub fn hold_activation(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.activation_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn is_active(&self) -> bool {
        *self.active.lock().unwrap()
    }

    fn record(&self, call: &str) -> Result<(), BackendError> {
        self.log.record(format!("audio.{call}"));
        let failures = self.failures.lock().unwrap();
        match failures.iter().find(|(name, _)| *name == call) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AudioSessionBackend for FakeAudioBackend {
    async fn set_active(&self, active: bool, notify_others: bool) -> Result<(), BackendError> {
        if active {
            let gate = self.activation_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.record("activate")?;
            *self.active.lock().unwrap() = true;
            return Ok(());
        }

        self.record(if notify_others {
            "deactivate_notify"
        } else {
            "deactivate"
        })?;
        let mut current = self.active.lock().unwrap();
        if !*current {
            return Err(BackendError::NotActive);
        }
        *current = false;
        Ok(())
    }

    fn set_category(
        &self,
        _category: AudioCategory,
        _mode: AudioMode,
        _options: CategoryOptions,
    ) -> Result<(), BackendError> {
        self.record("category")
    }

    fn set_mode(&self, mode: AudioMode) -> Result<(), BackendError> {
        self.record(&format!("mode:{mode:?}"))
    }

    fn set_preferred_sample_rate(&self, _sample_rate: f64) -> Result<(), BackendError> {
        self.record("sample_rate")
    }

    fn set_preferred_io_buffer_duration(&self, _duration: Duration) -> Result<(), BackendError> {
        self.record("buffer")
    }

    fn override_output_port(&self, port: OutputOverride) -> Result<(), BackendError> {
        self.record(&format!("override:{port:?}"))
    }

    fn current_route(&self) -> AudioRoute {
        AudioRoute::default()
    }

    fn sample_rate(&self) -> f64 {
        48_000.0
    }

    fn io_buffer_duration(&self) -> Duration {
        Duration::from_millis(5)
    }
}

/// Camera and microphone permission double answering prompts with `answer`.
pub struct FakePermissions {
    log: CallLog,
    camera: Mutex<CameraAuthorization>,
    microphone: Mutex<RecordPermission>,
    answer: bool,
    prompt_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakePermissions {
    pub fn new(log: &CallLog, camera: CameraAuthorization, microphone: RecordPermission) -> Self {
        Self {
            log: log.clone(),
            camera: Mutex::new(camera),
            microphone: Mutex::new(microphone),
            answer: true,
            prompt_gate: Mutex::new(None),
        }
    }

    pub fn set_camera(&self, authorization: CameraAuthorization) {
        *self.camera.lock().unwrap() = authorization;
    }

    /// Holds the camera prompt until the returned gate is notified.
    pub fn hold_camera_prompt(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.prompt_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl CameraPermissionApi for FakePermissions {
    fn authorization_status(&self) -> CameraAuthorization {
        *self.camera.lock().unwrap()
    }

    async fn request_access(&self) -> bool {
        self.log.record("permission.camera_prompt");
        let gate = self.prompt_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        *self.camera.lock().unwrap() = if self.answer {
            CameraAuthorization::Authorized
        } else {
            CameraAuthorization::Denied
        };
        self.answer
    }
}

#[async_trait]
impl RecordPermissionApi for FakePermissions {
    fn record_permission(&self) -> RecordPermission {
        *self.microphone.lock().unwrap()
    }

    async fn request_record_permission(&self) -> bool {
        self.log.record("permission.microphone_prompt");
        *self.microphone.lock().unwrap() = if self.answer {
            RecordPermission::Granted
        } else {
            RecordPermission::Denied
        };
        self.answer
    }
}

/// A coordinator wired to recording doubles.
pub struct Harness {
    pub log: CallLog,
    pub camera: Arc<FakeCamera>,
    pub vision: Arc<FakeVision>,
    pub voice: Arc<FakeVoice>,
    pub audio: Arc<FakeAudioBackend>,
    pub permissions: Arc<FakePermissions>,
    pub coordinator: Arc<SessionCoordinator>,
}

impl Harness {
    pub fn new(camera: CameraAuthorization, microphone: RecordPermission) -> Self {
        let log = CallLog::default();
        let camera_subsystem = Arc::new(FakeCamera::new(&log));
        let vision = Arc::new(FakeVision::new(&log));
        let voice = Arc::new(FakeVoice::new(&log));
        let audio = Arc::new(FakeAudioBackend::new(&log));
        let permissions = Arc::new(FakePermissions::new(&log, camera, microphone));

        let gate = PermissionGate::new(
            permissions.clone(),
            MicrophonePermission::Current(permissions.clone()),
        );
        let arbiter = AudioSessionArbiter::new(audio.clone());
        let coordinator = Arc::new(SessionCoordinator::new(gate, arbiter));
        coordinator.register_subsystems(SubsystemHandles::new(
            &camera_subsystem,
            &vision,
            &voice,
        ));

        Self {
            log,
            camera: camera_subsystem,
            vision,
            voice,
            audio,
            permissions,
            coordinator,
        }
    }

    /// All permissions already granted.
    pub fn granted() -> Self {
        Self::new(CameraAuthorization::Authorized, RecordPermission::Granted)
    }
}
