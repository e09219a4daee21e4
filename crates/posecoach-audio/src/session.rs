use std::time::Duration;

/// Audio session category, i.e. which directions of audio the app uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCategory {
    /// Playback only; silenced by the ring/silent switch.
    Ambient,
    Playback,
    Record,
    /// Simultaneous playback and capture.
    PlayAndRecord,
}

/// Audio session mode, a hint about the kind of audio being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    Default,
    /// Two-way voice communication (enables echo cancellation on phones).
    VoiceChat,
    /// Long-form spoken content such as synthesized instructions.
    SpokenAudio,
}

/// Category options applied together with the category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryOptions {
    /// Route output to the speaker instead of the receiver when nothing else
    /// is connected.
    pub default_to_speaker: bool,
    /// Allow Bluetooth hands-free devices as input and output.
    pub allow_bluetooth: bool,
    /// Keep other apps' audio playing alongside ours.
    pub mix_with_others: bool,
}

/// Immutable description of the shared audio session configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSessionConfig {
    pub category: AudioCategory,
    pub mode: AudioMode,
    pub options: CategoryOptions,
    /// Preferred hardware sample rate in Hz. A hint only.
    pub preferred_sample_rate: f64,
    /// Preferred I/O buffer duration. A hint only.
    pub preferred_io_buffer_duration: Duration,
}

impl AudioSessionConfig {
    /// The configuration usable by speech synthesis and speech recognition
    /// simultaneously.
    pub const fn dual_duplex() -> Self {
        Self {
            category: AudioCategory::PlayAndRecord,
            mode: AudioMode::SpokenAudio,
            options: CategoryOptions {
                default_to_speaker: true,
                allow_bluetooth: true,
                mix_with_others: true,
            },
            preferred_sample_rate: 48_000.0,
            preferred_io_buffer_duration: Duration::from_millis(5),
        }
    }
}

impl Default for AudioSessionConfig {
    fn default() -> Self {
        Self::dual_duplex()
    }
}
