use std::fmt;

use crate::session::AudioMode;

/// Physical kind of an audio port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    BuiltInMic,
    BuiltInSpeaker,
    BuiltInReceiver,
    Headphones,
    /// Bluetooth hands-free profile (duplex, telephony quality).
    BluetoothHfp,
    /// Bluetooth advanced audio distribution profile (output only).
    BluetoothA2dp,
    BluetoothLe,
    Usb,
    Other,
}

impl PortKind {
    pub fn is_bluetooth(self) -> bool {
        matches!(
            self,
            Self::BluetoothHfp | Self::BluetoothA2dp | Self::BluetoothLe
        )
    }

    /// Best-effort classification of a host device from its description.
    pub fn from_description(description: &str, input: bool) -> Self {
        let lower = description.to_lowercase();
        if lower.contains("bluetooth") || lower.contains("airpods") || lower.contains("hands-free")
        {
            if input || lower.contains("hands-free") {
                Self::BluetoothHfp
            } else {
                Self::BluetoothA2dp
            }
        } else if lower.contains("usb") {
            Self::Usb
        } else if lower.contains("headphone") || lower.contains("headset") {
            Self::Headphones
        } else if lower.contains("speaker") {
            Self::BuiltInSpeaker
        } else if input && (lower.contains("microphone") || lower.contains("mic")) {
            Self::BuiltInMic
        } else {
            Self::Other
        }
    }
}

/// A single input or output port of the current route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPort {
    pub name: String,
    pub kind: PortKind,
}

/// Input and output ports currently in use by the audio session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioRoute {
    pub inputs: Vec<AudioPort>,
    pub outputs: Vec<AudioPort>,
}

impl AudioRoute {
    /// Whether any input or output of the route is a Bluetooth device.
    pub fn has_bluetooth(&self) -> bool {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .any(|port| port.kind.is_bluetooth())
    }
}

impl fmt::Display for AudioRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |ports: &[AudioPort]| {
            ports
                .iter()
                .map(|port| format!("{} [{:?}]", port.name, port.kind))
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "inputs: ({}), outputs: ({})",
            names(&self.inputs),
            names(&self.outputs)
        )
    }
}

/// Output port override applied on top of the category's default routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOverride {
    /// No override: output follows the system route (e.g., a Bluetooth
    /// headset when one is connected).
    None,
    /// Force output to the built-in speaker.
    Speaker,
}

/// Routing decision for the next spoken message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePlan {
    pub output: OutputOverride,
    /// Mode to switch to before speaking, if any.
    pub mode: Option<AudioMode>,
}

impl RoutePlan {
    pub fn uses_bluetooth(&self) -> bool {
        self.output == OutputOverride::None
    }
}

/// Chooses the output route for a spoken message.
///
/// A connected Bluetooth device keeps the system route and re-asserts
/// spoken-audio mode, since a hands-free link can move the session into a
/// telephony mode. Otherwise output is forced to the device speaker.
pub fn select_route(bluetooth_connected: bool) -> RoutePlan {
    if bluetooth_connected {
        RoutePlan {
            output: OutputOverride::None,
            mode: Some(AudioMode::SpokenAudio),
        }
    } else {
        RoutePlan {
            output: OutputOverride::Speaker,
            mode: None,
        }
    }
}
