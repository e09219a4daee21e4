/// Output route selected for a spoken message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechRoute {
    /// Output follows the connected Bluetooth device.
    Bluetooth,
    /// Output is forced to the built-in speaker.
    Speaker,
}

/// Reason attached to an OS audio route change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChangeReason {
    NewDeviceAvailable,
    OldDeviceUnavailable,
    CategoryChange,
    Override,
    Unknown,
}

/// Frontend-facing summary of the current audio route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSummary {
    /// Display names of the input ports in use.
    pub inputs: Vec<String>,
    /// Display names of the output ports in use.
    pub outputs: Vec<String>,
    /// Whether any port in the route is a Bluetooth device.
    pub bluetooth: bool,
}
