use serde::{Deserialize, Serialize};

/// Authorization state the desktop host reports for a capture resource.
///
/// On a phone this decision belongs to the OS; on a desktop host it is taken
/// from the configuration so the session flow can be exercised end to end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostAuthorization {
    /// Already granted. Default value.
    #[default]
    Authorized,
    /// Already refused; checks never prompt again.
    Denied,
    /// Not decided yet; the first check prompts.
    NotDetermined,
}

/// Which of the two microphone permission API shapes the host exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MicrophoneApi {
    /// Async request returning the decision. Default value.
    #[default]
    Current,
    /// Request that reports the decision through a completion callback.
    Legacy,
}

/// Host-side permission store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostPermissionsConfig {
    /// Camera authorization at startup.
    pub camera: HostAuthorization,
    /// Microphone authorization at startup.
    pub microphone: HostAuthorization,
    /// Answer given when a not-yet-decided resource is prompted.
    pub grant_on_prompt: bool,
    /// Microphone permission API shape to use.
    pub microphone_api: MicrophoneApi,
}

impl Default for HostPermissionsConfig {
    fn default() -> Self {
        Self {
            camera: HostAuthorization::default(),
            microphone: HostAuthorization::default(),
            grant_on_prompt: true,
            microphone_api: MicrophoneApi::default(),
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Start camera, vision and voice as soon as a session becomes active.
    pub auto_start_subsystems: bool,
    /// Permission store used on desktop hosts.
    pub host_permissions: HostPermissionsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_start_subsystems: true,
            host_permissions: HostPermissionsConfig::default(),
        }
    }
}
