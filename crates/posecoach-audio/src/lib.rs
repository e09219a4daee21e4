//! Shared audio session arbitration for the exercise flow.
//!
//! Speech synthesis and speech recognition use the microphone and the speaker
//! at the same time, and both go through one OS-level audio session. This
//! crate owns that session's configuration:
//! - [`session`] describes the canonical "dual-duplex" configuration.
//! - [`backend`] is the seam to the OS audio session API.
//! - [`arbiter`] applies and tears down the configuration in a fixed order.
//! - [`route`] picks the output route before each spoken message.
//! - [`device`] is a `cpal`-backed host implementation of the backend.
//!
//! # Ordering
//! Configuration, teardown and route changes are serialised inside
//! [`arbiter::AudioSessionArbiter`]. Callers never touch the backend directly
//! while a session is coordinated.

pub mod arbiter;
pub mod backend;
pub mod device;
pub mod route;
pub mod session;

pub use arbiter::{AudioError, AudioSessionArbiter, ConfigStage};
pub use backend::{AudioSessionBackend, BackendError};
pub use route::{AudioPort, AudioRoute, OutputOverride, PortKind, RoutePlan};
pub use session::{AudioCategory, AudioMode, AudioSessionConfig, CategoryOptions};
