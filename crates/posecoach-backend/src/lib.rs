//! Backend runtime entry point and public API surface.
//!
//! This crate owns the exercise session lifecycle: it gates startup on camera
//! and microphone permissions, configures the shared audio session before
//! subsystems may use the hardware, and releases everything in a fixed order
//! when the session ends.

mod app;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod permissions;
mod runtime;
mod services;
mod state;
pub mod subsystems;

#[cfg(test)]
mod testing;

pub use crate::coordinator::SessionCoordinator;
pub use crate::error::SessionError;
pub use crate::permissions::{PermissionGate, PermissionSnapshot};
pub use crate::runtime::run;
pub use crate::subsystems::{
    CameraSubsystem, SubsystemError, SubsystemHandles, SubsystemKind, VisionSubsystem,
    VoiceSubsystem,
};
