/// Backend state shared across services.
///
/// The exercise session itself lives in the
/// [`SessionCoordinator`](crate::coordinator::SessionCoordinator); this holds
/// the data around it.
#[derive(Debug, Clone)]
pub struct State {
    /// The loaded application configuration.
    pub config: posecoach_bridge::config::Config,
}

/// Thread-safe, async-friendly shared reference to the backend [`State`].
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<State>>;
