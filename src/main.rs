use std::sync::Arc;

use anyhow::Context;
use posecoach_backend::SubsystemHandles;

mod subsystems;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .context("failed to build logger instance")?;

    // owned here; the backend only holds weak handles
    let camera = Arc::new(subsystems::HostCamera::default());
    let vision = Arc::new(subsystems::HostVision::default());
    let voice = Arc::new(subsystems::HostVoice::default());
    let handles = SubsystemHandles::new(&camera, &vision, &voice);

    let channels = posecoach_bridge::BridgeChannels::default();
    let backend = posecoach_backend::run(channels.backend_rx, channels.backend_tx, handles);
    posecoach_frontend::run(channels.frontend_rx, channels.frontend_tx)
        .context("failed to run frontend")?;

    if backend.join().is_err() {
        log::error!("Backend thread panicked");
    }
    drop((camera, vision, voice));
    Ok(())
}
