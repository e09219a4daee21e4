//! Console frontend: reads commands from stdin and prints what the backend
//! reports about the exercise session.

use anyhow::Context;
use posecoach_bridge::{MessageFromBackend, MessageToBackend};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use crate::command::{Command, HELP};

pub mod command;
pub mod formatting;

#[derive(Clone)]
pub struct BackendBridge {
    pub to_backend: mpsc::Sender<MessageToBackend>,
}

impl BackendBridge {
    pub async fn send(&self, message: MessageToBackend) -> anyhow::Result<()> {
        self.to_backend
            .send(message)
            .await
            .context("the backend is no longer running")
    }

    pub async fn stop_session(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::StopExerciseSession).await
    }
}

/// Runs the console until `quit`, end of input or backend shutdown. Blocks
/// the calling thread.
pub fn run(
    rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the frontend runtime")?;

    runtime.block_on(console_loop(rx, BackendBridge { to_backend: tx }))
}

async fn console_loop(
    mut rx: mpsc::Receiver<MessageFromBackend>,
    bridge: BackendBridge,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    log::info!("End of input, shutting down");
                    break;
                };
                match Command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Help)) => println!("{HELP}"),
                    Ok(Some(command)) => {
                        if let Some(message) = command.to_message() {
                            bridge.send(message).await?;
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
            message = rx.recv() => {
                let Some(message) = message else {
                    log::warn!("Backend closed the channel");
                    return Ok(());
                };
                print_message(&message);
            }
        }
    }

    shutdown(&mut rx, &bridge).await
}

/// Stops the session and waits for the backend to confirm.
async fn shutdown(
    rx: &mut mpsc::Receiver<MessageFromBackend>,
    bridge: &BackendBridge,
) -> anyhow::Result<()> {
    if bridge.stop_session().await.is_err() {
        return Ok(());
    }
    while let Some(message) = rx.recv().await {
        print_message(&message);
        if matches!(message, MessageFromBackend::ExerciseSessionStopped) {
            break;
        }
    }
    Ok(())
}

fn print_message(message: &MessageFromBackend) {
    log::debug!("Backend message: {message:?}");
    if let Some(line) = formatting::format_message(message) {
        println!("{line}");
    }
}
