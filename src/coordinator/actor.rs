//! Runs a coordinator in its own task, fed by a command channel.
//!
//! Commands are handled one at a time. A fetch can therefore never land after
//! a later invalidation, and duplicate "view more" clicks are recognized by
//! the page cursor they carry.

use color_eyre::{eyre::eyre, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::client::Backend;

use super::{Command, Coordinator, LoadingFlags, Snapshot};

/// Cheap handle the UI uses to talk to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
  commands: mpsc::UnboundedSender<Command>,
  snapshots: watch::Receiver<Snapshot>,
  loading: LoadingFlags,
}

impl CoordinatorHandle {
  pub fn send(&self, command: Command) -> Result<()> {
    self
      .commands
      .send(command)
      .map_err(|_| eyre!("Coordinator has stopped"))
  }

  /// Request the page after `after`, the cursor of the rendered list.
  pub fn view_more(&self, after: Option<u32>) -> Result<()> {
    self.send(Command::ViewMore { after })
  }

  /// Latest published snapshot.
  pub fn snapshot(&self) -> Snapshot {
    self.snapshots.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
    self.snapshots.clone()
  }

  pub fn loading(&self) -> &LoadingFlags {
    &self.loading
  }
}

/// Start the coordinator task.
///
/// The task stops once every handle has been dropped.
pub fn spawn<B: Backend>(coordinator: Coordinator<B>) -> (CoordinatorHandle, JoinHandle<()>) {
  let (command_tx, command_rx) = mpsc::unbounded_channel();
  let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot(0, None));
  let loading = coordinator.loading_flags();

  let task = tokio::spawn(run(coordinator, command_rx, snapshot_tx));

  let handle = CoordinatorHandle {
    commands: command_tx,
    snapshots: snapshot_rx,
    loading,
  };
  (handle, task)
}

async fn run<B: Backend>(
  mut coordinator: Coordinator<B>,
  mut commands: mpsc::UnboundedReceiver<Command>,
  snapshots: watch::Sender<Snapshot>,
) {
  let mut version = 0u64;

  while let Some(command) = commands.recv().await {
    debug!(?command, "handling command");
    let error = match coordinator.handle(command).await {
      Ok(()) => None,
      Err(e) => {
        warn!(error = %e, "command failed");
        Some(e.to_string())
      }
    };

    version += 1;
    snapshots.send_replace(coordinator.snapshot(version, error));
  }

  info!("coordinator stopped");
}
