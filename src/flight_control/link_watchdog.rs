use super::flight_state::Input;
use crate::{log, warn};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Notify, sync::mpsc::UnboundedSender, time::sleep};
use tokio_util::sync::CancellationToken;

/// Liveness monitor of the drone link. Telemetry heartbeats race a repeating
/// interval; a silent interval arms a missed flag and a second consecutive
/// silent interval synthesizes `ConnectionLost`. Loss is therefore signalled
/// after roughly two intervals of silence, never on the first miss.
pub struct LinkWatchdog {
    input_tx: UnboundedSender<Input>,
    heartbeat: Arc<Notify>,
    interval: Duration,
}

impl LinkWatchdog {
    pub fn new(input_tx: UnboundedSender<Input>, interval: Duration) -> Self {
        Self { input_tx, heartbeat: Arc::new(Notify::new()), interval }
    }

    /// Heartbeat handle, pinged by the event bridge on every telemetry update.
    pub fn heartbeat(&self) -> Arc<Notify> { Arc::clone(&self.heartbeat) }

    pub async fn run(&self, c_tok: CancellationToken) {
        let mut missed = false;
        loop {
            tokio::select! {
                () = c_tok.cancelled() => break,
                () = self.heartbeat.notified() => missed = false,
                () = sleep(self.interval) => {
                    log!("Watchdog timer popped");
                    if missed {
                        warn!("No telemetry for two watchdog intervals");
                        // Send only fails once the engine has shut down.
                        let _ = self.input_tx.send(Input::ConnectionLost);
                    } else {
                        missed = true;
                    }
                }
            }
        }
    }
}
