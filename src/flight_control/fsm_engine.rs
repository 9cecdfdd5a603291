use super::{
    flight_state::{FlightState, Input},
    link_watchdog::LinkWatchdog,
    signal::CompletionLatch,
    transition_table::TransitionTable,
};
use crate::vehicle::{FlipDirection, VehicleBackend, VehicleEvent, event_bridge::EventBridge, FlightData};
use crate::{error, info, log, warn};
use chrono::{DateTime, Utc};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::{
    RwLock,
    mpsc::{self, UnboundedReceiver},
};
use tokio_util::sync::CancellationToken;

/// Timings of the deferred inputs and the watchdog. Defaults carry the
/// production values; tests shrink or stretch them to steer the paused clock.
#[derive(Debug, Clone, Copy)]
pub struct FsmConfig {
    /// Hover duration after reaching height before landing is requested.
    pub flight_time: Duration,
    /// Settle time after a takeoff command before the single height check.
    pub takeoff_grace: Duration,
    /// Settle time after a land command before the drone counts as grounded.
    pub landing_grace: Duration,
    /// Settle time after a halt command before the cycle counts as done.
    pub halt_settle: Duration,
    /// Delay between connection attempts while disconnected.
    pub connect_retry: Duration,
    /// Telemetry silence interval of the link watchdog.
    pub watchdog_interval: Duration,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            flight_time: Duration::from_secs(30),
            takeoff_grace: Duration::from_secs(3),
            landing_grace: Duration::from_secs(5),
            halt_settle: Duration::from_secs(10),
            connect_retry: Duration::from_secs(5),
            watchdog_interval: Duration::from_secs(5),
        }
    }
}

/// Locked snapshot of the authoritative state, for condition reporting.
#[derive(Debug, Clone, Copy)]
pub struct FlightStatus {
    pub state: FlightState,
    pub last_transition: DateTime<Utc>,
}

/// The shared mutable fields. Guarded by one lock, held only for short
/// critical sections and never across vehicle I/O or sleeps.
pub(crate) struct DroneShared {
    pub(crate) state: FlightState,
    pub(crate) last_transition: DateTime<Utc>,
    pub(crate) telemetry: Option<FlightData>,
}

/// Everything the engine loop, the bridge, and the dispatched actions share.
pub struct DroneContext {
    pub(crate) shared: RwLock<DroneShared>,
    pub(crate) vehicle: Arc<dyn VehicleBackend>,
    pub(crate) latch: CompletionLatch,
    pub(crate) config: FsmConfig,
    input_tx: mpsc::UnboundedSender<Input>,
    shutting_down: AtomicBool,
}

impl DroneContext {
    /// Enqueues an input without blocking the caller. Inputs are evaluated
    /// strictly in arrival order against the state at dequeue time.
    pub fn submit(&self, input: Input) {
        if self.input_tx.send(input).is_err() {
            warn!("Input {input} dropped, engine already stopped");
        }
    }

    pub async fn status(&self) -> FlightStatus {
        let shared = self.shared.read().await;
        FlightStatus { state: shared.state, last_transition: shared.last_transition }
    }

    pub(crate) fn shutting_down(&self) -> bool { self.shutting_down.load(Ordering::Acquire) }
}

/// The flight lifecycle state machine: owns its input queue, its lock, its
/// completion latch, and the injected vehicle handle.
pub struct DroneFsm {
    ctx: Arc<DroneContext>,
    c_tok: CancellationToken,
}

impl DroneFsm {
    /// Builds the machine in `Disconnected`, spawns the engine loop, the
    /// hardware event bridge, and the link watchdog, and kicks off the
    /// connection sequence.
    pub fn start(
        vehicle: Arc<dyn VehicleBackend>,
        events: UnboundedReceiver<VehicleEvent>,
        config: FsmConfig,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(DroneContext {
            shared: RwLock::new(DroneShared {
                state: FlightState::Disconnected,
                last_transition: Utc::now(),
                telemetry: None,
            }),
            vehicle,
            latch: CompletionLatch::default(),
            config,
            input_tx,
            shutting_down: AtomicBool::new(false),
        });
        let c_tok = CancellationToken::new();

        let engine_ctx = Arc::clone(&ctx);
        let engine_tok = c_tok.clone();
        tokio::spawn(async move {
            run_engine(engine_ctx, input_rx, engine_tok).await;
        });

        let watchdog =
            LinkWatchdog::new(ctx.input_tx.clone(), config.watchdog_interval);
        let bridge = EventBridge::new(Arc::clone(&ctx), watchdog.heartbeat());
        let bridge_tok = c_tok.clone();
        tokio::spawn(async move {
            bridge.run(events, bridge_tok).await;
        });
        let watchdog_tok = c_tok.clone();
        tokio::spawn(async move {
            watchdog.run(watchdog_tok).await;
        });

        ctx.submit(Input::TryConnection);
        Self { ctx, c_tok }
    }

    pub fn submit(&self, input: Input) { self.ctx.submit(input); }

    pub async fn status(&self) -> FlightStatus { self.ctx.status().await }

    pub(crate) fn ctx(&self) -> &Arc<DroneContext> { &self.ctx }

    /// Side effect hook for workload creation: flip the drone mid-air.
    pub async fn flip(&self, direction: FlipDirection) {
        log!("Flip {direction} requested");
        if let Err(e) = self.ctx.vehicle.flip(direction).await {
            error!("Flip {direction} failed: {e}");
            self.ctx.submit(Input::CommandFailed);
        }
    }

    /// Requests a halt and blocks until the drone is grounded and halted,
    /// then stops the background loops. Returns immediately if no flight
    /// cycle ever started.
    pub async fn close(&self) {
        info!("Close requested, waiting for the drone to ground");
        self.ctx.shutting_down.store(true, Ordering::Release);
        self.ctx.submit(Input::Halt);
        self.ctx.latch.wait().await;
        self.c_tok.cancel();
    }
}

/// The single serializer of state mutation: consumes inputs in arrival
/// order, commits (state, timestamp) under the lock, then dispatches the
/// action fire-and-forget so a slow hardware command never stalls the queue.
async fn run_engine(
    ctx: Arc<DroneContext>,
    mut input_rx: UnboundedReceiver<Input>,
    c_tok: CancellationToken,
) {
    let table = TransitionTable::new();
    info!("Flight state machine running");

    loop {
        let input = tokio::select! {
            () = c_tok.cancelled() => break,
            recv = input_rx.recv() => match recv {
                Some(input) => input,
                None => break,
            },
        };

        let transition = {
            let mut shared = ctx.shared.write().await;
            log!("Drone input {input} in state {}", shared.state);
            match table.lookup(shared.state, input) {
                Some(t) => {
                    shared.state = t.next;
                    shared.last_transition = Utc::now();
                    Some(t)
                }
                None => {
                    warn!("Invalid transition: {input} in state {}", shared.state);
                    None
                }
            }
        };

        if let Some(t) = transition {
            let action_ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                t.action.run(action_ctx).await;
            });
        }
    }
    info!("Flight state machine stopped");
}
