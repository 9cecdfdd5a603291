use super::flight_state::Input;
use super::fsm_engine::DroneContext;
use crate::vehicle::VehicleError;
use crate::{error, info, log};
use std::sync::Arc;
use strum_macros::Display;
use tokio::time::sleep;

/// Side effects a transition may dispatch. Each runs as its own task and does
/// exactly one of: issue a vehicle command, arm a one-shot deferred input, or
/// pure bookkeeping. The shared lock is only taken around instant reads, so
/// the long settle sleeps never block the engine loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum Action {
    NoOp,
    /// Issue a connect and re-arm `TryConnection` after the retry delay.
    /// The retry chain dies once `TryConnection` lands on a no-op cell.
    StartConnection,
    /// Issue a takeoff command.
    RequestTakeoff,
    /// Wait out the takeoff grace, then check the height once.
    WaitForHeight,
    /// Arm the flight duration timer.
    MarkReady,
    /// Issue a land command and arm a deferred `OnGround`.
    LandVehicle,
    /// Issue a halt command and arm a deferred `Done`.
    HaltVehicle,
    /// Release the completion latch, re-arm the connection sequence unless
    /// shutdown was requested.
    MarkDone,
}

impl Action {
    pub(crate) async fn run(self, ctx: Arc<DroneContext>) {
        match self {
            Action::NoOp => (),
            Action::StartConnection => start_connection(&ctx).await,
            Action::RequestTakeoff => request_takeoff(&ctx).await,
            Action::WaitForHeight => wait_for_height(&ctx).await,
            Action::MarkReady => mark_ready(&ctx).await,
            Action::LandVehicle => land_vehicle(&ctx).await,
            Action::HaltVehicle => halt_vehicle(&ctx).await,
            Action::MarkDone => mark_done(&ctx).await,
        }
    }
}

/// Feeds a command failure back into the machine instead of surfacing it.
/// The input is deferred by the retry delay so a persistently failing
/// command cannot spin the retry cells of the table.
fn check(ctx: &Arc<DroneContext>, what: &str, res: Result<(), VehicleError>) {
    if let Err(e) = res {
        error!("{what} command failed: {e}");
        let ctx = Arc::clone(ctx);
        tokio::spawn(async move {
            sleep(ctx.config.connect_retry).await;
            ctx.submit(Input::CommandFailed);
        });
    }
}

async fn start_connection(ctx: &Arc<DroneContext>) {
    info!("Starting connection sequence");
    check(ctx, "Connect", ctx.vehicle.connect().await);
    sleep(ctx.config.connect_retry).await;
    ctx.submit(Input::TryConnection);
}

async fn request_takeoff(ctx: &Arc<DroneContext>) {
    info!("Requesting takeoff");
    check(ctx, "Takeoff", ctx.vehicle.take_off().await);
}

/// A fixed delay stands in for true takeoff confirmation: the height is
/// checked once after the grace, not polled.
async fn wait_for_height(ctx: &Arc<DroneContext>) {
    sleep(ctx.config.takeoff_grace).await;
    let height = ctx.shared.read().await.telemetry.map_or(0, |fd| fd.height);
    if height > 0 {
        log!("Height check: {height}, drone is airborne");
        ctx.submit(Input::AtHeight);
    } else {
        log!("Height check: still on the ground");
        ctx.submit(Input::OnGround);
    }
}

async fn mark_ready(ctx: &Arc<DroneContext>) {
    info!("Drone at height, ready for commands");
    sleep(ctx.config.flight_time).await;
    log!("Flight timer popped");
    ctx.submit(Input::FlightTimeOver);
}

async fn land_vehicle(ctx: &Arc<DroneContext>) {
    info!("Landing drone");
    check(ctx, "Land", ctx.vehicle.land().await);
    sleep(ctx.config.landing_grace).await;
    ctx.submit(Input::OnGround);
}

async fn halt_vehicle(ctx: &Arc<DroneContext>) {
    info!("Halting drone");
    check(ctx, "Halt", ctx.vehicle.halt().await);
    sleep(ctx.config.halt_settle).await;
    ctx.submit(Input::Done);
}

async fn mark_done(ctx: &Arc<DroneContext>) {
    info!("Drone grounded and halted");
    ctx.latch.release();
    if !ctx.shutting_down() {
        sleep(ctx.config.connect_retry).await;
        ctx.submit(Input::TryConnection);
    }
}
