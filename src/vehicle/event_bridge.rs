use super::VehicleEvent;
use crate::flight_control::{flight_state::Input, fsm_engine::DroneContext};
use crate::{event, info, log};
use std::sync::Arc;
use tokio::sync::{Notify, mpsc::UnboundedReceiver};
use tokio_util::sync::CancellationToken;

/// Maps each hardware callback to exactly one FSM input. The loop only
/// enqueues and returns; telemetry additionally updates the shared snapshot
/// and pings the watchdog heartbeat.
pub struct EventBridge {
    ctx: Arc<DroneContext>,
    heartbeat: Arc<Notify>,
}

impl EventBridge {
    pub fn new(ctx: Arc<DroneContext>, heartbeat: Arc<Notify>) -> Self {
        Self { ctx, heartbeat }
    }

    pub async fn run(&self, mut events: UnboundedReceiver<VehicleEvent>, c_tok: CancellationToken) {
        loop {
            let ev = tokio::select! {
                () = c_tok.cancelled() => break,
                recv = events.recv() => match recv {
                    Some(ev) => ev,
                    None => {
                        log!("Vehicle event stream closed");
                        break;
                    }
                },
            };
            match ev {
                VehicleEvent::Connected => {
                    info!("Connected event from drone");
                    self.ctx.latch.begin();
                    self.ctx.submit(Input::ConnectionMade);
                }
                VehicleEvent::TookOff => {
                    info!("Take off event from drone");
                    self.ctx.submit(Input::TakeOff);
                }
                VehicleEvent::Landing => {
                    info!("Landing event from drone");
                    self.ctx.submit(Input::Land);
                }
                VehicleEvent::Telemetry(fd) => {
                    self.ctx.shared.write().await.telemetry = Some(fd);
                    self.heartbeat.notify_one();
                    event!("{fd}");
                }
            }
        }
    }
}
