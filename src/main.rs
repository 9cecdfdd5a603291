#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod flight_control;
mod logger;
mod vehicle;

use crate::flight_control::{
    flight_state::FlightState,
    fsm_engine::{DroneFsm, FsmConfig},
};
use crate::vehicle::{FlipDirection, sim::SimVehicle};
use std::{sync::Arc, time::Duration};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    info!("Starting tello-ob");
    let (sim, events) = SimVehicle::new();
    let fsm = Arc::new(DroneFsm::start(Arc::new(sim), events, FsmConfig::default()));

    // Fake a workload arriving once the drone holds station.
    let fsm_clone = Arc::clone(&fsm);
    tokio::spawn(async move {
        loop {
            if fsm_clone.status().await.state == FlightState::Ready {
                fsm_clone.flip(FlipDirection::Back).await;
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });

    tokio::signal::ctrl_c().await.unwrap_or_else(|e| fatal!("Failed to listen for ctrl-c: {e}"));
    fsm.close().await;
    info!("Drone grounded and halted, shutting down");
}
