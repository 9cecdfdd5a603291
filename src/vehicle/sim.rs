use super::{FlightData, FlipDirection, VehicleBackend, VehicleError, VehicleEvent};
use crate::log;
use async_trait::async_trait;
use rand::Rng;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    time::sleep,
};
use tokio_util::sync::CancellationToken;

const TELEMETRY_PERIOD: Duration = Duration::from_secs(1);
const RADIO_SETTLE: Duration = Duration::from_millis(200);
const TAKEOFF_HEIGHT: i16 = 10;

struct SimState {
    connected: bool,
    height: i16,
    battery: u8,
    telemetry_tok: Option<CancellationToken>,
}

/// In-process stand-in for a real drone, for manual runs without hardware.
/// Emits `Connected`/`TookOff`/`Landing` in response to commands and 1 Hz
/// telemetry with a slowly draining battery while the link is up.
pub struct SimVehicle {
    events: UnboundedSender<VehicleEvent>,
    state: Arc<Mutex<SimState>>,
}

impl SimVehicle {
    pub fn new() -> (Self, UnboundedReceiver<VehicleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sim = Self {
            events: tx,
            state: Arc::new(Mutex::new(SimState {
                connected: false,
                height: 0,
                battery: 100,
                telemetry_tok: None,
            })),
        };
        (sim, rx)
    }

    fn emit(&self, ev: VehicleEvent) {
        // Receiver dropping just means the controller went away.
        let _ = self.events.send(ev);
    }

    fn spawn_telemetry(&self, c_tok: CancellationToken) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = c_tok.cancelled() => break,
                    () = sleep(TELEMETRY_PERIOD) => {
                        let fd = {
                            let mut s = state.lock().unwrap();
                            let drain = u8::from(rand::rng().random_range(0..4) == 0);
                            s.battery = s.battery.saturating_sub(drain);
                            FlightData { battery: s.battery, height: s.height }
                        };
                        let _ = events.send(VehicleEvent::Telemetry(fd));
                    }
                }
            }
        });
    }
}

#[async_trait]
impl VehicleBackend for SimVehicle {
    async fn connect(&self) -> Result<(), VehicleError> {
        sleep(RADIO_SETTLE).await;
        let c_tok = {
            let mut state = self.state.lock().unwrap();
            if state.connected {
                return Ok(());
            }
            state.connected = true;
            state.battery = 100;
            let c_tok = CancellationToken::new();
            state.telemetry_tok = Some(c_tok.clone());
            c_tok
        };
        self.spawn_telemetry(c_tok);
        self.emit(VehicleEvent::Connected);
        Ok(())
    }

    async fn take_off(&self) -> Result<(), VehicleError> {
        if !self.state.lock().unwrap().connected {
            return Err(VehicleError::NotConnected);
        }
        sleep(RADIO_SETTLE).await;
        self.state.lock().unwrap().height = TAKEOFF_HEIGHT;
        self.emit(VehicleEvent::TookOff);
        Ok(())
    }

    async fn land(&self) -> Result<(), VehicleError> {
        if !self.state.lock().unwrap().connected {
            return Err(VehicleError::NotConnected);
        }
        self.emit(VehicleEvent::Landing);
        sleep(RADIO_SETTLE).await;
        self.state.lock().unwrap().height = 0;
        Ok(())
    }

    async fn flip(&self, direction: FlipDirection) -> Result<(), VehicleError> {
        if self.state.lock().unwrap().height == 0 {
            return Err(VehicleError::NotAirborne);
        }
        sleep(RADIO_SETTLE).await;
        log!("Sim drone flipped {direction}");
        Ok(())
    }

    async fn halt(&self) -> Result<(), VehicleError> {
        let mut state = self.state.lock().unwrap();
        if let Some(tok) = state.telemetry_tok.take() {
            tok.cancel();
        }
        state.connected = false;
        state.height = 0;
        Ok(())
    }
}
