pub mod event_bridge;
pub mod sim;

use async_trait::async_trait;
use std::fmt;
use strum_macros::Display;

/// Last known telemetry reading. Height is in decimeters, like the Tello
/// flight data frames.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FlightData {
    pub battery: u8,
    pub height: i16,
}

impl fmt::Display for FlightData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " -- Battery: {}% -- Height: {}", self.battery, self.height)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum FlipDirection {
    Front,
    Back,
    Left,
    Right,
}

/// Asynchronous callbacks the drone emits on its own schedule.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VehicleEvent {
    Connected,
    TookOff,
    Landing,
    Telemetry(FlightData),
}

#[derive(Debug, Display)]
pub enum VehicleError {
    NotConnected,
    NotAirborne,
    LinkDown,
}

impl std::error::Error for VehicleError {}

/// Opaque command sink of the physical (or simulated) drone. The core never
/// implements the device protocol itself; a backend is injected together
/// with its event stream at construction.
#[async_trait]
pub trait VehicleBackend: Send + Sync {
    async fn connect(&self) -> Result<(), VehicleError>;
    async fn take_off(&self) -> Result<(), VehicleError>;
    async fn land(&self) -> Result<(), VehicleError>;
    async fn flip(&self, direction: FlipDirection) -> Result<(), VehicleError>;
    async fn halt(&self) -> Result<(), VehicleError>;
}
