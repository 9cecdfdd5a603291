use strum_macros::{Display, EnumCount};

/// Lifecycle states of the drone link. Exactly one value is authoritative at
/// any instant; it lives in [`super::fsm_engine::DroneShared`] and is only
/// mutated by the engine loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumCount)]
pub enum FlightState {
    /// No connection to the drone.
    Disconnected,
    /// Connected but not taken off yet.
    Connected,
    /// Takeoff commanded, waiting for height.
    TakingOff,
    /// Airborne and ready for commands.
    Ready,
    /// Descending or halting.
    Landing,
}

/// Discrete events fed into the FSM. Immutable, carried in arrival order on
/// the engine's input queue.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumCount)]
pub enum Input {
    /// Please (re)try connecting to the drone.
    TryConnection,
    /// Connect event received from the drone.
    ConnectionMade,
    /// Take off event received from the drone.
    TakeOff,
    /// Height was checked once and it was > 0.
    AtHeight,
    /// Flight duration timer popped.
    FlightTimeOver,
    /// Landing event from the drone.
    Land,
    /// Height was checked once and it was 0.
    OnGround,
    /// Please bring the drone down and halt it.
    Halt,
    /// Telemetry went silent for two watchdog intervals.
    ConnectionLost,
    /// A hardware command returned an error.
    CommandFailed,
    /// Drone halted and freed.
    Done,
}

impl FlightState {
    /// Row index into the transition table.
    pub(crate) const fn idx(self) -> usize { self as usize }
}

impl Input {
    /// Column index into the transition table.
    pub(crate) const fn idx(self) -> usize { self as usize }
}
