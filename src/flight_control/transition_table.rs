use super::actions::Action;
use super::flight_state::{FlightState, Input};
use strum::EnumCount;

/// One cell of the table: the state to commit and the action to dispatch.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Transition {
    pub next: FlightState,
    pub action: Action,
}

/// Static (state, input) -> (next state, action) mapping. Pure data; cells
/// left `None` are treated by the engine as a logged no-op, never a crash.
pub struct TransitionTable {
    cells: [[Option<Transition>; Input::COUNT]; FlightState::COUNT],
}

impl TransitionTable {
    /// Builds the flight lifecycle table. Entries are last-write-wins, which
    /// also preserves the historical double write of the Landing/OnGround
    /// cell (both writes carry the same transition).
    pub fn new() -> Self {
        use Action as A;
        use FlightState::{Connected, Disconnected, Landing, Ready, TakingOff};
        use Input as I;

        let mut t = Self { cells: [[None; I::COUNT]; FlightState::COUNT] };

        t.set(Disconnected, I::ConnectionMade, Connected, A::RequestTakeoff);
        t.set(Disconnected, I::TryConnection, Disconnected, A::StartConnection);
        t.set(Disconnected, I::ConnectionLost, Disconnected, A::NoOp);
        t.set(Disconnected, I::OnGround, Disconnected, A::NoOp);
        t.set(Disconnected, I::Halt, Disconnected, A::NoOp);
        t.set(Disconnected, I::CommandFailed, Disconnected, A::NoOp);

        t.set(Connected, I::TakeOff, TakingOff, A::WaitForHeight);
        t.set(Connected, I::TryConnection, Connected, A::NoOp);
        t.set(Connected, I::ConnectionLost, Connected, A::NoOp);
        t.set(Connected, I::CommandFailed, Connected, A::RequestTakeoff);
        t.set(Connected, I::Halt, Landing, A::HaltVehicle);

        t.set(TakingOff, I::TryConnection, TakingOff, A::NoOp);
        t.set(TakingOff, I::TakeOff, TakingOff, A::NoOp);
        t.set(TakingOff, I::OnGround, TakingOff, A::RequestTakeoff);
        t.set(TakingOff, I::CommandFailed, TakingOff, A::RequestTakeoff);
        t.set(TakingOff, I::AtHeight, Ready, A::MarkReady);
        t.set(TakingOff, I::ConnectionLost, Landing, A::HaltVehicle);
        t.set(TakingOff, I::Halt, Landing, A::LandVehicle);

        t.set(Ready, I::TryConnection, Ready, A::NoOp);
        t.set(Ready, I::CommandFailed, Ready, A::NoOp);
        t.set(Ready, I::FlightTimeOver, Landing, A::LandVehicle);
        t.set(Ready, I::Land, Landing, A::LandVehicle);
        t.set(Ready, I::ConnectionLost, Landing, A::LandVehicle);
        t.set(Ready, I::Halt, Landing, A::LandVehicle);

        t.set(Landing, I::OnGround, Landing, A::HaltVehicle);
        t.set(Landing, I::ConnectionLost, Landing, A::HaltVehicle);
        t.set(Landing, I::CommandFailed, Landing, A::HaltVehicle);
        t.set(Landing, I::Land, Landing, A::NoOp);
        t.set(Landing, I::Halt, Landing, A::NoOp);
        t.set(Landing, I::OnGround, Landing, A::HaltVehicle);
        t.set(Landing, I::Done, Disconnected, A::MarkDone);
        t
    }

    fn set(&mut self, from: FlightState, input: Input, next: FlightState, action: Action) {
        self.cells[from.idx()][input.idx()] = Some(Transition { next, action });
    }

    pub fn lookup(&self, state: FlightState, input: Input) -> Option<Transition> {
        self.cells[state.idx()][input.idx()]
    }
}

impl Default for TransitionTable {
    fn default() -> Self { Self::new() }
}
