pub mod actions;
pub mod flight_state;
pub mod fsm_engine;
pub mod link_watchdog;
pub mod signal;
pub mod transition_table;
