/// Simulated session clock.
pub mod clock;
/// Scripted switching sequences and their timings.
pub mod choreography;
/// Operator-facing event log.
pub mod event_log;
pub mod interlock;
pub mod manual;
pub mod ops;
pub mod sequencer;
pub mod session;
pub mod snapshot;
/// Element, genset, supply and panel state.
pub mod state;
/// Count-down timers driving the sequencer.
pub mod timer;
/// Static switching topology.
pub mod topology;
