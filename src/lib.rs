//! LT power-room switchover simulator.
//!
//! Models how interlocked EB/DG/bus-coupler switchgear feeding two LT panels
//! sequences itself through utility failures, generator starts and
//! restoration, one simulated second at a time.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod drill;
pub mod io;
pub mod logging;
/// Switching topology, state store, sequencer and session.
pub mod sim;
pub mod soak;
#[cfg(feature = "tui")]
pub mod tui;
