//! Adaptive Signal Simulation Library
//!
//! A four-approach signalized intersection whose green times adapt to
//! measured demand. The core runs headless; the terminal renderer only
//! reads snapshots from it.

pub mod simulation;
pub mod terminal;
