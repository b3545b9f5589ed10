//! Standalone intersection simulation module
//!
//! This module contains the adaptive signal core: queue estimation, phase
//! scheduling, car following and vehicle motion. It has no rendering or
//! input dependencies and can be driven headless or by any front end that
//! reads a [`Snapshot`].

mod car_following;
mod config;
mod engine;
mod phase;
mod queue;
mod scheduler;
mod stats;
mod types;
mod vehicle;

pub use car_following::{apply_controls, is_near_stop_line, is_past_center, lanes};
pub use config::{
    Geometry, SimConfig, DEFAULT_BASE_GREEN, DEFAULT_GAP_THRESHOLD, DEFAULT_MAX_GREEN,
    DEFAULT_MIN_GREEN, DEFAULT_PER_CAR_ADDITIONAL,
};
pub use engine::{SimulationEngine, Snapshot, StopHandle, VehicleView};
pub use phase::{Phase, PhaseTable};
pub use queue::{discharging_count, is_queued, measure_queues, QueueSnapshot};
pub use scheduler::{compute_phase_duration, PhaseScheduler, TransitionReason};
pub use stats::SimulationStats;
pub use types::{Approach, Movement, PerApproach, Position, SimId, TurnKind, VehicleId};
pub use vehicle::{CrossState, SimVehicle, VehicleUpdateResult};
