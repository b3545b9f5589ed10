//! Adaptive phase scheduling
//!
//! Cycles through the phase table. Each phase holds for at least the minimum
//! green, then ends on the first of: its approaches drained, a gap in passing
//! traffic, or the maximum green. Green length for the next phase is sized
//! from the queue measured when it starts.

use log::debug;

use super::config::SimConfig;
use super::phase::Phase;
use super::queue::{discharging_count, QueueSnapshot};
use super::vehicle::SimVehicle;

/// Why a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionReason {
    /// No vehicle on a green approach is discharging
    QueueExhausted,
    /// No vehicle has passed within the gap threshold
    GapOut,
    /// Phase reached the maximum green
    MaxGreen,
    /// Operator requested an advance
    Manual,
}

/// Green duration for `phase` given the measured queues
///
/// Linear in demand, clamped to `[min_green, max_green]`.
pub fn compute_phase_duration(phase: &Phase, queues: &QueueSnapshot, config: &SimConfig) -> f32 {
    let demand = queues.demand(&phase.green) as f32;
    let duration = config.base_green + config.per_car_additional * demand;
    duration.clamp(config.min_green, config.max_green)
}

/// State machine selecting the active phase and its duration
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    active_index: usize,
    phase_elapsed: f32,
    phase_duration: f32,
    /// Simulation time a vehicle was last seen moving, per phase index
    last_pass: Vec<f32>,
}

impl PhaseScheduler {
    /// Start at the first phase, sized from the initial queues
    pub fn new(queues: &QueueSnapshot, config: &SimConfig) -> Self {
        let phase_duration = compute_phase_duration(config.phases.get(0), queues, config);
        Self {
            active_index: 0,
            phase_elapsed: 0.0,
            phase_duration,
            last_pass: vec![0.0; config.phases.len()],
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_phase<'a>(&self, config: &'a SimConfig) -> &'a Phase {
        config.phases.get(self.active_index)
    }

    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    pub fn phase_duration(&self) -> f32 {
        self.phase_duration
    }

    /// Last time a vehicle was seen moving while `phase_index` was active
    pub fn last_pass(&self, phase_index: usize) -> f32 {
        self.last_pass.get(phase_index).copied().unwrap_or(0.0)
    }

    /// Whole seconds left in the current phase, never negative
    pub fn countdown(&self) -> u32 {
        (self.phase_duration - self.phase_elapsed).ceil().max(0.0) as u32
    }

    pub fn advance_time(&mut self, delta_secs: f32) {
        self.phase_elapsed += delta_secs;
    }

    /// Stamp the active phase's pass timer if any vehicle anywhere is moving
    ///
    /// Motion on any approach counts, not only the green ones.
    pub fn record_passes<'a>(
        &mut self,
        now: f32,
        vehicles: impl IntoIterator<Item = &'a SimVehicle>,
    ) {
        if vehicles.into_iter().any(|v| !v.is_stopped()) {
            if let Some(last) = self.last_pass.get_mut(self.active_index) {
                *last = now;
            }
        }
    }

    /// Check whether the active phase should end, and why
    pub fn evaluate<'a>(
        &self,
        now: f32,
        vehicles: impl IntoIterator<Item = &'a SimVehicle> + Clone,
        config: &SimConfig,
    ) -> Option<TransitionReason> {
        if self.phase_elapsed < config.min_green {
            return None;
        }

        let phase = self.active_phase(config);
        let drained = phase
            .green
            .iter()
            .all(|approach| discharging_count(vehicles.clone(), *approach, config) == 0);

        if drained {
            Some(TransitionReason::QueueExhausted)
        } else if now - self.last_pass(self.active_index) >= config.gap_threshold {
            Some(TransitionReason::GapOut)
        } else if self.phase_elapsed >= config.max_green {
            Some(TransitionReason::MaxGreen)
        } else {
            None
        }
    }

    /// Move to the next phase and size it from `queues`
    pub fn transition(
        &mut self,
        reason: TransitionReason,
        queues: &QueueSnapshot,
        config: &SimConfig,
    ) {
        let previous = self.active_index;
        self.active_index = config.phases.next_index(self.active_index);
        self.phase_elapsed = 0.0;

        let phase = self.active_phase(config);
        self.phase_duration = compute_phase_duration(phase, queues, config);

        debug!(
            "Phase {} -> {} ({:?}): duration {:.1}s, demand {}",
            config.phases.get(previous).name,
            phase.name,
            reason,
            self.phase_duration,
            queues.demand(&phase.green)
        );
    }

    /// Operator override; ignores the minimum green
    pub fn manual_advance(&mut self, queues: &QueueSnapshot, config: &SimConfig) {
        self.transition(TransitionReason::Manual, queues, config);
    }
}
