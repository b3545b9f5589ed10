//! Run statistics for the intersection simulation

use log::info;

use super::scheduler::TransitionReason;

/// Counters accumulated over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub elapsed_time: f32,
    pub ticks: u64,
    pub total_vehicles_spawned: u32,
    pub total_vehicles_exited: u32,
    pub queue_exhausted_transitions: u32,
    pub gap_out_transitions: u32,
    pub max_green_transitions: u32,
    pub manual_advances: u32,
    /// Largest total queue seen on any tick
    pub peak_queue: usize,
}

impl SimulationStats {
    pub fn record_transition(&mut self, reason: TransitionReason) {
        match reason {
            TransitionReason::QueueExhausted => self.queue_exhausted_transitions += 1,
            TransitionReason::GapOut => self.gap_out_transitions += 1,
            TransitionReason::MaxGreen => self.max_green_transitions += 1,
            TransitionReason::Manual => self.manual_advances += 1,
        }
    }

    pub fn total_transitions(&self) -> u32 {
        self.queue_exhausted_transitions
            + self.gap_out_transitions
            + self.max_green_transitions
            + self.manual_advances
    }

    /// Log the end-of-run report
    pub fn log_report(&self, active_vehicles: usize) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.elapsed_time);
        info!("Ticks: {}", self.ticks);
        info!("Total vehicles spawned: {}", self.total_vehicles_spawned);
        info!("Total vehicles exited: {}", self.total_vehicles_exited);
        info!("Active vehicles: {}", active_vehicles);
        info!("Phase transitions: {}", self.total_transitions());
        info!("  Queue exhausted: {}", self.queue_exhausted_transitions);
        info!("  Gap out: {}", self.gap_out_transitions);
        info!("  Max green: {}", self.max_green_transitions);
        info!("  Manual: {}", self.manual_advances);
        info!("Peak queue: {}", self.peak_queue);
    }
}
