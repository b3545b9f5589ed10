//! Queue and demand estimation
//!
//! Pure functions over the vehicle set. Nothing here mutates state, so calling
//! them twice on an unchanged vehicle set gives the same answer.

use super::config::SimConfig;
use super::types::{Approach, PerApproach};
use super::vehicle::SimVehicle;

/// Estimated number of queued vehicles per approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueSnapshot {
    counts: PerApproach<usize>,
}

impl QueueSnapshot {
    pub fn get(&self, approach: Approach) -> usize {
        self.counts.get(approach)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Combined queue over a set of approaches
    pub fn demand(&self, approaches: &[Approach]) -> usize {
        approaches.iter().map(|a| self.get(*a)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Approach, usize)> + '_ {
        self.counts.iter()
    }
}

/// Whether a vehicle counts towards its approach's queue
///
/// The sensor covers everything upstream of a point `sensor_margin` past the
/// stop line. Inside it, a vehicle is queued if it is stopped or close to the
/// centre. Slow movers near the centre are deliberately counted as demand.
pub fn is_queued(vehicle: &SimVehicle, config: &SimConfig) -> bool {
    let geometry = &config.geometry;
    let sensor_end = geometry.stop_line(vehicle.approach) + config.sensor_margin;
    vehicle.distance() < sensor_end
        && (vehicle.is_stopped() || vehicle.distance_to_center(geometry) < config.sensing_radius)
}

/// Count queued vehicles on every approach
pub fn measure_queues<'a>(
    vehicles: impl IntoIterator<Item = &'a SimVehicle>,
    config: &SimConfig,
) -> QueueSnapshot {
    let mut snapshot = QueueSnapshot::default();
    for vehicle in vehicles {
        if is_queued(vehicle, config) {
            let count = snapshot.get(vehicle.approach);
            snapshot.counts.set(vehicle.approach, count + 1);
        }
    }
    snapshot
}

/// Number of vehicles on `approach` moving within the discharge radius
pub fn discharging_count<'a>(
    vehicles: impl IntoIterator<Item = &'a SimVehicle>,
    approach: Approach,
    config: &SimConfig,
) -> usize {
    vehicles
        .into_iter()
        .filter(|v| {
            v.approach == approach
                && !v.is_stopped()
                && v.distance_to_center(&config.geometry) < config.discharge_radius
        })
        .count()
}
