//! Signal compliance and car following
//!
//! Decides, every tick, which vehicles move and which are held. This is the
//! only place that changes a vehicle's crossing state.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::HashMap;

use super::config::SimConfig;
use super::phase::Phase;
use super::types::{Approach, VehicleId};
use super::vehicle::SimVehicle;

/// Whether a vehicle short of its stop line would end the next `delta_secs`
/// inside the stopping window or beyond it
pub fn is_near_stop_line(vehicle: &SimVehicle, delta_secs: f32, config: &SimConfig) -> bool {
    let stop_line = config.geometry.stop_line(vehicle.approach);
    let reach = vehicle.distance() + vehicle.speed * delta_secs;
    vehicle.distance() <= stop_line && reach > stop_line - config.stop_margin
}

/// Whether a vehicle has driven past the centre line
pub fn is_past_center(vehicle: &SimVehicle, config: &SimConfig) -> bool {
    vehicle.distance() > config.geometry.center_distance()
}

/// IDs of the vehicles on each approach, front-most first
pub fn lanes(vehicles: &HashMap<VehicleId, SimVehicle>) -> HashMap<Approach, Vec<VehicleId>> {
    let mut lanes: HashMap<Approach, Vec<(OrderedFloat<f32>, VehicleId)>> = HashMap::new();
    for vehicle in vehicles.values() {
        lanes
            .entry(vehicle.approach)
            .or_default()
            .push((vehicle.lane_key(), vehicle.id));
    }

    lanes
        .into_iter()
        .map(|(approach, mut lane)| {
            // Ties broken by ID so the order never depends on map iteration
            lane.sort_by_key(|(key, id)| (Reverse(*key), *id));
            (approach, lane.into_iter().map(|(_, id)| id).collect())
        })
        .collect()
}

/// Apply the active phase and the following rule to every vehicle
/// for a step of `delta_secs`
pub fn apply_controls(
    phase: &Phase,
    vehicles: &mut HashMap<VehicleId, SimVehicle>,
    delta_secs: f32,
    config: &SimConfig,
) {
    for (approach, lane) in lanes(vehicles) {
        let green = phase.is_green_for(approach);
        let mut ahead: Option<VehicleId> = None;

        for vehicle_id in lane {
            let leader = ahead.and_then(|id| vehicles.get(&id)).map(|v| v.position());
            ahead = Some(vehicle_id);

            let Some(vehicle) = vehicles.get_mut(&vehicle_id) else {
                continue;
            };

            if vehicle.has_cleared() {
                continue;
            }

            vehicle.release();

            if !green && is_near_stop_line(vehicle, delta_secs, config) {
                vehicle.hold();
            }

            if let Some(leader) = leader {
                if vehicle.position().distance(&leader) < config.following_distance {
                    vehicle.hold();
                }
            }

            if green && is_past_center(vehicle, config) {
                vehicle.mark_cleared();
            }
        }
    }
}
