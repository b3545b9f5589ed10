//! Vehicle state and motion for the intersection simulation
//!
//! A vehicle drives at constant speed along its approach's lane. Whether it
//! moves on a given tick is decided by the car-following controller; the
//! vehicle itself only integrates its position.

use ordered_float::OrderedFloat;

use super::config::Geometry;
use super::types::{Approach, Position, TurnKind, VehicleId};

/// Where a vehicle is in its crossing
///
/// `Crossing` and `Departed` are only reachable after the vehicle has cleared
/// the centre line on green, and no transition leads back out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossState {
    /// Moving towards or through the intersection, not yet committed
    Approaching,
    /// Held by a red signal or by the vehicle ahead
    Stopped,
    /// Committed and still inside the conflict box
    Crossing,
    /// Committed and past the conflict box
    Departed,
}

/// Result of a vehicle motion update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleUpdateResult {
    Continue,
    /// Vehicle has left the simulated region and should be removed
    Exited,
}

/// A vehicle in the intersection simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub approach: Approach,
    /// Turn drawn at spawn, used for display only
    pub turn: TurnKind,
    /// Speed in units per second
    pub speed: f32,
    distance: OrderedFloat<f32>,
    state: CrossState,
    position: Position,
}

impl SimVehicle {
    pub fn new(
        id: VehicleId,
        approach: Approach,
        turn: TurnKind,
        speed: f32,
        distance: f32,
        geometry: &Geometry,
    ) -> Self {
        Self {
            id,
            approach,
            turn,
            speed,
            distance: OrderedFloat(distance),
            state: CrossState::Approaching,
            position: geometry.world_position(approach, distance),
        }
    }

    /// Distance travelled along the lane since the spawn point
    pub fn distance(&self) -> f32 {
        self.distance.into_inner()
    }

    /// Ordering key along the lane; larger is further ahead
    pub fn lane_key(&self) -> OrderedFloat<f32> {
        self.distance
    }

    pub fn state(&self) -> CrossState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_stopped(&self) -> bool {
        self.state == CrossState::Stopped
    }

    /// Whether the vehicle has committed to crossing
    pub fn has_cleared(&self) -> bool {
        matches!(self.state, CrossState::Crossing | CrossState::Departed)
    }

    pub fn distance_to_center(&self, geometry: &Geometry) -> f32 {
        self.position.distance(&geometry.center())
    }

    /// Let the vehicle move this tick
    pub(crate) fn release(&mut self) {
        if self.state == CrossState::Stopped {
            self.state = CrossState::Approaching;
        }
    }

    /// Hold the vehicle in place this tick; ignored once it has cleared
    pub(crate) fn hold(&mut self) {
        if self.state == CrossState::Approaching {
            self.state = CrossState::Stopped;
        }
    }

    /// Commit the vehicle to crossing
    ///
    /// Only a moving vehicle can commit; a held one commits on a later tick.
    pub(crate) fn mark_cleared(&mut self) {
        if self.state == CrossState::Approaching {
            self.state = CrossState::Crossing;
        }
    }

    /// Integrate the vehicle's position over `delta_secs`
    pub fn update(&mut self, delta_secs: f32, geometry: &Geometry) -> VehicleUpdateResult {
        if self.state != CrossState::Stopped {
            self.distance += self.speed * delta_secs;
            self.position = geometry.world_position(self.approach, self.distance());
        }

        if self.state == CrossState::Crossing && self.distance() > geometry.box_exit() {
            self.state = CrossState::Departed;
        }

        if self.distance() > geometry.exit_distance() {
            VehicleUpdateResult::Exited
        } else {
            VehicleUpdateResult::Continue
        }
    }
}
