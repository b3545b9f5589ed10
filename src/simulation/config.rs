//! Startup configuration for the intersection simulation
//!
//! Everything here is fixed once the engine is built. Defaults reproduce the
//! timing and geometry of the original prototype (800x800 view, 30 FPS).

use anyhow::{ensure, Result};
use std::ops::Range;

use super::phase::PhaseTable;
use super::types::{Approach, PerApproach, Position};

/// Minimum green duration in seconds
pub const DEFAULT_MIN_GREEN: f32 = 10.0;
/// Maximum green duration in seconds
pub const DEFAULT_MAX_GREEN: f32 = 60.0;
/// Green duration granted with no queued vehicles
pub const DEFAULT_BASE_GREEN: f32 = 10.0;
/// Seconds of green added per queued vehicle
pub const DEFAULT_PER_CAR_ADDITIONAL: f32 = 3.5;
/// Seconds without a passing vehicle before a phase gaps out
pub const DEFAULT_GAP_THRESHOLD: f32 = 2.0;

/// Layout of the intersection in screen units
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Side length of the square visible region
    pub world_size: f32,
    /// Lateral offset of each travel lane from the road centre line
    pub lane_offset: f32,
    /// How far outside the visible region vehicles spawn
    pub spawn_offset: f32,
    /// How far outside the visible region vehicles are discarded
    pub despawn_margin: f32,
    /// Half the side length of the conflict box around the centre
    pub box_half: f32,
    /// Distance from the centre to each approach's stop line
    pub stop_distance: PerApproach<f32>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            world_size: 800.0,
            lane_offset: 20.0,
            spawn_offset: 30.0,
            despawn_margin: 150.0,
            box_half: 80.0,
            stop_distance: PerApproach::splat(130.0),
        }
    }
}

impl Geometry {
    /// Screen coordinates of the intersection centre
    pub fn center(&self) -> Position {
        Position::new(self.world_size / 2.0, self.world_size / 2.0)
    }

    /// Travel distance from a spawn point to the centre line
    pub fn center_distance(&self) -> f32 {
        self.world_size / 2.0 + self.spawn_offset
    }

    /// Travel distance from a spawn point to the approach's stop line
    pub fn stop_line(&self, approach: Approach) -> f32 {
        self.center_distance() - self.stop_distance.get(approach)
    }

    /// Travel distance at which a vehicle leaves the conflict box
    pub fn box_exit(&self) -> f32 {
        self.center_distance() + self.box_half
    }

    /// Travel distance past which a vehicle has left the simulated region
    pub fn exit_distance(&self) -> f32 {
        self.center_distance() + self.world_size / 2.0 + self.despawn_margin
    }

    /// Screen position of a vehicle `distance` units along its approach's lane
    pub fn world_position(&self, approach: Approach, distance: f32) -> Position {
        let size = self.world_size;
        let center = self.center();
        let start = -self.spawn_offset;
        match approach {
            Approach::North => Position::new(center.x + self.lane_offset, start + distance),
            Approach::South => Position::new(center.x - self.lane_offset, size - start - distance),
            Approach::East => Position::new(size - start - distance, center.y + self.lane_offset),
            Approach::West => Position::new(start + distance, center.y - self.lane_offset),
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.world_size.is_finite() && self.world_size > 0.0,
            "world size must be positive, got {}",
            self.world_size
        );
        ensure!(
            self.lane_offset >= 0.0
                && self.spawn_offset >= 0.0
                && self.despawn_margin >= 0.0
                && self.box_half >= 0.0,
            "lane offset, spawn offset, despawn margin and box size must be non-negative"
        );
        for (approach, stop) in self.stop_distance.iter() {
            ensure!(
                stop > 0.0 && stop < self.center_distance(),
                "stop line for approach {} must lie between spawn point and centre, got {}",
                approach,
                stop
            );
        }
        Ok(())
    }
}

/// Full simulation configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub min_green: f32,
    pub max_green: f32,
    pub base_green: f32,
    pub per_car_additional: f32,
    pub gap_threshold: f32,
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    /// Chance that a spawn attempt produces a vehicle
    pub spawn_probability: f64,
    /// Vehicle speed range in units per second
    pub speed_range: Range<f32>,
    /// Closest a vehicle may be to the one ahead before it must stop
    pub following_distance: f32,
    /// How far upstream of the stop line a red signal halts vehicles
    pub stop_margin: f32,
    /// How far past the stop line the queue sensor still counts vehicles
    pub sensor_margin: f32,
    /// Radius around the centre within which approaching vehicles count as queued
    pub sensing_radius: f32,
    /// Radius around the centre within which moving vehicles count as discharging
    pub discharge_radius: f32,
    pub geometry: Geometry,
    pub phases: PhaseTable,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_green: DEFAULT_MIN_GREEN,
            max_green: DEFAULT_MAX_GREEN,
            base_green: DEFAULT_BASE_GREEN,
            per_car_additional: DEFAULT_PER_CAR_ADDITIONAL,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            spawn_interval: 0.8,
            spawn_probability: 0.6,
            speed_range: 66.0..90.0,
            following_distance: 25.0,
            stop_margin: 40.0,
            sensor_margin: 20.0,
            sensing_radius: 160.0,
            discharge_radius: 120.0,
            geometry: Geometry::default(),
            phases: PhaseTable::default(),
        }
    }
}

impl SimConfig {
    /// Check the configuration for values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        self.phases.validate()?;

        for (name, value) in [
            ("min green", self.min_green),
            ("max green", self.max_green),
            ("base green", self.base_green),
            ("per-car additional", self.per_car_additional),
            ("gap threshold", self.gap_threshold),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be a non-negative number, got {}",
                name,
                value
            );
        }
        ensure!(
            self.min_green <= self.max_green,
            "min green ({}) exceeds max green ({})",
            self.min_green,
            self.max_green
        );
        ensure!(
            self.spawn_interval.is_finite() && self.spawn_interval > 0.0,
            "spawn interval must be positive, got {}",
            self.spawn_interval
        );
        ensure!(
            (0.0..=1.0).contains(&self.spawn_probability),
            "spawn probability must be within [0, 1], got {}",
            self.spawn_probability
        );
        ensure!(
            self.speed_range.start.is_finite()
                && self.speed_range.end.is_finite()
                && self.speed_range.start >= 0.0
                && self.speed_range.start < self.speed_range.end,
            "speed range must be non-negative and non-empty, got {:?}",
            self.speed_range
        );
        ensure!(
            self.following_distance > 0.0,
            "following distance must be positive, got {}",
            self.following_distance
        );
        for (name, value) in [
            ("stop margin", self.stop_margin),
            ("sensor margin", self.sensor_margin),
            ("sensing radius", self.sensing_radius),
            ("discharge radius", self.discharge_radius),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be non-negative, got {}",
                name,
                value
            );
        }
        self.geometry.validate()
    }
}
