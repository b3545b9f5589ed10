//! Simulation engine that ties everything together
//!
//! Owns the vehicles and the scheduler and runs one fixed-order tick:
//! spawn, measure queues, schedule, apply controls, move, clean up.

use anyhow::{bail, ensure, Context, Result};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::car_following::apply_controls;
use super::config::SimConfig;
use super::phase::Phase;
use super::queue::{measure_queues, QueueSnapshot};
use super::scheduler::{PhaseScheduler, TransitionReason};
use super::stats::SimulationStats;
use super::types::{Approach, PerApproach, Position, SimId, TurnKind, VehicleId};
use super::vehicle::{CrossState, SimVehicle, VehicleUpdateResult};

/// Shared flag asking the engine to stop mutating state
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read-only view of one vehicle for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleView {
    pub id: VehicleId,
    pub approach: Approach,
    pub turn: TurnKind,
    pub distance: f32,
    pub position: Position,
    pub state: CrossState,
    pub has_cleared: bool,
}

/// Everything a presentation layer needs after a tick
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub time: f32,
    pub phase_index: usize,
    pub phase: Phase,
    pub phase_elapsed: f32,
    pub phase_duration: f32,
    pub countdown: u32,
    /// Whether each approach may currently proceed
    pub signals: PerApproach<bool>,
    /// Vehicles ordered by ID
    pub vehicles: Vec<VehicleView>,
    pub queues: QueueSnapshot,
}

/// The intersection simulation
pub struct SimulationEngine {
    config: SimConfig,

    /// All vehicles currently in the simulated region
    vehicles: HashMap<VehicleId, SimVehicle>,

    scheduler: PhaseScheduler,

    /// Next ID to assign
    next_id: usize,

    /// Simulation time in seconds
    time: f32,

    /// Time since the last spawn attempt
    spawn_timer: f32,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    stats: SimulationStats,

    stop: StopHandle,
}

impl SimulationEngine {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Result<Self> {
        config.validate().context("Invalid simulation configuration")?;

        let scheduler = PhaseScheduler::new(&QueueSnapshot::default(), &config);
        info!(
            "Starting intersection simulation: {} phases, green {:.1}-{:.1}s, first phase {} for {:.1}s",
            config.phases.len(),
            config.min_green,
            config.max_green,
            scheduler.active_phase(&config).name,
            scheduler.phase_duration()
        );

        Ok(Self {
            config,
            vehicles: HashMap::new(),
            scheduler,
            next_id: 0,
            time: 0.0,
            spawn_timer: 0.0,
            rng,
            stats: SimulationStats::default(),
            stop: StopHandle::default(),
        })
    }

    /// Create an engine, refusing invalid configuration
    pub fn new(config: SimConfig) -> Result<Self> {
        Self::new_internal(config, None)
    }

    /// Create an engine with a seeded RNG for reproducible simulations
    pub fn with_seed(config: SimConfig, seed: u64) -> Result<Self> {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range(&mut self, range: std::ops::Range<f32>) -> f32 {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    fn random_bool(&mut self, probability: f64) -> bool {
        match &mut self.rng {
            Some(rng) => rng.random_bool(probability),
            None => rand::rng().random_bool(probability),
        }
    }

    /// Choose a random element from a slice, using seeded RNG if available
    fn choose_random<T: Copy>(&mut self, slice: &[T]) -> Option<T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng).copied(),
            None => slice.choose(&mut rand::rng()).copied(),
        }
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn active_phase(&self) -> &Phase {
        self.scheduler.active_phase(&self.config)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &SimVehicle> {
        self.vehicles.values()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(&id)
    }

    /// Current queue estimate
    pub fn queues(&self) -> QueueSnapshot {
        measure_queues(self.vehicles.values(), &self.config)
    }

    /// A handle other threads can use to stop the engine between ticks
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Place a vehicle at the start of an approach's lane
    pub fn spawn_vehicle(&mut self, approach: Approach, turn: TurnKind, speed: f32) -> Result<VehicleId> {
        self.insert_vehicle(approach, turn, 0.0, speed)
    }

    /// Place a straight-through vehicle `distance` units along an approach's lane
    pub fn insert_vehicle_at(&mut self, approach: Approach, distance: f32, speed: f32) -> Result<VehicleId> {
        self.insert_vehicle(approach, TurnKind::Straight, distance, speed)
    }

    fn insert_vehicle(
        &mut self,
        approach: Approach,
        turn: TurnKind,
        distance: f32,
        speed: f32,
    ) -> Result<VehicleId> {
        ensure!(
            speed.is_finite() && speed >= 0.0,
            "Vehicle speed must be non-negative, got {}",
            speed
        );
        ensure!(
            distance.is_finite() && distance >= 0.0 && distance <= self.config.geometry.exit_distance(),
            "Vehicle distance {} is outside the simulated lane",
            distance
        );

        let id = self.next_vehicle_id();
        let vehicle = SimVehicle::new(id, approach, turn, speed, distance, &self.config.geometry);
        self.vehicles.insert(id, vehicle);
        self.stats.total_vehicles_spawned += 1;
        debug!("Spawned vehicle {:?} on approach {} at {:.1} ({:.1} u/s)", id.0, approach, distance, speed);
        Ok(id)
    }

    /// Spawn a vehicle on a random approach with a random turn and speed
    fn spawn_random_vehicle(&mut self) -> Result<VehicleId> {
        let approach = self
            .choose_random(&Approach::ALL)
            .context("No approach to spawn on")?;
        let turn = self
            .choose_random(&TurnKind::ALL)
            .context("No turn to choose")?;
        let speed = self.random_range(self.config.speed_range.clone());
        self.spawn_vehicle(approach, turn, speed)
    }

    /// Attempt a spawn every spawn interval
    fn update_spawning(&mut self, delta_secs: f32) {
        self.spawn_timer += delta_secs;
        if self.spawn_timer > self.config.spawn_interval {
            self.spawn_timer = 0.0;
            if self.random_bool(self.config.spawn_probability) {
                if let Err(e) = self.spawn_random_vehicle() {
                    warn!("Failed to spawn vehicle: {:#}", e);
                }
            }
        }
    }

    /// Run the scheduler for this tick and return the transition, if any
    fn update_scheduler(&mut self) -> Option<TransitionReason> {
        let queues = measure_queues(self.vehicles.values(), &self.config);
        self.stats.peak_queue = self.stats.peak_queue.max(queues.total());
        trace!("Queues at {:.2}s: {:?}", self.time, queues);

        self.scheduler.record_passes(self.time, self.vehicles.values());
        let reason = self
            .scheduler
            .evaluate(self.time, self.vehicles.values(), &self.config)?;

        let queues = measure_queues(self.vehicles.values(), &self.config);
        self.scheduler.transition(reason, &queues, &self.config);
        self.stats.record_transition(reason);
        Some(reason)
    }

    /// Move every vehicle and drop the ones that left the region
    fn update_vehicles(&mut self, delta_secs: f32) {
        let geometry = &self.config.geometry;
        let mut exited = Vec::new();
        for (id, vehicle) in &mut self.vehicles {
            if vehicle.update(delta_secs, geometry) == VehicleUpdateResult::Exited {
                exited.push(*id);
            }
        }

        for id in exited {
            self.vehicles.remove(&id);
            self.stats.total_vehicles_exited += 1;
        }
    }

    /// Advance the simulation by `delta_secs` of simulated time
    ///
    /// A negative or non-finite delta is rejected without touching any state.
    /// Once stopped, ticks are accepted but do nothing.
    pub fn tick(&mut self, delta_secs: f32) -> Result<()> {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            warn!("Rejected tick with delta {}", delta_secs);
            bail!("Tick delta must be a non-negative number, got {}", delta_secs);
        }
        if self.is_stopped() {
            trace!("Engine stopped, ignoring tick");
            return Ok(());
        }

        self.time += delta_secs;
        self.scheduler.advance_time(delta_secs);
        self.stats.elapsed_time = self.time;
        self.stats.ticks += 1;

        self.update_spawning(delta_secs);
        self.update_scheduler();

        apply_controls(
            self.scheduler.active_phase(&self.config),
            &mut self.vehicles,
            delta_secs,
            &self.config,
        );

        self.update_vehicles(delta_secs);
        Ok(())
    }

    /// Operator override: advance to the next phase now
    pub fn request_manual_advance(&mut self) {
        if self.is_stopped() {
            warn!("Engine stopped, ignoring manual advance");
            return;
        }
        let queues = measure_queues(self.vehicles.values(), &self.config);
        self.scheduler.manual_advance(&queues, &self.config);
        self.stats.record_transition(TransitionReason::Manual);
    }

    /// Read-only view of the current state
    pub fn snapshot(&self) -> Snapshot {
        let phase = self.active_phase().clone();

        let mut signals = PerApproach::splat(false);
        for approach in Approach::ALL {
            signals.set(approach, phase.is_green_for(approach));
        }

        let mut vehicles: Vec<VehicleView> = self
            .vehicles
            .values()
            .map(|v| VehicleView {
                id: v.id,
                approach: v.approach,
                turn: v.turn,
                distance: v.distance(),
                position: v.position(),
                state: v.state(),
                has_cleared: v.has_cleared(),
            })
            .collect();
        vehicles.sort_by_key(|v| v.id);

        Snapshot {
            time: self.time,
            phase_index: self.scheduler.active_index(),
            phase,
            phase_elapsed: self.scheduler.phase_elapsed(),
            phase_duration: self.scheduler.phase_duration(),
            countdown: self.scheduler.countdown(),
            signals,
            vehicles,
            queues: self.queues(),
        }
    }
}
