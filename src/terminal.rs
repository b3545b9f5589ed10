//! Terminal front end for headless runs
//!
//! Reads a [`Snapshot`] and prints it; never touches the engine.

use crate::simulation::{Approach, CrossState, Geometry, Position, Snapshot};

/// World units per map character
const MAP_SCALE: f32 = 20.0;

/// Print a summary of the intersection state
pub fn print_summary(snapshot: &Snapshot) {
    println!("=== Intersection Summary ===");
    println!("Time: {:.2}s", snapshot.time);
    println!(
        "Phase: {} (#{}) | Time left: {}s | Elapsed: {:.1}s of {:.1}s",
        snapshot.phase.name,
        snapshot.phase_index,
        snapshot.countdown,
        snapshot.phase_elapsed,
        snapshot.phase_duration
    );

    let signals: Vec<String> = snapshot
        .signals
        .iter()
        .map(|(approach, green)| format!("{}:{}", approach, if green { "G" } else { "R" }))
        .collect();
    println!("Signals: {}", signals.join(" "));

    let queues: Vec<String> = snapshot
        .queues
        .iter()
        .map(|(approach, count)| format!("{}:{}", approach, count))
        .collect();
    println!("Queues {}", queues.join(" "));

    let stopped = snapshot
        .vehicles
        .iter()
        .filter(|v| v.state == CrossState::Stopped)
        .count();
    let cleared = snapshot.vehicles.iter().filter(|v| v.has_cleared).count();
    println!(
        "Vehicles: {} (stopped {}, cleared {})",
        snapshot.vehicles.len(),
        stopped,
        cleared
    );
}

fn vehicle_glyph(approach: Approach, state: CrossState) -> char {
    if state == CrossState::Stopped {
        return 'o';
    }
    match approach {
        Approach::North => 'v',
        Approach::South => '^',
        Approach::East => '<',
        Approach::West => '>',
    }
}

/// Draw a bird's-eye map of the intersection in the terminal
pub fn draw_map(snapshot: &Snapshot, geometry: &Geometry) {
    let size = (geometry.world_size / MAP_SCALE).ceil().max(1.0) as usize;
    let mut grid = vec![vec![' '; size]; size];

    let to_grid = |pos: Position| -> Option<(usize, usize)> {
        let col = (pos.x / MAP_SCALE).floor();
        let row = (pos.y / MAP_SCALE).floor();
        if col < 0.0 || row < 0.0 || col >= size as f32 || row >= size as f32 {
            None
        } else {
            Some((row as usize, col as usize))
        }
    };

    let center = geometry.center();
    let road_half = geometry.lane_offset * 2.0;

    // Roads
    for (row, line) in grid.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            let x = (col as f32 + 0.5) * MAP_SCALE;
            let y = (row as f32 + 0.5) * MAP_SCALE;
            if (x - center.x).abs() < road_half || (y - center.y).abs() < road_half {
                *cell = '.';
            }
        }
    }

    // Conflict box outline
    let corners = [
        Position::new(center.x - geometry.box_half, center.y - geometry.box_half),
        Position::new(center.x + geometry.box_half - 1.0, center.y + geometry.box_half - 1.0),
    ];
    if let (Some((top, left)), Some((bottom, right))) = (to_grid(corners[0]), to_grid(corners[1])) {
        for col in left..=right {
            grid[top][col] = '#';
            grid[bottom][col] = '#';
        }
        for row in top..=bottom {
            grid[row][left] = '#';
            grid[row][right] = '#';
        }
    }

    // Signal heads sit at each stop line, beside the incoming lane
    for (approach, green) in snapshot.signals.iter() {
        let stop = geometry.stop_distance.get(approach);
        let (hx, hy) = approach.heading();
        let side = geometry.lane_offset * 3.0;
        let pos = Position::new(
            center.x - hx * stop + hy * side,
            center.y - hy * stop - hx * side,
        );
        if let Some((row, col)) = to_grid(pos) {
            grid[row][col] = if green { 'G' } else { 'R' };
        }
    }

    // Vehicles
    for vehicle in &snapshot.vehicles {
        if let Some((row, col)) = to_grid(vehicle.position) {
            grid[row][col] = vehicle_glyph(vehicle.approach, vehicle.state);
        }
    }

    println!("\n=== Intersection Map ===");
    println!("Legend: G/R=Signal, #=Conflict box, v^<>=Moving vehicle, o=Stopped vehicle");
    println!();
    for row in &grid {
        let line: String = row.iter().collect();
        println!("{}", line);
    }
    println!();
}
