//! Core types for the intersection simulation
//!
//! These are plain value types shared by every component.

use std::fmt;

/// A unique identifier for simulation entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub SimId);

/// The compass direction a vehicle is travelling *from*
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Approach {
    North,
    South,
    East,
    West,
}

impl Approach {
    /// All approaches, in the order used for indexing per-approach tables
    pub const ALL: [Approach; 4] = [
        Approach::North,
        Approach::South,
        Approach::East,
        Approach::West,
    ];

    /// Stable index into per-approach arrays
    pub fn index(self) -> usize {
        match self {
            Approach::North => 0,
            Approach::South => 1,
            Approach::East => 2,
            Approach::West => 3,
        }
    }

    /// Single-letter label used by the terminal renderer
    pub fn letter(self) -> char {
        match self {
            Approach::North => 'N',
            Approach::South => 'S',
            Approach::East => 'E',
            Approach::West => 'W',
        }
    }

    /// Unit vector of travel in screen coordinates (y grows downwards)
    pub fn heading(self) -> (f32, f32) {
        match self {
            Approach::North => (0.0, 1.0),
            Approach::South => (0.0, -1.0),
            Approach::East => (-1.0, 0.0),
            Approach::West => (1.0, 0.0),
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The movement a vehicle makes through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnKind {
    Straight,
    Left,
    Right,
}

impl TurnKind {
    pub const ALL: [TurnKind; 3] = [TurnKind::Straight, TurnKind::Left, TurnKind::Right];
}

/// A turning movement from one approach, used to mark conflicts a phase prohibits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Movement {
    pub approach: Approach,
    pub turn: TurnKind,
}

impl Movement {
    pub fn new(approach: Approach, turn: TurnKind) -> Self {
        Self { approach, turn }
    }
}

/// A 2D position in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A value kept for each of the four approaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerApproach<T> {
    values: [T; 4],
}

impl<T: Copy> PerApproach<T> {
    pub fn splat(value: T) -> Self {
        Self { values: [value; 4] }
    }

    pub fn get(&self, approach: Approach) -> T {
        self.values[approach.index()]
    }

    pub fn set(&mut self, approach: Approach, value: T) {
        self.values[approach.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Approach, T)> + '_ {
        Approach::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}
