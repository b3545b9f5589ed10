//! Signal phase definitions
//!
//! A phase grants right-of-way to a set of approaches and lists the turning
//! movements that stay prohibited while it is active.

use anyhow::{ensure, Result};

use super::types::{Approach, Movement, TurnKind};

/// A static signal phase
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub name: String,
    pub green: Vec<Approach>,
    pub blocked: Vec<Movement>,
}

impl Phase {
    pub fn new(name: impl Into<String>, green: Vec<Approach>, blocked: Vec<Movement>) -> Self {
        Self {
            name: name.into(),
            green,
            blocked,
        }
    }

    /// A phase serving one approach and blocking the right turn of every other one
    pub fn single(name: impl Into<String>, approach: Approach) -> Self {
        let blocked = Approach::ALL
            .iter()
            .filter(|a| **a != approach)
            .map(|a| Movement::new(*a, TurnKind::Right))
            .collect();
        Self::new(name, vec![approach], blocked)
    }

    /// Whether the approach is in this phase's green set
    pub fn serves(&self, approach: Approach) -> bool {
        self.green.contains(&approach)
    }

    /// Whether any movement of the approach is blocked by this phase
    pub fn blocks(&self, approach: Approach) -> bool {
        self.blocked.iter().any(|m| m.approach == approach)
    }

    /// Whether vehicles on this approach may proceed
    ///
    /// A blocked movement disallows the whole approach for stopping purposes.
    pub fn is_green_for(&self, approach: Approach) -> bool {
        self.serves(approach) && !self.blocks(approach)
    }
}

/// The cyclic sequence of phases
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::new(vec![
            Phase::single("N-only", Approach::North),
            Phase::single("S-only", Approach::South),
            Phase::single("W-only", Approach::West),
            Phase::single("E-only", Approach::East),
        ])
    }
}

impl PhaseTable {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.phases.is_empty(), "phase table is empty");
        for phase in &self.phases {
            ensure!(
                !phase.green.is_empty(),
                "phase '{}' has no green approaches",
                phase.name
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phase at `index`, wrapping around the table
    pub fn get(&self, index: usize) -> &Phase {
        &self.phases[index % self.phases.len()]
    }

    /// Cyclic successor of `index`
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.phases.len()
    }
}
