//! Functional regions and their aggregate activity

use core::fmt;
use core::str::FromStr;

use crate::{
    ids::{NeuronId, RegionId},
    error::RuntimeError,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Functional role of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RegionRole {
    /// Receives external stimulus
    Sensory,
    /// Source of thoughts; half of consciousness
    Association,
    /// Memory
    Memory,
    /// Drives joy and stress
    Emotion,
    /// Attention
    Attention,
    /// Other half of consciousness
    Executive,
    /// Self-model
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    SelfModel,
}

impl RegionRole {
    /// Number of roles
    pub const COUNT: usize = 7;

    /// All roles in declaration order
    pub const ALL: [RegionRole; Self::COUNT] = [
        RegionRole::Sensory,
        RegionRole::Association,
        RegionRole::Memory,
        RegionRole::Emotion,
        RegionRole::Attention,
        RegionRole::Executive,
        RegionRole::SelfModel,
    ];

    /// Lowercase name
    pub const fn name(&self) -> &'static str {
        match self {
            RegionRole::Sensory => "sensory",
            RegionRole::Association => "association",
            RegionRole::Memory => "memory",
            RegionRole::Emotion => "emotion",
            RegionRole::Attention => "attention",
            RegionRole::Executive => "executive",
            RegionRole::SelfModel => "self",
        }
    }

    const fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RegionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for RegionRole {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        RegionRole::ALL
            .into_iter()
            .find(|role| role.name() == wanted)
            .ok_or_else(|| RuntimeError::region_not_found(s))
    }
}

/// A named partition of the network
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    /// Region id
    pub id: RegionId,
    /// Functional role
    pub role: RegionRole,
    /// Display name
    pub name: String,
    /// Centre x in canvas units
    pub center_x: f32,
    /// Centre y in canvas units
    pub center_y: f32,
    /// Radius in canvas units
    pub radius: f32,
    /// Member neurons
    pub neurons: Vec<NeuronId>,
    /// Mean potential of the members, refreshed every tick
    pub activity: f32,
}

impl Region {
    /// Number of member neurons
    pub fn size(&self) -> usize {
        self.neurons.len()
    }
}

/// Activity per region role for one tick
///
/// Roles with no region in the network read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionActivities {
    values: [f32; RegionRole::COUNT],
}

impl RegionActivities {
    /// All roles at zero activity
    pub fn new() -> Self {
        Self::default()
    }

    /// Activity of a role
    pub fn get(&self, role: RegionRole) -> f32 {
        self.values[role.position()]
    }

    /// Set the activity of a role
    pub fn set(&mut self, role: RegionRole, activity: f32) {
        self.values[role.position()] = activity;
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, role: RegionRole, activity: f32) -> Self {
        self.set(role, activity);
        self
    }
}
