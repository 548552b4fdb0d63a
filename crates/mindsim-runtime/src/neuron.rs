//! Neuron state and the per-tick update

use rand::Rng;

use crate::{
    ids::{NeuronId, RegionId, SynapseId},
    config::NeuronParams,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Excitatory or inhibitory tag; only decides the sign of outgoing weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NeuronKind {
    /// Positive outgoing weights
    Excitatory,
    /// Negative outgoing weights
    Inhibitory,
}

impl NeuronKind {
    /// Sign applied to outgoing weights
    pub fn sign(&self) -> f32 {
        match self {
            NeuronKind::Excitatory => 1.0,
            NeuronKind::Inhibitory => -1.0,
        }
    }
}

/// Phase of the per-neuron state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeuronPhase {
    /// Counting down after a spike
    Refractory,
    /// Accumulating potential
    Integrating,
    /// Fired on the current tick
    Spiking,
}

/// 2-D position in canvas units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Create a position
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position
    pub fn distance(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A single neuron with its full per-tick state
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neuron {
    /// Neuron id
    pub id: NeuronId,
    /// Position in canvas units
    pub position: Position,
    /// Owning region
    pub region: RegionId,
    /// Excitatory or inhibitory
    pub kind: NeuronKind,
    /// Membrane potential
    pub potential: f32,
    /// Spiking threshold
    pub threshold: f32,
    /// Ticks left in the refractory period
    pub refractory: u32,
    /// Fatigue in `[0, 1]`
    pub fatigue: f32,
    /// Tick of the most recent spike
    pub last_spike: Option<u64>,
    /// True only on the tick the neuron fired
    pub is_spiking: bool,
    /// Outgoing synapses
    pub synapses_out: Vec<SynapseId>,
    /// Incoming synapses
    pub synapses_in: Vec<SynapseId>,
}

impl Neuron {
    /// Create a resting neuron
    pub fn new(
        id: NeuronId,
        position: Position,
        region: RegionId,
        kind: NeuronKind,
        potential: f32,
        threshold: f32,
    ) -> Self {
        Self {
            id,
            position,
            region,
            kind,
            potential,
            threshold,
            refractory: 0,
            fatigue: 0.0,
            last_spike: None,
            is_spiking: false,
            synapses_out: Vec::new(),
            synapses_in: Vec::new(),
        }
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> NeuronPhase {
        if self.is_spiking {
            NeuronPhase::Spiking
        } else if self.refractory > 0 {
            NeuronPhase::Refractory
        } else {
            NeuronPhase::Integrating
        }
    }

    /// Whether the neuron is still counting down after a spike
    pub fn is_refractory(&self) -> bool {
        self.refractory > 0
    }

    /// Whether the neuron fired on `tick`
    pub fn spiked_at(&self, tick: u64) -> bool {
        self.last_spike == Some(tick)
    }

    /// Add potential from a stimulus or a delivered spike
    pub fn receive(&mut self, amount: f32) {
        self.potential += amount;
    }

    /// Advance one tick; returns true if the neuron fired
    pub(crate) fn step<R: Rng>(
        &mut self,
        tick: u64,
        stress: f32,
        params: &NeuronParams,
        rng: &mut R,
    ) -> bool {
        if self.refractory > 0 {
            self.refractory -= 1;
            self.potential *= params.refractory_decay;
            self.is_spiking = false;
            return false;
        }

        self.potential += gaussian(rng) * params.noise_scale;
        self.threshold = params.threshold_for(stress);
        self.fatigue = (self.fatigue + params.fatigue_increment).min(1.0);

        if self.potential > self.threshold {
            self.fire(tick, params);
            true
        } else {
            self.is_spiking = false;
            self.potential *= params.resting_decay;
            false
        }
    }

    fn fire(&mut self, tick: u64, params: &NeuronParams) {
        self.is_spiking = true;
        self.last_spike = Some(tick);
        self.refractory = params.refractory_period;
        self.potential = 0.0;
        self.fatigue = (self.fatigue - params.fatigue_recovery).max(0.0);
    }
}

/// Standard normal sample (Box-Muller)
pub(crate) fn gaussian<R: Rng>(rng: &mut R) -> f32 {
    // gen::<f32>() is in [0, 1); flip to (0, 1] so ln never sees zero
    let u: f32 = 1.0 - rng.gen::<f32>();
    let v: f32 = 1.0 - rng.gen::<f32>();
    (-2.0 * u.ln()).sqrt() * (2.0 * core::f32::consts::PI * v).cos()
}
