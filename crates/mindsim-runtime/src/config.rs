//! Simulation configuration
//!
//! All constants the engine uses are carried here and threaded into each
//! component at construction. Every section has a `Default` with the stock
//! constants and a `validate` that rejects values the engine cannot run
//! with.

use crate::{error::*, region::RegionRole};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn check_unit(parameter: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(RuntimeError::invalid_parameter(
            parameter,
            value.to_string(),
            "in [0, 1]",
        ));
    }
    Ok(())
}

fn check_positive(parameter: &str, value: f32) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(RuntimeError::invalid_parameter(
            parameter,
            value.to_string(),
            "> 0.0",
        ));
    }
    Ok(())
}

/// Both bounds finite and `lo <= hi`
fn check_ordered(lo_name: &str, lo: f32, hi_name: &str, hi: f32) -> Result<()> {
    for (name, value) in [(lo_name, lo), (hi_name, hi)] {
        if !value.is_finite() {
            return Err(RuntimeError::invalid_parameter(name, value.to_string(), "finite"));
        }
    }
    if !(lo <= hi) {
        return Err(RuntimeError::invalid_parameter(
            hi_name,
            format!("{} (with {}={})", hi, lo_name, lo),
            format!(">= {}", lo_name),
        ));
    }
    Ok(())
}

/// Placement of one region on the reference canvas
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionSpec {
    /// Functional role, unique within a layout
    pub role: RegionRole,
    /// Human readable name
    pub name: String,
    /// Centre x as a fraction of canvas width
    pub center_x: f32,
    /// Centre y as a fraction of canvas height
    pub center_y: f32,
    /// Radius in canvas units
    pub radius: f32,
}

impl RegionSpec {
    /// Create a region placement
    pub fn new(role: RegionRole, name: impl Into<String>, center_x: f32, center_y: f32, radius: f32) -> Self {
        Self {
            role,
            name: name.into(),
            center_x,
            center_y,
            radius,
        }
    }

    /// The stock seven-region layout
    pub fn default_layout() -> Vec<RegionSpec> {
        vec![
            Self::new(RegionRole::Sensory, "Sensory", 0.2, 0.2, 80.0),
            Self::new(RegionRole::Association, "Association", 0.5, 0.5, 120.0),
            Self::new(RegionRole::Memory, "Memory", 0.8, 0.3, 90.0),
            Self::new(RegionRole::Emotion, "Emotion", 0.25, 0.7, 70.0),
            Self::new(RegionRole::Attention, "Attention", 0.7, 0.7, 60.0),
            Self::new(RegionRole::Executive, "Executive", 0.5, 0.2, 70.0),
            Self::new(RegionRole::SelfModel, "Self-model", 0.5, 0.8, 50.0),
        ]
    }
}

/// Network construction parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Requested neuron total, split evenly (rounded down) across regions
    pub neuron_count: usize,
    /// Probability that an ordered neuron pair is considered for a synapse
    pub synapse_density: f64,
    /// Lower bound of the initial weight magnitude
    pub weight_min: f32,
    /// Upper bound of the initial weight magnitude
    pub weight_max: f32,
    /// Minimum synaptic delay (ticks)
    pub base_delay: u32,
    /// Extra delay drawn uniformly from `0..=delay_jitter`
    pub delay_jitter: u32,
    /// Fraction of neurons that are excitatory
    pub excitatory_fraction: f32,
    /// Reference canvas width used to place region centres
    pub canvas_width: f32,
    /// Reference canvas height used to place region centres
    pub canvas_height: f32,
    /// Region layout
    pub regions: Vec<RegionSpec>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            neuron_count: 1500,
            synapse_density: 0.02,
            weight_min: 0.1,
            weight_max: 0.5,
            base_delay: 1,
            delay_jitter: 2,
            excitatory_fraction: 0.8,
            canvas_width: 800.0,
            canvas_height: 600.0,
            regions: RegionSpec::default_layout(),
        }
    }
}

impl NetworkConfig {
    /// Neurons placed in each region
    pub fn region_quota(&self) -> usize {
        if self.regions.is_empty() {
            0
        } else {
            self.neuron_count / self.regions.len()
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(RuntimeError::invalid_config("region layout is empty"));
        }
        if self.neuron_count == 0 {
            return Err(RuntimeError::invalid_parameter(
                "neuron_count",
                "0",
                "> 0",
            ));
        }
        if self.neuron_count < self.regions.len() {
            return Err(RuntimeError::invalid_parameter(
                "neuron_count",
                format!("{} (with {} regions)", self.neuron_count, self.regions.len()),
                ">= region count",
            ));
        }
        if !(0.0..=1.0).contains(&self.synapse_density) {
            return Err(RuntimeError::invalid_parameter(
                "synapse_density",
                self.synapse_density.to_string(),
                "in [0, 1]",
            ));
        }
        check_unit("weight_min", self.weight_min)?;
        check_unit("weight_max", self.weight_max)?;
        check_ordered("weight_min", self.weight_min, "weight_max", self.weight_max)?;
        if self.base_delay == 0 {
            return Err(RuntimeError::invalid_parameter("base_delay", "0", ">= 1"));
        }
        check_unit("excitatory_fraction", self.excitatory_fraction)?;
        check_positive("canvas_width", self.canvas_width)?;
        check_positive("canvas_height", self.canvas_height)?;

        for (i, spec) in self.regions.iter().enumerate() {
            check_positive("radius", spec.radius)?;
            if !(spec.center_x.is_finite() && spec.center_y.is_finite()) {
                return Err(RuntimeError::invalid_config(format!(
                    "region {} has a non-finite centre",
                    spec.role
                )));
            }
            if self.regions[..i].iter().any(|other| other.role == spec.role) {
                return Err(RuntimeError::invalid_config(format!(
                    "region role {} appears more than once",
                    spec.role
                )));
            }
        }
        Ok(())
    }
}

/// Per-neuron dynamics
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NeuronParams {
    /// Ticks a neuron stays refractory after spiking
    pub refractory_period: u32,
    /// Potential multiplier while refractory
    pub refractory_decay: f32,
    /// Potential multiplier when integrating without a spike
    pub resting_decay: f32,
    /// Standard deviation of the per-tick potential noise
    pub noise_scale: f32,
    /// Threshold with zero stress
    pub threshold_baseline: f32,
    /// Threshold increase per unit of stress
    pub stress_threshold_gain: f32,
    /// Fatigue added on every integrating tick
    pub fatigue_increment: f32,
    /// Fatigue removed by a spike
    pub fatigue_recovery: f32,
    /// Initial potential is drawn from `[-spread, spread]`
    pub initial_potential_spread: f32,
    /// Lower bound of the initial threshold
    pub initial_threshold_min: f32,
    /// Upper bound of the initial threshold
    pub initial_threshold_max: f32,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            refractory_period: 5,
            refractory_decay: 0.9,
            resting_decay: 0.98,
            noise_scale: 0.02,
            threshold_baseline: 0.6,
            stress_threshold_gain: 0.2,
            fatigue_increment: 0.0001,
            fatigue_recovery: 0.01,
            initial_potential_spread: 0.05,
            initial_threshold_min: 0.5,
            initial_threshold_max: 0.7,
        }
    }
}

impl NeuronParams {
    /// Threshold for a given stress level
    pub fn threshold_for(&self, stress: f32) -> f32 {
        self.threshold_baseline + stress * self.stress_threshold_gain
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        check_unit("refractory_decay", self.refractory_decay)?;
        check_unit("resting_decay", self.resting_decay)?;
        if !(self.noise_scale >= 0.0 && self.noise_scale.is_finite()) {
            return Err(RuntimeError::invalid_parameter(
                "noise_scale",
                self.noise_scale.to_string(),
                ">= 0.0",
            ));
        }
        if !self.threshold_baseline.is_finite() || !self.stress_threshold_gain.is_finite() {
            return Err(RuntimeError::invalid_config("threshold parameters must be finite"));
        }
        check_unit("fatigue_increment", self.fatigue_increment)?;
        check_unit("fatigue_recovery", self.fatigue_recovery)?;
        if !(self.initial_potential_spread >= 0.0 && self.initial_potential_spread.is_finite()) {
            return Err(RuntimeError::invalid_parameter(
                "initial_potential_spread",
                self.initial_potential_spread.to_string(),
                ">= 0.0",
            ));
        }
        check_ordered(
            "initial_threshold_min",
            self.initial_threshold_min,
            "initial_threshold_max",
            self.initial_threshold_max,
        )
    }
}

/// Hebbian weight update parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlasticityParams {
    /// Weight multiplier when both endpoints spike on the same tick
    pub potentiation_factor: f32,
    /// Weight multiplier for synapses whose source has been idle
    pub decay_factor: f32,
    /// Ticks without a source spike before decay applies
    pub idle_window: u64,
    /// Maximum weight magnitude
    pub max_weight: f32,
}

impl Default for PlasticityParams {
    fn default() -> Self {
        Self {
            potentiation_factor: 1.01,
            decay_factor: 0.9999,
            idle_window: 100,
            max_weight: 1.0,
        }
    }
}

impl PlasticityParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        check_positive("potentiation_factor", self.potentiation_factor)?;
        check_unit("decay_factor", self.decay_factor)?;
        check_positive("max_weight", self.max_weight)
    }
}

/// Emotion, attention, consciousness and thought parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CognitionParams {
    /// Emotion region activity above which emotions move up
    pub arousal_threshold: f32,
    /// Sensory activity above which arousal turns into joy instead of stress
    pub sensory_joy_threshold: f32,
    /// Joy increase per aroused tick
    pub joy_step: f32,
    /// Stress increase per aroused tick
    pub stress_step: f32,
    /// Joy decrease per calm tick
    pub joy_recovery: f32,
    /// Stress decrease per calm tick
    pub stress_recovery: f32,
    /// Association activity required to form a thought
    pub thought_threshold: f32,
    /// Per-tick probability that a thought forms when above threshold
    pub thought_gate_probability: f64,
    /// Strength multiplier applied to every thought each tick
    pub thought_decay: f32,
    /// Thoughts weaker than this are forgotten
    pub thought_floor: f32,
    /// Attention level while no thought is live
    pub idle_attention: f32,
    /// Initial clarity before the first tick
    pub initial_clarity: f32,
    /// Initial fear level
    pub initial_fear: f32,
    /// Initial joy level
    pub initial_joy: f32,
    /// Initial stress level
    pub initial_stress: f32,
    /// Initial interest level
    pub initial_interest: f32,
    /// Initial apathy level
    pub initial_apathy: f32,
}

impl Default for CognitionParams {
    fn default() -> Self {
        Self {
            arousal_threshold: 0.6,
            sensory_joy_threshold: 0.5,
            joy_step: 0.01,
            stress_step: 0.005,
            joy_recovery: 0.003,
            stress_recovery: 0.002,
            thought_threshold: 0.6,
            thought_gate_probability: 0.1,
            thought_decay: 0.995,
            thought_floor: 0.01,
            idle_attention: 0.1,
            initial_clarity: 0.5,
            initial_fear: 0.1,
            initial_joy: 0.1,
            initial_stress: 0.1,
            initial_interest: 0.2,
            initial_apathy: 0.1,
        }
    }
}

impl CognitionParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("joy_step", self.joy_step),
            ("stress_step", self.stress_step),
            ("joy_recovery", self.joy_recovery),
            ("stress_recovery", self.stress_recovery),
            ("thought_decay", self.thought_decay),
            ("thought_floor", self.thought_floor),
            ("idle_attention", self.idle_attention),
            ("initial_fear", self.initial_fear),
            ("initial_joy", self.initial_joy),
            ("initial_stress", self.initial_stress),
            ("initial_interest", self.initial_interest),
            ("initial_apathy", self.initial_apathy),
        ] {
            check_unit(name, value)?;
        }
        if !(0.0..=1.0).contains(&self.thought_gate_probability) {
            return Err(RuntimeError::invalid_parameter(
                "thought_gate_probability",
                self.thought_gate_probability.to_string(),
                "in [0, 1]",
            ));
        }
        for (name, value) in [
            ("arousal_threshold", self.arousal_threshold),
            ("sensory_joy_threshold", self.sensory_joy_threshold),
            ("thought_threshold", self.thought_threshold),
            ("initial_clarity", self.initial_clarity),
        ] {
            if !value.is_finite() {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), "finite"));
            }
        }
        Ok(())
    }
}

/// External stimulus parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StimulusParams {
    /// Stimulus level is divided by this to get a per-neuron probability
    pub sensory_divisor: f32,
    /// Lower bound of the sensory potential boost
    pub sensory_boost_min: f32,
    /// Upper bound of the sensory potential boost
    pub sensory_boost_max: f32,
    /// Per-tick probability of a replay event while sleeping
    pub replay_probability: f64,
    /// Potential added to the replayed neuron
    pub replay_boost: f32,
    /// Radius around a poke point within which neurons are boosted
    pub poke_radius: f32,
    /// Potential added by a poke
    pub poke_boost: f32,
    /// Threshold multiplier applied by regional damage
    pub damage_threshold_factor: f32,
}

impl Default for StimulusParams {
    fn default() -> Self {
        Self {
            sensory_divisor: 1000.0,
            sensory_boost_min: 0.5,
            sensory_boost_max: 1.0,
            replay_probability: 0.01,
            replay_boost: 0.8,
            poke_radius: 30.0,
            poke_boost: 1.0,
            damage_threshold_factor: 1.5,
        }
    }
}

impl StimulusParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        check_positive("sensory_divisor", self.sensory_divisor)?;
        check_ordered(
            "sensory_boost_min",
            self.sensory_boost_min,
            "sensory_boost_max",
            self.sensory_boost_max,
        )?;
        if !(0.0..=1.0).contains(&self.replay_probability) {
            return Err(RuntimeError::invalid_parameter(
                "replay_probability",
                self.replay_probability.to_string(),
                "in [0, 1]",
            ));
        }
        check_positive("poke_radius", self.poke_radius)?;
        check_positive("damage_threshold_factor", self.damage_threshold_factor)?;
        if !(self.replay_boost.is_finite() && self.poke_boost.is_finite()) {
            return Err(RuntimeError::invalid_config("boost values must be finite"));
        }
        Ok(())
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Network construction
    pub network: NetworkConfig,
    /// Neuron dynamics
    pub neuron: NeuronParams,
    /// Hebbian plasticity
    pub plasticity: PlasticityParams,
    /// Cognition layer
    pub cognition: CognitionParams,
    /// External stimulus
    pub stimulus: StimulusParams,
}

impl SimulationConfig {
    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the requested neuron total
    pub fn with_neuron_count(mut self, neuron_count: usize) -> Self {
        self.network.neuron_count = neuron_count;
        self
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.neuron.validate()?;
        self.plasticity.validate()?;
        self.cognition.validate()?;
        self.stimulus.validate()
    }
}
