//! Tick engine

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    ids::NeuronId,
    cognition::{refresh_region_activity, CognitionModule, EmotionKind},
    config::SimulationConfig,
    error::*,
    network::Network,
    neuron::Position,
    plasticity::{HebbianRule, PlasticityModule},
    region::RegionRole,
    scheduler::{ScheduledSpike, SpikeScheduler},
    snapshot::SimulationSnapshot,
    wiring,
};

/// Counters for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick these counters belong to
    pub tick: u64,
    /// Neurons that fired
    pub spikes: usize,
    /// Spikes whose weight was applied
    pub delivered: usize,
    /// Spikes dropped because the target was refractory
    pub blocked_refractory: usize,
    /// Updates skipped because a referenced entity is missing
    pub dangling: usize,
    /// Synapses strengthened
    pub potentiated: usize,
    /// Synapses weakened
    pub decayed: usize,
    /// Thoughts formed
    pub thoughts_created: usize,
    /// Thoughts forgotten
    pub thoughts_removed: usize,
}

/// Owns a network and advances it one tick at a time
#[derive(Debug)]
pub struct SimulationEngine {
    config: SimulationConfig,
    network: Network,
    scheduler: SpikeScheduler,
    plasticity: PlasticityModule<HebbianRule>,
    cognition: CognitionModule,
    rng: StdRng,
    time: u64,
    last_report: TickReport,
}

impl SimulationEngine {
    /// Generate a network from `config` and wrap it in an engine
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = make_rng(config.seed);
        let network = wiring::generate(&config.network, &config.neuron, &mut rng)?;
        Self::assemble(network, config, rng)
    }

    /// Wrap a hand-built network; `config.network` is not used
    pub fn from_network(network: Network, config: SimulationConfig) -> Result<Self> {
        if network.neuron_count() == 0 {
            return Err(RuntimeError::invalid_config("network has no neurons"));
        }
        let rng = make_rng(config.seed);
        Self::assemble(network, config, rng)
    }

    fn assemble(network: Network, config: SimulationConfig, rng: StdRng) -> Result<Self> {
        config.neuron.validate()?;
        config.stimulus.validate()?;
        let plasticity = PlasticityModule::new(HebbianRule::new(config.plasticity.clone())?);
        let cognition = CognitionModule::new(config.cognition.clone())?;

        log::info!(
            "Simulation engine ready: {} neurons, {} synapses, {} regions (seed {:?})",
            network.neuron_count(),
            network.synapse_count(),
            network.region_count(),
            config.seed
        );

        Ok(Self {
            config,
            network,
            scheduler: SpikeScheduler::new(),
            plasticity,
            cognition,
            rng,
            time: 0,
            last_report: TickReport::default(),
        })
    }

    /// Run one tick and return the resulting state
    ///
    /// A negative or non-finite `stimulus` is treated as zero.
    pub fn tick(&mut self, stimulus: f32, sleeping: bool) -> SimulationSnapshot {
        self.step(stimulus, sleeping);
        self.snapshot()
    }

    /// Run one tick without building a snapshot
    pub fn step(&mut self, stimulus: f32, sleeping: bool) -> TickReport {
        let stimulus = sanitize_stimulus(stimulus);
        self.time += 1;
        let tick = self.time;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        if sleeping {
            self.replay();
        } else {
            report.dangling += self.inject_sensory(stimulus);
        }

        self.update_neurons(tick, &mut report);
        self.deliver(tick, &mut report);

        let stats = self.plasticity.apply(&mut self.network, tick);
        report.potentiated = stats.potentiated;
        report.decayed = stats.decayed;
        report.dangling += stats.skipped;

        let (activities, dangling) = refresh_region_activity(&mut self.network);
        report.dangling += dangling;
        let stats = self.cognition.update(&activities, tick, &mut self.rng);
        report.thoughts_created = stats.created;
        report.thoughts_removed = stats.removed;

        log::trace!("tick {}: {:?}", tick, report);
        self.last_report = report;
        report
    }

    /// Run `ticks` ticks with fixed inputs and return the final state
    pub fn run(&mut self, ticks: u64, stimulus: f32, sleeping: bool) -> SimulationSnapshot {
        for _ in 0..ticks {
            self.step(stimulus, sleeping);
        }
        self.snapshot()
    }

    fn inject_sensory(&mut self, stimulus: f32) -> usize {
        let params = &self.config.stimulus;
        let probability = f64::from(stimulus / params.sensory_divisor).clamp(0.0, 1.0);
        if probability == 0.0 {
            return 0;
        }

        let Network { neurons, regions, .. } = &mut self.network;
        let Some(sensory) = regions.values().find(|region| region.role == RegionRole::Sensory) else {
            return 0;
        };

        let mut dangling = 0;
        for id in &sensory.neurons {
            if !self.rng.gen_bool(probability) {
                continue;
            }
            let boost = self.rng.gen_range(params.sensory_boost_min..=params.sensory_boost_max);
            match neurons.get_mut(*id) {
                Some(neuron) => neuron.receive(boost),
                None => dangling += 1,
            }
        }
        dangling
    }

    fn replay(&mut self) {
        let params = &self.config.stimulus;
        if !self.rng.gen_bool(params.replay_probability) {
            return;
        }
        let ids = self.network.neuron_ids();
        if let Some(&id) = ids.choose(&mut self.rng) {
            if let Some(neuron) = self.network.neuron_mut(id) {
                neuron.receive(params.replay_boost);
                log::trace!("replay boost on {}", id);
            }
        }
    }

    fn update_neurons(&mut self, tick: u64, report: &mut TickReport) {
        let stress = self.cognition.emotions().level(EmotionKind::Stress);
        let params = &self.config.neuron;
        let mut fired: Vec<NeuronId> = Vec::new();

        for (id, neuron) in self.network.neurons.iter_mut() {
            if neuron.step(tick, stress, params, &mut self.rng) {
                fired.push(id);
            }
        }
        report.spikes = fired.len();

        let Network { neurons, synapses, .. } = &self.network;
        for id in fired {
            let Some(neuron) = neurons.get(id) else { continue };
            for synapse_id in &neuron.synapses_out {
                match synapses.get(*synapse_id) {
                    Some(synapse) => self.scheduler.schedule(
                        ScheduledSpike {
                            target: synapse.post,
                            weight: synapse.weight,
                        },
                        tick + u64::from(synapse.delay),
                    ),
                    None => {
                        log::trace!("tick {}: {} lists missing synapse {}", tick, id, synapse_id);
                        report.dangling += 1;
                    }
                }
            }
        }
    }

    fn deliver(&mut self, tick: u64, report: &mut TickReport) {
        for spike in self.scheduler.drain(tick) {
            match self.network.neuron_mut(spike.target) {
                Some(neuron) if neuron.is_refractory() => report.blocked_refractory += 1,
                Some(neuron) => {
                    neuron.receive(spike.weight);
                    report.delivered += 1;
                }
                None => {
                    log::trace!("tick {}: spike for missing neuron {}", tick, spike.target);
                    report.dangling += 1;
                }
            }
        }
    }

    /// Add the poke boost to every neuron within the poke radius of `(x, y)`
    ///
    /// Applied immediately, so it lands before the next tick. Returns the
    /// number of neurons boosted.
    pub fn stimulate(&mut self, x: f32, y: f32) -> Result<usize> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(RuntimeError::invalid_input(format!(
                "poke coordinates must be finite, got ({}, {})",
                x, y
            )));
        }
        let point = Position::new(x, y);
        let params = &self.config.stimulus;
        let mut boosted = 0;
        for (_, neuron) in self.network.neurons.iter_mut() {
            if neuron.position.distance(&point) < params.poke_radius {
                neuron.receive(params.poke_boost);
                boosted += 1;
            }
        }
        log::debug!("Poke at ({:.1}, {:.1}) boosted {} neurons", x, y, boosted);
        Ok(boosted)
    }

    /// Raise thresholds and max out fatigue for every neuron in a region
    ///
    /// The raised threshold holds until the neuron's next integrating tick
    /// recomputes it from stress. Returns the number of neurons affected.
    pub fn damage(&mut self, role: RegionRole) -> Result<usize> {
        let factor = self.config.stimulus.damage_threshold_factor;
        let Network { neurons, regions, .. } = &mut self.network;
        let region = regions
            .values()
            .find(|region| region.role == role)
            .ok_or_else(|| RuntimeError::region_not_found(role.name()))?;

        let mut affected = 0;
        for id in &region.neurons {
            if let Some(neuron) = neurons.get_mut(*id) {
                neuron.threshold *= factor;
                neuron.fatigue = 1.0;
                affected += 1;
            }
        }
        log::debug!("Damaged region {}: {} neurons", region.name, affected);
        Ok(affected)
    }

    /// [`damage`](Self::damage) by region name
    pub fn damage_named(&mut self, name: &str) -> Result<usize> {
        self.damage(name.parse()?)
    }

    /// Damage a region picked at random; returns its role
    pub fn damage_random(&mut self) -> Result<RegionRole> {
        let roles: Vec<RegionRole> = self.network.regions().map(|region| region.role).collect();
        let role = *roles
            .choose(&mut self.rng)
            .ok_or_else(|| RuntimeError::invalid_config("network has no regions"))?;
        self.damage(role)?;
        Ok(role)
    }

    /// State after the most recent tick
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            time: self.time,
            neurons: self.network.neurons().cloned().collect(),
            regions: self.network.regions().cloned().collect(),
            thoughts: self.cognition.thoughts().cloned().collect(),
            emotions: self.cognition.emotions().iter().collect(),
            consciousness: self.cognition.consciousness(),
            attention: self.cognition.attention(),
        }
    }

    /// Logical time of the last tick; 0 before the first
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Get reference to network
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Get the configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Cognition state
    pub fn cognition(&self) -> &CognitionModule {
        &self.cognition
    }

    /// Counters from the most recent tick
    pub fn last_report(&self) -> TickReport {
        self.last_report
    }

    /// Spikes still in flight
    pub fn pending_spikes(&self) -> usize {
        self.scheduler.len()
    }

    #[cfg(test)]
    pub(crate) fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    #[cfg(test)]
    pub(crate) fn cognition_mut(&mut self) -> &mut CognitionModule {
        &mut self.cognition
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn sanitize_stimulus(stimulus: f32) -> f32 {
    if stimulus.is_finite() && stimulus >= 0.0 {
        stimulus
    } else {
        log::warn!("Stimulus level {} rejected, using 0", stimulus);
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CognitionParams, NeuronParams},
        network::{NetworkBuilder, NeuronSpec},
        neuron::NeuronKind,
    };

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(7),
            neuron: NeuronParams {
                noise_scale: 0.0,
                ..NeuronParams::default()
            },
            cognition: CognitionParams {
                thought_gate_probability: 0.0,
                ..CognitionParams::default()
            },
            ..SimulationConfig::default()
        }
    }

    fn small_engine(seed: u64) -> SimulationEngine {
        let mut config = SimulationConfig::default().with_seed(seed).with_neuron_count(140);
        config.network.synapse_density = 0.1;
        SimulationEngine::new(config).unwrap()
    }

    #[test]
    fn test_single_neuron_spikes() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Association)
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory).with_potential(1.0))
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();

        let snap = engine.tick(0.0, false);
        let neuron = &snap.neurons[0];
        assert_eq!(snap.time, 1);
        assert!(neuron.is_spiking);
        assert_eq!(neuron.potential, 0.0);
        assert_eq!(neuron.refractory, 5);
        assert_eq!(neuron.last_spike, Some(1));
        assert_eq!(engine.last_report().spikes, 1);

        let snap = engine.tick(0.0, false);
        assert!(!snap.neurons[0].is_spiking);
        assert_eq!(snap.neurons[0].refractory, 4);
    }

    #[test]
    fn test_spike_arrives_after_delay() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Association)
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory).with_potential(1.0))
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory))
            .add_synapse(0, 1, 0.3, 1)
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();

        let snap = engine.tick(0.0, false);
        assert!(snap.neurons[0].is_spiking);
        assert_eq!(snap.neurons[1].potential, 0.0);
        assert_eq!(engine.pending_spikes(), 1);

        let snap = engine.tick(0.0, false);
        assert!((snap.neurons[1].potential - 0.3).abs() < 1e-6);
        assert_eq!(engine.last_report().delivered, 1);
        assert_eq!(engine.pending_spikes(), 0);
    }

    #[test]
    fn test_longer_delay_waits() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Association)
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory).with_potential(1.0))
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory))
            .add_synapse(0, 1, 0.3, 3)
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();

        for _ in 0..3 {
            let snap = engine.tick(0.0, false);
            assert_eq!(snap.neurons[1].potential, 0.0);
        }
        let snap = engine.tick(0.0, false);
        assert!((snap.neurons[1].potential - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_refractory_target_ignores_spike() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Association)
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory).with_potential(1.0))
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory).with_potential(1.0))
            .add_synapse(0, 1, 0.3, 1)
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();

        engine.tick(0.0, false);
        let snap = engine.tick(0.0, false);
        assert_eq!(engine.last_report().blocked_refractory, 1);
        assert_eq!(snap.neurons[1].potential, 0.0);
    }

    #[test]
    fn test_co_spiking_pair_strengthens() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Association)
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory).with_potential(1.0))
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory).with_potential(1.0))
            .add_synapse(0, 1, 0.3, 1)
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();

        engine.tick(0.0, false);
        assert_eq!(engine.last_report().potentiated, 1);
        let weight = engine.network().synapses().next().unwrap().weight;
        assert!(weight > 0.3);
    }

    #[test]
    fn test_partition_holds_every_tick() {
        let mut engine = small_engine(21);
        for _ in 0..20 {
            let snap = engine.tick(500.0, false);
            let members: usize = snap.regions.iter().map(|r| r.neurons.len()).sum();
            assert_eq!(members, snap.neurons.len());
            for neuron in &snap.neurons {
                let owners = snap.regions.iter().filter(|r| r.neurons.contains(&neuron.id)).count();
                assert_eq!(owners, 1);
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = small_engine(99);
        let mut b = small_engine(99);
        for _ in 0..30 {
            assert_eq!(a.tick(300.0, false), b.tick(300.0, false));
        }
        assert_eq!(a.tick(0.0, true), b.tick(0.0, true));
    }

    #[test]
    fn test_invalid_stimulus_treated_as_zero() {
        let mut a = small_engine(5);
        let mut b = small_engine(5);
        let snap_a = a.tick(-10.0, false);
        let snap_b = b.tick(0.0, false);
        assert_eq!(snap_a, snap_b);

        let snap = a.tick(f32::NAN, false);
        assert!(snap.neurons.iter().all(|n| n.potential.is_finite()));
    }

    #[test]
    fn test_full_stimulus_boosts_every_sensory_neuron() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Sensory)
            .add_region_role(RegionRole::Memory)
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory))
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory))
            .add_neuron(NeuronSpec::new(RegionRole::Memory, NeuronKind::Excitatory))
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();

        // Probability 1: boost in [0.5, 1.0] is below 0.6 or spikes
        let snap = engine.tick(5000.0, false);
        for neuron in &snap.neurons[..2] {
            assert!(neuron.is_spiking || neuron.potential >= 0.5 * 0.98 - 1e-6);
        }
        assert_eq!(snap.neurons[2].potential, 0.0);
    }

    #[test]
    fn test_sleep_skips_sensory_input() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Sensory)
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory))
            .build()
            .unwrap();
        let mut config = quiet_config();
        config.stimulus.replay_probability = 0.0;
        let mut engine = SimulationEngine::from_network(network, config).unwrap();

        let snap = engine.tick(5000.0, true);
        assert_eq!(snap.neurons[0].potential, 0.0);
    }

    #[test]
    fn test_replay_boosts_one_neuron() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Memory)
            .add_neuron(NeuronSpec::new(RegionRole::Memory, NeuronKind::Excitatory))
            .add_neuron(NeuronSpec::new(RegionRole::Memory, NeuronKind::Excitatory))
            .build()
            .unwrap();
        let mut config = quiet_config();
        config.stimulus.replay_probability = 1.0;
        let mut engine = SimulationEngine::from_network(network, config).unwrap();

        // 0.8 > 0.6, so the replayed neuron fires
        let snap = engine.tick(0.0, true);
        assert_eq!(snap.spiking_count(), 1);
    }

    #[test]
    fn test_poke_boosts_nearby_neurons() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Sensory)
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory).at(100.0, 100.0))
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory).at(110.0, 100.0))
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory).at(300.0, 300.0))
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();

        assert_eq!(engine.stimulate(105.0, 100.0).unwrap(), 2);
        let snap = engine.snapshot();
        assert_eq!(snap.neurons[0].potential, 1.0);
        assert_eq!(snap.neurons[2].potential, 0.0);

        assert!(matches!(
            engine.stimulate(f32::NAN, 0.0),
            Err(RuntimeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_damage_region() {
        let mut engine = small_engine(3);
        let affected = engine.damage(RegionRole::Memory).unwrap();
        assert_eq!(affected, 20);

        let memory = engine.network().region_by_role(RegionRole::Memory).unwrap().id;
        for neuron in engine.network().neurons().filter(|n| n.region == memory) {
            assert_eq!(neuron.fatigue, 1.0);
            assert!(neuron.threshold >= 0.5 * 1.5 - 1e-6);
        }

        assert_eq!(engine.damage_named("executive").unwrap(), 20);
        assert!(matches!(
            engine.damage_named("cerebellum"),
            Err(RuntimeError::RegionNotFound { .. })
        ));
        let role = engine.damage_random().unwrap();
        assert!(RegionRole::ALL.contains(&role));
    }

    #[test]
    fn test_damage_missing_region() {
        let network = NetworkBuilder::new()
            .add_region_role(RegionRole::Sensory)
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory))
            .build()
            .unwrap();
        let mut engine = SimulationEngine::from_network(network, quiet_config()).unwrap();
        assert!(matches!(
            engine.damage(RegionRole::Memory),
            Err(RuntimeError::RegionNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_neuron_does_not_stop_tick() {
        let mut engine = small_engine(12);
        let victim = engine.network().neuron_ids()[3];
        engine.network_mut().detach_neuron(victim);

        for _ in 0..20 {
            engine.tick(800.0, false);
        }
        assert!(engine.last_report().dangling > 0);
        assert_eq!(engine.time(), 20);
    }

    #[test]
    fn test_attention_tracks_live_thought() {
        let mut engine = small_engine(8);
        let id = engine.cognition_mut().spawn(0, "seeded".to_string(), 0.9);
        let snap = engine.tick(0.0, false);
        assert_eq!(snap.attention.focus, Some(id));
        assert_eq!(snap.focus_text(), Some("seeded"));
    }

    #[test]
    fn test_run_advances_time() {
        let mut engine = small_engine(4);
        let snap = engine.run(15, 200.0, false);
        assert_eq!(snap.time, 15);
        assert_eq!(engine.time(), 15);
        assert_eq!(engine.run(0, 200.0, false).time, 15);
    }

    #[test]
    fn test_empty_network_rejected() {
        assert!(SimulationEngine::from_network(Network::default(), quiet_config()).is_err());
        assert!(SimulationEngine::new(SimulationConfig::default().with_neuron_count(0)).is_err());
    }

    #[test]
    fn test_infinite_sensory_boost_rejected() {
        let mut config = SimulationConfig::default().with_seed(1).with_neuron_count(70);
        config.stimulus.sensory_boost_min = f32::INFINITY;
        config.stimulus.sensory_boost_max = f32::INFINITY;
        assert!(SimulationEngine::new(config).is_err());
    }
}
