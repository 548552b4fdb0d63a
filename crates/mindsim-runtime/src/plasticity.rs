//! Plasticity rules for synaptic learning

use crate::{config::PlasticityParams, error::*, network::Network};

/// Outcome of a weight update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightChange {
    /// Both endpoints fired together
    Potentiated,
    /// The source has been quiet too long
    Decayed,
    /// Nothing applied
    Unchanged,
}

/// Trait for plasticity rules
pub trait PlasticityRule {
    /// Decide how a synapse changes given its endpoints' last spike ticks
    fn classify(&self, pre_last_spike: Option<u64>, post_last_spike: Option<u64>, tick: u64) -> WeightChange;

    /// Magnitude multiplier for a change
    fn factor(&self, change: WeightChange) -> f32;

    /// Largest weight magnitude the rule allows
    fn max_weight(&self) -> f32;
}

/// Co-activity rule: strengthen on same-tick spikes, fade when unused
#[derive(Debug, Clone)]
pub struct HebbianRule {
    /// Rule parameters
    pub params: PlasticityParams,
}

impl HebbianRule {
    /// Create a new Hebbian rule
    pub fn new(params: PlasticityParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl Default for HebbianRule {
    fn default() -> Self {
        Self {
            params: PlasticityParams::default(),
        }
    }
}

impl PlasticityRule for HebbianRule {
    fn classify(&self, pre_last_spike: Option<u64>, post_last_spike: Option<u64>, tick: u64) -> WeightChange {
        if pre_last_spike == Some(tick) && post_last_spike == Some(tick) {
            return WeightChange::Potentiated;
        }
        // A source that never fired counts as idle forever
        let idle = match pre_last_spike {
            Some(last) => tick.saturating_sub(last) > self.params.idle_window,
            None => true,
        };
        if idle {
            WeightChange::Decayed
        } else {
            WeightChange::Unchanged
        }
    }

    fn factor(&self, change: WeightChange) -> f32 {
        match change {
            WeightChange::Potentiated => self.params.potentiation_factor,
            WeightChange::Decayed => self.params.decay_factor,
            WeightChange::Unchanged => 1.0,
        }
    }

    fn max_weight(&self) -> f32 {
        self.params.max_weight
    }
}

/// Counts from one plasticity pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlasticityStats {
    /// Synapses strengthened
    pub potentiated: usize,
    /// Synapses weakened
    pub decayed: usize,
    /// Synapses skipped because an endpoint is missing
    pub skipped: usize,
}

/// Applies a rule to every synapse once per tick
#[derive(Debug, Clone, Default)]
pub struct PlasticityModule<R = HebbianRule> {
    rule: R,
}

impl<R: PlasticityRule> PlasticityModule<R> {
    /// Wrap a rule
    pub fn new(rule: R) -> Self {
        Self { rule }
    }

    /// The wrapped rule
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Update every synapse from the spike ticks recorded on `tick`
    pub fn apply(&self, network: &mut Network, tick: u64) -> PlasticityStats {
        let mut stats = PlasticityStats::default();
        let neurons = &network.neurons;

        for (id, synapse) in network.synapses.iter_mut() {
            let (Some(pre), Some(post)) = (neurons.get(synapse.pre), neurons.get(synapse.post)) else {
                log::trace!("plasticity: synapse {} has a missing endpoint, skipped", id);
                stats.skipped += 1;
                continue;
            };

            if pre.spiked_at(tick) {
                synapse.last_pre_spike = Some(tick);
            }
            if post.spiked_at(tick) {
                synapse.last_post_spike = Some(tick);
            }

            let change = self.rule.classify(pre.last_spike, post.last_spike, tick);
            match change {
                WeightChange::Potentiated => stats.potentiated += 1,
                WeightChange::Decayed => stats.decayed += 1,
                WeightChange::Unchanged => continue,
            }
            synapse.scale_weight(self.rule.factor(change), self.rule.max_weight());
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        network::{NetworkBuilder, NeuronSpec},
        neuron::NeuronKind,
        region::RegionRole,
    };

    fn pair(kind: NeuronKind, weight: f32) -> Network {
        NetworkBuilder::new()
            .add_region_role(RegionRole::Association)
            .add_neuron(NeuronSpec::new(RegionRole::Association, kind))
            .add_neuron(NeuronSpec::new(RegionRole::Association, NeuronKind::Excitatory))
            .add_synapse(0, 1, weight, 1)
            .build()
            .unwrap()
    }

    fn mark_spike(network: &mut Network, index: usize, tick: u64) {
        let id = network.neuron_ids()[index];
        network.neuron_mut(id).unwrap().last_spike = Some(tick);
    }

    fn only_weight(network: &Network) -> f32 {
        network.synapses().next().unwrap().weight
    }

    #[test]
    fn test_hebbian_params_validation() {
        let mut params = PlasticityParams::default();
        assert!(HebbianRule::new(params.clone()).is_ok());
        params.potentiation_factor = -1.0;
        assert!(HebbianRule::new(params).is_err());
    }

    #[test]
    fn test_classification() {
        let rule = HebbianRule::default();
        assert_eq!(rule.classify(Some(10), Some(10), 10), WeightChange::Potentiated);
        assert_eq!(rule.classify(Some(10), Some(9), 10), WeightChange::Unchanged);
        assert_eq!(rule.classify(Some(10), Some(10), 110), WeightChange::Unchanged);
        assert_eq!(rule.classify(Some(10), Some(10), 111), WeightChange::Decayed);
        assert_eq!(rule.classify(None, Some(5), 5), WeightChange::Decayed);
    }

    #[test]
    fn test_co_spike_strengthens() {
        let mut network = pair(NeuronKind::Excitatory, 0.4);
        mark_spike(&mut network, 0, 7);
        mark_spike(&mut network, 1, 7);

        let stats = PlasticityModule::new(HebbianRule::default()).apply(&mut network, 7);
        assert_eq!(stats.potentiated, 1);
        assert!(only_weight(&network) > 0.4);
        assert!((only_weight(&network) - 0.404).abs() < 1e-6);

        let synapse = network.synapses().next().unwrap();
        assert_eq!(synapse.last_pre_spike, Some(7));
        assert_eq!(synapse.last_post_spike, Some(7));
    }

    #[test]
    fn test_strengthening_is_bounded() {
        let mut network = pair(NeuronKind::Excitatory, 0.999);
        let module = PlasticityModule::new(HebbianRule::default());
        for tick in 1..50 {
            mark_spike(&mut network, 0, tick);
            mark_spike(&mut network, 1, tick);
            module.apply(&mut network, tick);
            assert!(only_weight(&network) <= 1.0);
        }
        assert_eq!(only_weight(&network), 1.0);
    }

    #[test]
    fn test_inhibitory_sign_preserved() {
        let mut network = pair(NeuronKind::Inhibitory, 0.4);
        mark_spike(&mut network, 0, 3);
        mark_spike(&mut network, 1, 3);
        PlasticityModule::new(HebbianRule::default()).apply(&mut network, 3);
        assert!((only_weight(&network) + 0.404).abs() < 1e-6);
    }

    #[test]
    fn test_idle_source_weakens() {
        let mut network = pair(NeuronKind::Excitatory, 0.4);
        mark_spike(&mut network, 0, 1);
        let module = PlasticityModule::new(HebbianRule::default());

        let stats = module.apply(&mut network, 101);
        assert_eq!(stats.decayed, 0);
        assert_eq!(only_weight(&network), 0.4);

        let stats = module.apply(&mut network, 102);
        assert_eq!(stats.decayed, 1);
        assert!(only_weight(&network) < 0.4);
    }

    #[test]
    fn test_never_spiked_source_decays_from_first_tick() {
        let mut network = pair(NeuronKind::Excitatory, 0.4);
        let module = PlasticityModule::new(HebbianRule::default());
        let factor = PlasticityParams::default().decay_factor;

        for tick in 1..=3 {
            let stats = module.apply(&mut network, tick);
            assert_eq!(stats.decayed, 1);
        }
        assert!((only_weight(&network) - 0.4 * factor.powi(3)).abs() < 1e-6);
    }

    #[test]
    fn test_missing_endpoint_skipped() {
        let mut network = pair(NeuronKind::Excitatory, 0.4);
        let ids = network.neuron_ids();
        network.detach_neuron(ids[1]);

        let stats = PlasticityModule::new(HebbianRule::default()).apply(&mut network, 200);
        assert_eq!(stats.skipped, 1);
        assert_eq!(only_weight(&network), 0.4);
    }
}
