//! Generated networks: region layout, neuron placement and wiring
//!
//! Wiring considers ordered neuron pairs, draws a synapse with probability
//! `synapse_density`, and keeps it only when the pair passes the
//! [`LocalityRule`]. Which pairs are considered is decided by a
//! [`CandidatePairs`] strategy; [`AllPairs`] visits every ordered pair,
//! which is quadratic but fine for a couple of thousand neurons. A spatial
//! index can replace it without touching the rest of the builder.

use rand::Rng;

use crate::{
    ids::{NeuronId, RegionId},
    config::{NetworkConfig, NeuronParams},
    error::*,
    network::Network,
    neuron::{NeuronKind, Position},
};

/// What wiring needs to know about one neuron
#[derive(Debug, Clone, Copy)]
pub struct Site {
    /// Neuron id
    pub id: NeuronId,
    /// Neuron position
    pub position: Position,
    /// Owning region
    pub region: RegionId,
    /// Radius of the owning region
    pub region_radius: f32,
}

/// Strategy enumerating candidate (pre, post) pairs as indices into `sites`
pub trait CandidatePairs {
    /// Call `visit(pre, post)` for every candidate, `pre != post`
    fn for_each_pair(&self, sites: &[Site], visit: &mut dyn FnMut(usize, usize));
}

/// Every ordered pair of distinct neurons
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl CandidatePairs for AllPairs {
    fn for_each_pair(&self, sites: &[Site], visit: &mut dyn FnMut(usize, usize)) {
        for pre in 0..sites.len() {
            for post in 0..sites.len() {
                if pre != post {
                    visit(pre, post);
                }
            }
        }
    }
}

/// Keeps a pair when both ends share a region or lie within two radii of
/// the source region
#[derive(Debug, Clone, Copy)]
pub struct LocalityRule {
    /// Reach as a multiple of the source region's radius
    pub radius_factor: f32,
}

impl Default for LocalityRule {
    fn default() -> Self {
        Self { radius_factor: 2.0 }
    }
}

impl LocalityRule {
    /// Whether `pre -> post` may be wired
    pub fn permits(&self, pre: &Site, post: &Site) -> bool {
        pre.region == post.region
            || pre.position.distance(&post.position) < pre.region_radius * self.radius_factor
    }
}

/// Build a network from configuration, visiting all pairs
pub fn generate<R: Rng>(
    config: &NetworkConfig,
    neuron_params: &NeuronParams,
    rng: &mut R,
) -> Result<Network> {
    generate_with(config, neuron_params, &AllPairs, rng)
}

/// Build a network from configuration with an explicit pair strategy
pub fn generate_with<R: Rng, P: CandidatePairs + ?Sized>(
    config: &NetworkConfig,
    neuron_params: &NeuronParams,
    pairs: &P,
    rng: &mut R,
) -> Result<Network> {
    config.validate()?;
    neuron_params.validate()?;

    let mut network = Network::default();
    let quota = config.region_quota();
    let mut sites = Vec::with_capacity(quota * config.regions.len());

    for spec in &config.regions {
        let region = network.add_region(spec, config.canvas_width, config.canvas_height);
        let (cx, cy) = (spec.center_x * config.canvas_width, spec.center_y * config.canvas_height);

        for _ in 0..quota {
            let angle = rng.gen::<f32>() * 2.0 * core::f32::consts::PI;
            let r = rng.gen::<f32>() * spec.radius;
            let position = Position::new(cx + r * angle.cos(), cy + r * angle.sin());
            let kind = if rng.gen::<f32>() < config.excitatory_fraction {
                NeuronKind::Excitatory
            } else {
                NeuronKind::Inhibitory
            };
            let spread = neuron_params.initial_potential_spread;
            let potential = rng.gen_range(-spread..=spread);
            let threshold =
                rng.gen_range(neuron_params.initial_threshold_min..=neuron_params.initial_threshold_max);

            let id = network
                .add_neuron(region, position, kind, potential, threshold)
                .ok_or_else(|| RuntimeError::region_not_found(spec.role.name()))?;
            sites.push(Site {
                id,
                position,
                region,
                region_radius: spec.radius,
            });
        }
    }

    let locality = LocalityRule::default();
    pairs.for_each_pair(&sites, &mut |pre, post| {
        if rng.gen::<f64>() >= config.synapse_density {
            return;
        }
        let (pre, post) = (&sites[pre], &sites[post]);
        if !locality.permits(pre, post) {
            return;
        }
        let weight = rng.gen_range(config.weight_min..=config.weight_max);
        let delay = config.base_delay + rng.gen_range(0..=config.delay_jitter);
        network.connect(pre.id, post.id, weight, delay);
    });

    log::info!(
        "Generated network: {} neurons, {} synapses across {} regions",
        network.neuron_count(),
        network.synapse_count(),
        network.region_count()
    );

    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionSpec;
    use crate::region::RegionRole;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_config(neurons: usize) -> NetworkConfig {
        NetworkConfig {
            neuron_count: neurons,
            synapse_density: 0.2,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn test_region_quota_and_partition() {
        let config = small_config(100);
        let mut rng = StdRng::seed_from_u64(3);
        let network = generate(&config, &NeuronParams::default(), &mut rng).unwrap();

        // floor(100 / 7) = 14 per region
        assert_eq!(network.neuron_count(), 98);
        for region in network.regions() {
            assert_eq!(region.size(), 14);
        }
        let members: usize = network.regions().map(|r| r.size()).sum();
        assert_eq!(members, network.neuron_count());
    }

    #[test]
    fn test_neurons_inside_region_disk() {
        let config = small_config(140);
        let mut rng = StdRng::seed_from_u64(11);
        let network = generate(&config, &NeuronParams::default(), &mut rng).unwrap();

        for neuron in network.neurons() {
            let region = network.region(neuron.region).unwrap();
            let centre = Position::new(region.center_x, region.center_y);
            assert!(neuron.position.distance(&centre) <= region.radius + 1e-3);
        }
    }

    #[test]
    fn test_synapse_invariants() {
        let config = small_config(140);
        let mut rng = StdRng::seed_from_u64(5);
        let network = generate(&config, &NeuronParams::default(), &mut rng).unwrap();
        assert!(network.synapse_count() > 0);

        let locality = LocalityRule::default();
        for synapse in network.synapses() {
            let pre = network.neuron(synapse.pre).unwrap();
            let post = network.neuron(synapse.post).unwrap();
            assert_ne!(synapse.pre, synapse.post);
            assert!(synapse.weight.abs() >= 0.1 && synapse.weight.abs() <= 0.5);
            assert_eq!(synapse.is_inhibitory(), pre.kind == NeuronKind::Inhibitory);
            assert!((1..=3).contains(&synapse.delay));

            let radius = network.region(pre.region).unwrap().radius;
            let site = |n: &crate::neuron::Neuron, radius: f32| Site {
                id: n.id,
                position: n.position,
                region: n.region,
                region_radius: radius,
            };
            assert!(locality.permits(&site(pre, radius), &site(post, 0.0)));
        }
    }

    #[test]
    fn test_zero_density_has_no_synapses() {
        let mut config = small_config(70);
        config.synapse_density = 0.0;
        let mut rng = StdRng::seed_from_u64(1);
        let network = generate(&config, &NeuronParams::default(), &mut rng).unwrap();
        assert_eq!(network.synapse_count(), 0);
    }

    #[test]
    fn test_same_seed_same_network() {
        let config = small_config(70);
        let a = generate(&config, &NeuronParams::default(), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate(&config, &NeuronParams::default(), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.synapse_count(), b.synapse_count());
        let wa: Vec<f32> = a.synapses().map(|s| s.weight).collect();
        let wb: Vec<f32> = b.synapses().map(|s| s.weight).collect();
        assert_eq!(wa, wb);
    }

    #[test]
    fn test_far_regions_only_wire_internally() {
        let config = NetworkConfig {
            neuron_count: 20,
            synapse_density: 1.0,
            canvas_width: 10_000.0,
            canvas_height: 10_000.0,
            regions: vec![
                RegionSpec::new(RegionRole::Sensory, "Sensory", 0.1, 0.1, 10.0),
                RegionSpec::new(RegionRole::Association, "Association", 0.9, 0.9, 10.0),
            ],
            ..NetworkConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let network = generate(&config, &NeuronParams::default(), &mut rng).unwrap();

        // 2 regions x 10 neurons, fully wired inside each region only
        assert_eq!(network.synapse_count(), 2 * 10 * 9);
        for synapse in network.synapses() {
            let pre = network.neuron(synapse.pre).unwrap();
            let post = network.neuron(synapse.post).unwrap();
            assert_eq!(pre.region, post.region);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = small_config(0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate(&config, &NeuronParams::default(), &mut rng).is_err());
    }
}
