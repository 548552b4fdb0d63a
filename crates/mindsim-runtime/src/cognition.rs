//! Region activity, emotions, consciousness, attention and thoughts
//!
//! Everything here is derived from neuron potentials once per tick, after
//! spikes are delivered and plasticity has run.

use core::fmt;

use rand::Rng;
use slotmap::SlotMap;

use crate::{
    ids::ThoughtId,
    config::CognitionParams,
    error::*,
    network::Network,
    region::{RegionActivities, RegionRole},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const OPENERS: [&str; 5] = ["What if...", "I wonder...", "I remember...", "I should...", "Why..."];
const CONTINUATIONS: [&str; 5] = [
    "this works",
    "I did it that way",
    "they said so",
    "nothing is happening",
    "everything is connected",
];

/// Emotions tracked by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EmotionKind {
    /// Fear (static)
    Fear,
    /// Joy
    Joy,
    /// Stress
    Stress,
    /// Interest (static)
    Interest,
    /// Apathy (static)
    Apathy,
}

impl EmotionKind {
    /// Number of emotions
    pub const COUNT: usize = 5;

    /// All emotions in registry order
    pub const ALL: [EmotionKind; Self::COUNT] = [
        EmotionKind::Fear,
        EmotionKind::Joy,
        EmotionKind::Stress,
        EmotionKind::Interest,
        EmotionKind::Apathy,
    ];

    /// Lowercase name
    pub const fn name(&self) -> &'static str {
        match self {
            EmotionKind::Fear => "fear",
            EmotionKind::Joy => "joy",
            EmotionKind::Stress => "stress",
            EmotionKind::Interest => "interest",
            EmotionKind::Apathy => "apathy",
        }
    }
}

impl fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One emotion and its level
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Emotion {
    /// Which emotion
    pub kind: EmotionKind,
    /// Level in `[0, 1]`
    pub level: f32,
}

/// Fixed registry of emotion levels
#[derive(Debug, Clone, PartialEq)]
pub struct Emotions {
    levels: [f32; EmotionKind::COUNT],
}

impl Emotions {
    /// Registry seeded from the configured initial levels
    pub fn from_params(params: &CognitionParams) -> Self {
        Self {
            levels: [
                params.initial_fear,
                params.initial_joy,
                params.initial_stress,
                params.initial_interest,
                params.initial_apathy,
            ],
        }
    }

    /// Level of one emotion
    pub fn level(&self, kind: EmotionKind) -> f32 {
        self.levels[kind as usize]
    }

    fn nudge(&mut self, kind: EmotionKind, delta: f32) {
        let level = &mut self.levels[kind as usize];
        *level = (*level + delta).clamp(0.0, 1.0);
    }

    /// Emotions in registry order
    pub fn iter(&self) -> impl Iterator<Item = Emotion> + '_ {
        EmotionKind::ALL.into_iter().map(|kind| Emotion {
            kind,
            level: self.level(kind),
        })
    }

    /// Strongest emotion; `None` when every level is zero
    pub fn dominant(&self) -> Option<EmotionKind> {
        dominant_of(self.iter())
    }
}

pub(crate) fn dominant_of(emotions: impl Iterator<Item = Emotion>) -> Option<EmotionKind> {
    let mut best: Option<Emotion> = None;
    for emotion in emotions {
        if emotion.level > best.map_or(0.0, |b| b.level) {
            best = Some(emotion);
        }
    }
    best.map(|emotion| emotion.kind)
}

/// A transient record produced by sustained association activity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Thought {
    /// Thought id
    pub id: ThoughtId,
    /// Tick on which the thought formed
    pub created_at: u64,
    /// Generated text
    pub text: String,
    /// Strength; decays every tick
    pub strength: f32,
    /// Ticks since creation
    pub age: u64,
}

impl Thought {
    /// Display label derived from the creation tick
    pub fn label(&self) -> String {
        format!("thought_{}", self.created_at)
    }
}

/// Where attention currently rests
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attention {
    /// Strongest live thought
    pub focus: Option<ThoughtId>,
    /// Strength of the focus, or the idle level
    pub level: f32,
}

/// Global clarity signal
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Consciousness {
    /// Mean of executive and association activity, discounted by stress
    pub clarity: f32,
}

/// Thoughts formed and forgotten in one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CognitionStats {
    /// Thoughts created
    pub created: usize,
    /// Thoughts removed
    pub removed: usize,
}

/// Recompute every region's activity from its members' potentials
///
/// Members that no longer resolve are skipped; the second value counts them.
/// An empty region reads as zero.
pub fn refresh_region_activity(network: &mut Network) -> (RegionActivities, usize) {
    let mut activities = RegionActivities::new();
    let mut dangling = 0;
    let neurons = &network.neurons;

    for (id, region) in network.regions.iter_mut() {
        let mut sum = 0.0;
        let mut count = 0usize;
        for member in &region.neurons {
            match neurons.get(*member) {
                Some(neuron) => {
                    sum += neuron.potential;
                    count += 1;
                }
                None => {
                    log::trace!("cognition: region {} lists missing neuron {}", id, member);
                    dangling += 1;
                }
            }
        }
        region.activity = if count == 0 { 0.0 } else { sum / count as f32 };
        activities.set(region.role, region.activity);
    }

    (activities, dangling)
}

/// Owner of emotions, thoughts, attention and consciousness
#[derive(Debug, Clone)]
pub struct CognitionModule {
    params: CognitionParams,
    emotions: Emotions,
    thoughts: SlotMap<ThoughtId, Thought>,
    attention: Attention,
    consciousness: Consciousness,
}

impl CognitionModule {
    /// Create the module in its initial state
    pub fn new(params: CognitionParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            emotions: Emotions::from_params(&params),
            thoughts: SlotMap::with_key(),
            attention: Attention {
                focus: None,
                level: params.idle_attention,
            },
            consciousness: Consciousness {
                clarity: params.initial_clarity,
            },
            params,
        })
    }

    /// Parameters in use
    pub fn params(&self) -> &CognitionParams {
        &self.params
    }

    /// Emotion registry
    pub fn emotions(&self) -> &Emotions {
        &self.emotions
    }

    /// Live thoughts in slot order
    pub fn thoughts(&self) -> impl Iterator<Item = &Thought> + '_ {
        self.thoughts.values()
    }

    /// Number of live thoughts
    pub fn thought_count(&self) -> usize {
        self.thoughts.len()
    }

    /// Look up a live thought
    pub fn thought(&self, id: ThoughtId) -> Option<&Thought> {
        self.thoughts.get(id)
    }

    /// Current attention
    pub fn attention(&self) -> Attention {
        self.attention
    }

    /// Current consciousness
    pub fn consciousness(&self) -> Consciousness {
        self.consciousness
    }

    /// Run one cognition step from this tick's region activity
    ///
    /// Order: emotions, clarity (with the updated stress), attention over
    /// the thoughts alive before this step, then thought formation, aging
    /// and removal. A thought formed on tick `T` can be attended from `T + 1`,
    /// and the attended thought may be forgotten in the same step, leaving
    /// `focus` pointing at a handle that no longer resolves until the next
    /// update.
    pub fn update<R: Rng>(&mut self, activities: &RegionActivities, tick: u64, rng: &mut R) -> CognitionStats {
        self.update_emotions(activities);

        let stress = self.emotions.level(EmotionKind::Stress);
        let focus_mix = (activities.get(RegionRole::Executive) + activities.get(RegionRole::Association)) / 2.0;
        self.consciousness.clarity = focus_mix * (1.0 - stress);

        self.update_attention();
        self.update_thoughts(activities.get(RegionRole::Association), tick, rng)
    }

    fn update_emotions(&mut self, activities: &RegionActivities) {
        let p = &self.params;
        if activities.get(RegionRole::Emotion) > p.arousal_threshold {
            if activities.get(RegionRole::Sensory) > p.sensory_joy_threshold {
                self.emotions.nudge(EmotionKind::Joy, p.joy_step);
            } else {
                self.emotions.nudge(EmotionKind::Stress, p.stress_step);
            }
        } else {
            self.emotions.nudge(EmotionKind::Stress, -p.stress_recovery);
            self.emotions.nudge(EmotionKind::Joy, -p.joy_recovery);
        }
    }

    fn update_thoughts<R: Rng>(&mut self, association: f32, tick: u64, rng: &mut R) -> CognitionStats {
        let mut stats = CognitionStats::default();

        if association > self.params.thought_threshold && rng.gen_bool(self.params.thought_gate_probability) {
            let text = format!(
                "{} {}",
                OPENERS[rng.gen_range(0..OPENERS.len())],
                CONTINUATIONS[rng.gen_range(0..CONTINUATIONS.len())]
            );
            self.spawn(tick, text, association);
            stats.created = 1;
        }

        let (decay, floor) = (self.params.thought_decay, self.params.thought_floor);
        let before = self.thoughts.len();
        self.thoughts.retain(|_, thought| {
            thought.age += 1;
            thought.strength *= decay;
            thought.strength >= floor
        });
        stats.removed = before - self.thoughts.len();

        stats
    }

    fn update_attention(&mut self) {
        let mut strongest: Option<&Thought> = None;
        for thought in self.thoughts.values() {
            if strongest.map_or(true, |best| thought.strength > best.strength) {
                strongest = Some(thought);
            }
        }
        self.attention = match strongest {
            Some(thought) => Attention {
                focus: Some(thought.id),
                level: thought.strength,
            },
            None => Attention {
                focus: None,
                level: self.params.idle_attention,
            },
        };
    }

    pub(crate) fn spawn(&mut self, tick: u64, text: String, strength: f32) -> ThoughtId {
        self.thoughts.insert_with_key(|id| Thought {
            id,
            created_at: tick,
            text,
            strength,
            age: 0,
        })
    }
}
