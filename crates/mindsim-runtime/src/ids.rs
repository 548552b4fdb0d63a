//! Typed entity handles
//!
//! Neurons, synapses, regions and thoughts each live in their own
//! [`SlotMap`](slotmap::SlotMap). A handle kept after its entity was removed
//! no longer resolves, even when the slot has been reused.

use core::fmt;

use slotmap::{new_key_type, Key};

new_key_type! {
    /// Stable handle for neurons backed by a generational slot map
    pub struct NeuronId;

    /// Stable handle for synapses backed by a generational slot map
    pub struct SynapseId;

    /// Stable handle for regions backed by a generational slot map
    pub struct RegionId;

    /// Stable handle for thoughts; thoughts come and go every tick
    pub struct ThoughtId;
}

macro_rules! display_with_prefix {
    ($($name:ident => $prefix:literal),* $(,)?) => {
        $(
            impl $name {
                /// Slot position of this handle
                pub fn slot(&self) -> u32 {
                    (self.data().as_ffi() & 0xffff_ffff) as u32
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!($prefix, "{}"), self.slot())
                }
            }
        )*
    };
}

display_with_prefix!(NeuronId => "N", SynapseId => "S", RegionId => "R", ThoughtId => "T");

/// Handle for `slot` without a backing map
#[cfg(test)]
pub(crate) fn detached<K: From<slotmap::KeyData>>(slot: u32) -> K {
    slotmap::KeyData::from_ffi((1u64 << 32) | u64::from(slot)).into()
}
