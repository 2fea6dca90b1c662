// Weighted VFST transition records.

use bytemuck::{Pod, Zeroable};

/// Weighted transition record (16 bytes).
///
/// - `sym_in` (u32): input symbol index
/// - `sym_out` (u32): output symbol index
/// - `target_state` (u32): slot index of the target state's first record
/// - `weight` (i16): transition weight (signed)
/// - `more_transitions` (u8): extra record count of the state (255 = overflow);
///   only meaningful on a state's first record
/// - `_reserved` (u8): padding
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct WeightedTransition {
    pub sym_in: u32,
    pub sym_out: u32,
    pub target_state: u32,
    pub weight: i16,
    pub more_transitions: u8,
    pub _reserved: u8,
}

/// Sentinel input symbol marking a final-state record.
pub const WEIGHTED_FINAL_SYM: u32 = 0xFFFF_FFFF;

/// Largest `more_transitions` value stored inline; 255 signals an overflow cell.
pub const MAX_INLINE_MORE: usize = 254;

impl WeightedTransition {
    pub fn arc(sym_in: u32, sym_out: u32, target_state: u32, weight: i16) -> Self {
        Self {
            sym_in,
            sym_out,
            target_state,
            weight,
            more_transitions: 0,
            _reserved: 0,
        }
    }

    /// Record marking its state as final with `weight`.
    pub fn final_marker(weight: i16) -> Self {
        Self::arc(WEIGHTED_FINAL_SYM, 0, 0, weight)
    }

    #[inline]
    pub fn is_final_marker(&self) -> bool {
        self.sym_in == WEIGHTED_FINAL_SYM
    }
}

/// Weighted overflow cell (16 bytes).
///
/// Occupies the second slot of a state with more than 255 extra records;
/// `more_transitions` then holds the number of records minus one (not
/// counting the cell itself).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct WeightedOverflowCell {
    pub more_transitions: u32,
    pub _short_padding: u32,
    pub _padding: u64,
}

impl WeightedOverflowCell {
    pub fn new(more_transitions: u32) -> Self {
        Self {
            more_transitions,
            _short_padding: 0,
            _padding: 0,
        }
    }

    /// Reinterpret as a transition record for storage in the table.
    pub fn as_transition(self) -> WeightedTransition {
        bytemuck::cast(self)
    }
}

/// Maximum slot index (0-based, relative to the state's first record) of the
/// state starting at `state_index`. Includes the overflow cell if present.
#[inline]
pub fn weighted_max_tc(transitions: &[WeightedTransition], state_index: u32) -> u32 {
    let state_head = &transitions[state_index as usize];
    let max_tc = state_head.more_transitions as u32;
    if max_tc == 255 {
        let overflow_bytes = bytemuck::bytes_of(&transitions[state_index as usize + 1]);
        let oc: &WeightedOverflowCell = bytemuck::from_bytes(overflow_bytes);
        oc.more_transitions + 1
    } else {
        max_tc
    }
}

const _: () = assert!(size_of::<WeightedTransition>() == 16);
const _: () = assert!(size_of::<WeightedOverflowCell>() == 16);
