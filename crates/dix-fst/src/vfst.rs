// Weighted VFST writer and loader.
//
// Layout: header, symbol table, zero padding up to a 16-byte boundary, then
// the transition table. Each state owns a contiguous run of records: a final
// marker first (if the state is final), then its arcs sorted by input symbol
// so that epsilon arcs come before any character arc. States with more than
// 255 extra records keep an overflow cell in their second slot.

use hashbrown::HashMap;

use crate::format::{HEADER_SIZE, VfstHeader};
use crate::symbols::{self, SymbolTable};
use crate::transducer::{BasicTransducer, StateId};
use crate::transition::{
    MAX_INLINE_MORE, WeightedOverflowCell, WeightedTransition, weighted_max_tc,
};
use crate::FstError;

/// Round a tropical weight to the 16-bit VFST representation.
fn to_vfst_weight(weight: f64) -> Result<i16, FstError> {
    let rounded = weight.round();
    if rounded.is_finite() && rounded >= i16::MIN as f64 && rounded <= i16::MAX as f64 {
        Ok(rounded as i16)
    } else {
        Err(FstError::WeightOutOfRange(weight))
    }
}

/// Number of table slots a state with `records` records occupies.
#[inline]
fn slot_count(records: usize) -> usize {
    if records.saturating_sub(1) > MAX_INLINE_MORE {
        records + 1
    } else {
        records
    }
}

/// Serialize `t` as a weighted VFST file.
///
/// Useless states are trimmed first. Fails if the transducer accepts
/// nothing, if a weight does not fit in `i16`, or if there are more than
/// `u16::MAX` symbols.
pub fn write_weighted(t: &BasicTransducer) -> Result<Vec<u8>, FstError> {
    let t = t.connect();
    if t.arcs(0).is_empty() && !t.is_final(0) {
        return Err(FstError::EmptyTransducer);
    }
    let symbols = SymbolTable::from_transducer(&t);

    let mut offsets = Vec::with_capacity(t.state_count());
    let mut next_slot = 0usize;
    for s in t.states() {
        offsets.push(next_slot as u32);
        let records = t.arcs(s).len() + usize::from(t.is_final(s));
        next_slot += slot_count(records);
    }

    let mut table: Vec<WeightedTransition> = Vec::with_capacity(next_slot);
    for s in t.states() {
        let mut records = Vec::with_capacity(t.arcs(s).len() + 2);
        if let Some(w) = t.final_weight(s) {
            records.push(WeightedTransition::final_marker(to_vfst_weight(w)?));
        }

        let mut arcs = Vec::with_capacity(t.arcs(s).len());
        for arc in t.arcs(s) {
            let sym_in = symbol_index(&symbols, &arc.input)?;
            let sym_out = symbol_index(&symbols, &arc.output)?;
            arcs.push(WeightedTransition::arc(
                sym_in,
                sym_out,
                offsets[arc.target as usize],
                to_vfst_weight(arc.weight)?,
            ));
        }
        arcs.sort_by_key(|r| (r.sym_in, r.sym_out, r.target_state, r.weight));
        records.extend(arcs);

        let more = records.len() - 1;
        if more > MAX_INLINE_MORE {
            records[0].more_transitions = 255;
            records.insert(1, WeightedOverflowCell::new(more as u32).as_transition());
        } else {
            records[0].more_transitions = more as u8;
        }
        table.extend(records);
    }

    let mut data = Vec::new();
    VfstHeader { weighted: true }.write(&mut data);
    symbols.write(&mut data)?;
    let partial = data.len() % 16;
    if partial > 0 {
        data.resize(data.len() + (16 - partial), 0);
    }
    data.extend_from_slice(bytemuck::cast_slice(&table));
    Ok(data)
}

fn symbol_index(symbols: &SymbolTable, symbol: &str) -> Result<u32, FstError> {
    symbols
        .index_of(symbol)
        .ok_or_else(|| FstError::InvalidSymbolTable(format!("symbol {symbol:?} missing from table")))
}

/// Load a weighted VFST file back into a [`BasicTransducer`].
///
/// State ids follow the order of the states in the transition table, so the
/// state at slot 0 becomes state 0.
pub fn read_weighted(data: &[u8]) -> Result<BasicTransducer, FstError> {
    let header = VfstHeader::parse(data)?;
    if !header.weighted {
        return Err(FstError::TypeMismatch {
            expected: true,
            actual: false,
        });
    }

    let (symbols, sym_end) = symbols::parse_symbol_table(data, HEADER_SIZE)?;

    // Align to 16-byte boundary (sizeof(WeightedTransition))
    let partial = sym_end % 16;
    let transition_offset = if partial > 0 {
        sym_end + (16 - partial)
    } else {
        sym_end
    };
    if transition_offset > data.len() {
        return Err(FstError::TooShort {
            expected: transition_offset,
            actual: data.len(),
        });
    }

    let remaining = &data[transition_offset..];
    let record_count = remaining.len() / size_of::<WeightedTransition>();
    if record_count == 0 {
        return Err(FstError::TooShort {
            expected: transition_offset + size_of::<WeightedTransition>(),
            actual: data.len(),
        });
    }

    // Copy into an aligned Vec; the input slice may not be 16-byte aligned.
    let mut table = vec![WeightedTransition::arc(0, 0, 0, 0); record_count];
    bytemuck::cast_slice_mut::<WeightedTransition, u8>(&mut table)
        .copy_from_slice(&remaining[..record_count * size_of::<WeightedTransition>()]);

    // First pass: find where each state's records start.
    let mut heads: Vec<(u32, u32)> = Vec::new();
    let mut slot_to_state: HashMap<u32, StateId> = HashMap::new();
    let mut slot = 0usize;
    while slot < table.len() {
        if table[slot].more_transitions == 255 && slot + 1 >= table.len() {
            return Err(FstError::InvalidTransitionTable(format!(
                "overflow cell of state at slot {slot} is missing"
            )));
        }
        let max_tc = weighted_max_tc(&table, slot as u32);
        let last = slot + max_tc as usize;
        if last >= table.len() {
            return Err(FstError::InvalidTransitionTable(format!(
                "state at slot {slot} runs past the end of the table"
            )));
        }
        slot_to_state.insert(slot as u32, heads.len() as StateId);
        heads.push((slot as u32, max_tc));
        slot = last + 1;
    }

    let mut t = BasicTransducer::new();
    for _ in 1..heads.len() {
        t.add_state();
    }

    for (state, &(head, max_tc)) in heads.iter().enumerate() {
        let state = state as StateId;
        for tc in 0..=max_tc {
            if tc == 1 && max_tc >= 255 {
                continue;
            }
            let record = &table[(head + tc) as usize];
            if record.is_final_marker() {
                t.set_final_weight(state, f64::from(record.weight));
                continue;
            }
            let target = *slot_to_state.get(&record.target_state).ok_or_else(|| {
                FstError::InvalidTransitionTable(format!(
                    "arc targets slot {} which does not start a state",
                    record.target_state
                ))
            })?;
            let input = symbols.symbol(record.sym_in).ok_or_else(|| {
                FstError::InvalidTransitionTable(format!("unknown input symbol {}", record.sym_in))
            })?;
            let output = symbols.symbol(record.sym_out).ok_or_else(|| {
                FstError::InvalidTransitionTable(format!("unknown output symbol {}", record.sym_out))
            })?;
            t.add_transition(state, target, input, output, f64::from(record.weight));
        }
    }

    Ok(t)
}
