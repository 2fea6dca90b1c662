// AT&T text format writer.
//
// One line per arc, `src\tdst\tinput\toutput\tweight`, followed by one
// `state\tweight` line per final state. Epsilon is written as `@0@`; space
// and tab are escaped so that the columns stay unambiguous.

use std::io::{self, Write};

use crate::symbols::is_epsilon;
use crate::transducer::BasicTransducer;

fn escape(symbol: &str) -> &str {
    if is_epsilon(symbol) {
        return "@0@";
    }
    match symbol {
        " " => "@_SPACE_@",
        "\t" => "@_TAB_@",
        _ => symbol,
    }
}

/// Write `t` in AT&T text format. States are numbered as in `t`.
pub fn write_att<W: Write>(t: &BasicTransducer, out: &mut W) -> io::Result<()> {
    for s in t.states() {
        for arc in t.arcs(s) {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}",
                s,
                arc.target,
                escape(&arc.input),
                escape(&arc.output),
                arc.weight
            )?;
        }
    }
    for (s, w) in t.final_states() {
        writeln!(out, "{s}\t{w}")?;
    }
    Ok(())
}
