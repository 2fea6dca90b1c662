//! End-to-end compilation of the dictionaries under `tests/data/`.
//!
//! Run: cargo test -p dix-compiler --test compile

use std::collections::BTreeMap;
use std::path::PathBuf;

use dix_compiler::{CompilerOptions, Direction, DixCompiler, DixError, DixType};
use dix_fst::{ANY_CHAR, ANY_TAG, BasicTransducer, EPSILON};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn compile_file(name: &str, options: CompilerOptions) -> Result<DixCompiler, DixError> {
    let mut compiler = DixCompiler::new(options);
    compiler.compile_file(data(name))?;
    Ok(compiler)
}

fn compile_lr(name: &str) -> BasicTransducer {
    compile_file(name, CompilerOptions::new(Direction::LR))
        .unwrap_or_else(|e| panic!("failed to compile {name}: {e}"))
        .transducer()
}

fn compile_str(xml: &str, direction: Direction) -> Result<DixCompiler, DixError> {
    let mut compiler = DixCompiler::new(CompilerOptions::new(direction));
    compiler.compile_str(xml)?;
    Ok(compiler)
}

fn att(t: &BasicTransducer) -> String {
    let mut out = Vec::new();
    dix_fst::att::write_att(t, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn outputs(t: &BasicTransducer, input: &str) -> Vec<String> {
    t.lookup(input).into_keys().collect()
}

// ---------------------------------------------------------------------------
// Paradigms and regular expressions
// ---------------------------------------------------------------------------

#[test]
fn vowel_paradigm() {
    let t = compile_lr("vowel.dix");
    for word in ["ca", "ce", "ci", "co", "cu"] {
        assert_eq!(outputs(&t, word), vec![word.to_string()], "{word}");
    }
    for word in ["cx", "c", "a", "cae"] {
        assert!(!t.accepts(word), "{word} should be rejected");
    }
}

#[test]
fn noun_and_verb_paradigms() {
    let t = compile_lr("nouns.dix");
    assert_eq!(outputs(&t, "house"), vec!["house<n><sg>"]);
    assert_eq!(outputs(&t, "houses"), vec!["house<n><pl>"]);
    assert_eq!(outputs(&t, "mouse"), vec!["mouse<n><sg>"]);
    assert_eq!(outputs(&t, "mice"), vec!["mouse<n><pl>"]);
    assert_eq!(outputs(&t, "walk"), vec!["walk<vblex><inf>"]);
    assert!(!t.accepts("mouses"));
    assert!(!t.accepts("house<n>"));
}

#[test]
fn entry_weights_add_to_paradigm_weights() {
    let t = compile_lr("nouns.dix");
    let expected: BTreeMap<String, f64> =
        [("walk<vblex><pres><p3><sg>".to_string(), 0.5)].into_iter().collect();
    assert_eq!(t.lookup("walks"), expected);
    assert_eq!(t.lookup("take# off").get("take<vblex><inf># off"), Some(&2.0));
    assert_eq!(
        t.lookup("takes# off").get("take<vblex><pres><p3><sg># off"),
        Some(&2.5)
    );
}

#[test]
fn direction_and_ignore_filters() {
    let lr = compile_lr("nouns.dix");
    assert!(lr.accepts("color"));
    assert!(!lr.accepts("colour"));
    assert!(!lr.accepts("hat"));

    let rl = compile_file("nouns.dix", CompilerOptions::new(Direction::RL))
        .unwrap()
        .transducer();
    assert!(rl.accepts("colour"));
    assert!(!rl.accepts("color"));
    assert!(!rl.accepts("hat"));
    assert!(rl.accepts("houses"));
}

#[test]
fn filtered_entry_adds_nothing() {
    let xml = r#"<dictionary><section>
        <e r="RL"><i>abc</i></e>
    </section></dictionary>"#;
    let c = compile_str(xml, Direction::LR).unwrap();
    assert_eq!(c.root().state_count(), 1);
    assert_eq!(c.root().transition_count(), 0);
}

#[test]
fn pair_alignment() {
    let xml = "<dictionary><section><e><p><l>ab</l><r>x</r></p></e></section></dictionary>";
    let c = compile_str(xml, Direction::LR).unwrap();
    assert_eq!(
        att(c.root()),
        "0\t1\ta\tx\t0\n1\t2\tb\t@0@\t0\n2\t0\n"
    );
}

#[test]
fn sections_accumulate() {
    let xml = r#"<dictionary>
        <section id="a"><e><i>one</i></e></section>
        <section id="b" type="postblank"><e><i>two</i></e></section>
        <section id="c"><e><i>three</i></e></section>
    </dictionary>"#;
    let t = compile_str(xml, Direction::LR).unwrap().transducer();
    for word in ["one", "two", "three"] {
        assert!(t.accepts(word), "{word}");
    }
}

#[test]
fn compilation_is_deterministic() {
    let first = compile_lr("nouns.dix");
    let second = compile_lr("nouns.dix");
    assert_eq!(att(&first), att(&second));
}

// ---------------------------------------------------------------------------
// Separable dictionaries
// ---------------------------------------------------------------------------

#[test]
fn separable_wildcards_get_self_loops() {
    let c = compile_file("separable.dix", CompilerOptions::new(Direction::LR)).unwrap();
    assert_eq!(c.mode(), DixType::Separable);

    let root = c.root();
    let loops: Vec<(&str, &str)> = root
        .states()
        .flat_map(|s| root.arcs(s).iter().filter(move |a| a.target == s))
        .map(|a| (a.input.as_str(), a.output.as_str()))
        .collect();
    assert_eq!(loops, vec![(EPSILON, ANY_TAG), (ANY_CHAR, ANY_CHAR)]);

    let symbols = root.symbols();
    assert!(symbols.contains("<$>"));
    assert!(!symbols.contains("+"));
}

#[test]
fn wildcards_need_separable_type() {
    let xml = "<dictionary>\n<section><e><i><w/></i></e></section></dictionary>";
    let err = compile_str(xml, Direction::LR).unwrap_err();
    assert!(matches!(err, DixError::UnexpectedElement { ref name, line: 2 } if name == "w"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn self_reference_is_fatal_in_both_directions() {
    for direction in [Direction::LR, Direction::RL] {
        let err = compile_file("self_reference.dix", CompilerOptions::new(direction)).unwrap_err();
        assert!(
            matches!(err, DixError::SelfReference { ref name, line: 6 } if name == "loop"),
            "{err}"
        );
    }
}

#[test]
fn forward_reference_is_fatal() {
    let err = compile_file("forward_reference.dix", CompilerOptions::new(Direction::LR)).unwrap_err();
    assert!(matches!(err, DixError::UndefinedParadigm { ref name, line: 5 } if name == "second"));
}

#[test]
fn missing_file() {
    let err = compile_file("no_such.dix", CompilerOptions::new(Direction::LR)).unwrap_err();
    assert!(matches!(err, DixError::Io { .. }));
    assert!(err.to_string().contains("no_such.dix"));
}

#[test]
fn regex_errors_are_reported_with_line() {
    let xml = "<dictionary>\n<alphabet>ab</alphabet>\n<section>\n<e><re>[^ab]</re></e></section></dictionary>";
    let err = compile_str(xml, Direction::LR).unwrap_err();
    assert!(matches!(
        err,
        DixError::Regex {
            source: dix_compiler::RegexError::EmptyClass,
            line: 4
        }
    ));
    assert_eq!(
        err.to_string(),
        "invalid regular expression on line 4: character class matches nothing"
    );
}

#[test]
fn negated_class_uses_declared_alphabet() {
    let xml = r#"<dictionary><alphabet>abc</alphabet>
        <section><e><re>[^a]</re></e></section></dictionary>"#;
    let t = compile_str(xml, Direction::RL).unwrap().transducer();
    assert!(t.accepts("b"));
    assert!(t.accepts("c"));
    assert!(!t.accepts("a"));
    assert!(!t.accepts("d"));
}

// ---------------------------------------------------------------------------
// Output formats
// ---------------------------------------------------------------------------

#[test]
fn vfst_round_trip_preserves_analyses() {
    let t = compile_lr("nouns.dix");
    let bytes = dix_fst::vfst::write_weighted(&t).unwrap();
    let loaded = dix_fst::vfst::read_weighted(&bytes).unwrap();
    for word in ["house", "houses", "mouse", "mice", "walk", "walks", "color"] {
        assert_eq!(outputs(&loaded, word), outputs(&t, word), "{word}");
    }

    // VFST stores i16 weights, each arc weight rounded half away from zero.
    assert_eq!(loaded.lookup("house").get("house<n><sg>"), Some(&0.0));
    assert_eq!(loaded.lookup("walks").get("walk<vblex><pres><p3><sg>"), Some(&1.0));
    assert_eq!(loaded.lookup("take# off").get("take<vblex><inf># off"), Some(&2.0));
    assert_eq!(
        loaded.lookup("takes# off").get("take<vblex><pres><p3><sg># off"),
        Some(&3.0)
    );
}
