use super::Substituter;
use crate::symbols::{CanonicalFragment, CurrencySymbol, SymbolTable};

const FRAG: &str = "<span class=\"saudi-riyal-symbol\">&#xE900;</span>";
const EMPTY_FRAG: &str = "<span class=\"saudi-riyal-symbol\"></span>";

fn engine() -> &'static Substituter {
    Substituter::saudi_riyal()
}

fn fragments_in(s: &str) -> usize {
    s.matches(FRAG).count()
}

#[test]
fn substitution_examples() {
    // Array of (input, expected_output)
    let cases: Vec<(&str, String)> = vec![
        ("100 \u{FDFC}.", format!("100 {FRAG}")),
        ("100 \u{FDFC}", format!("100 {FRAG}")),
        ("100 SAR", format!("100 {FRAG}")),
        ("SAR 100", format!("{FRAG} 100")),
        ("75 ر.س .", format!("75 {FRAG}")),
        ("75 ر.س.\u{200F}", format!("75 {FRAG}")),
        ("75 ر.س\u{200F}", format!("75 {FRAG}")),
        ("12.50&nbsp;SAR&nbsp;.", format!("12.50&nbsp;{FRAG}")),
        ("12.50 SAR\u{00A0}.", format!("12.50 {FRAG}")),
        ("1,200.00 \u{FDFC}. . .", format!("1,200.00 {FRAG}")),
        ("10 SAR / 20 SAR", format!("10 {FRAG} / 20 {FRAG}")),
        ("10 SAR 5", format!("10 {FRAG} 5")),
        ("no currency here", "no currency here".to_string()),
        ("1.5 USD", "1.5 USD".to_string()),
        ("", String::new()),
    ];

    for (input, expected) in cases {
        assert_eq!(engine().substitute(input), expected, "input: {input:?}");
    }
}

#[test]
fn markup_examples() {
    let cases: Vec<(String, String)> = vec![
        (r#"<span class="price">99.00 SAR</span>"#.into(), format!(r#"<span class="price">99.00 {FRAG}</span>"#)),
        (
            r#"<span class="price" data-currency="SAR">99.00 ر.س.</span>"#.into(),
            format!(r#"<span class="price" data-currency="SAR">99.00 {FRAG}</span>"#),
        ),
        (r#"<img alt="SAR">"#.into(), r#"<img alt="SAR">"#.into()),
        (r#"<div><b>5</b> <i>SAR</i>.</div>"#.into(), format!(r#"<div><b>5</b> <i>{FRAG}</i>.</div>"#)),
        (format!("5 {EMPTY_FRAG}"), format!("5 {FRAG}")),
        (format!("5 {EMPTY_FRAG}.\u{200F}"), format!("5 {FRAG}")),
        (format!("5 {FRAG} . "), format!("5 {FRAG} ")),
        (format!("5 {FRAG}&rlm;"), format!("5 {FRAG}")),
        (r#"<span class="saudi-riyal-symbol">?</span>."#.into(), FRAG.to_string()),
        (r#"<b title="a>SAR">5 SAR</b>"#.into(), format!(r#"<b title="a>SAR">5 {FRAG}</b>"#)),
        (r#"<i data-note='SAR > USD'>SAR</i>"#.into(), format!(r#"<i data-note='SAR > USD'>{FRAG}</i>"#)),
        (r#"<img alt="Total > SAR" src="x.png"> 10 SAR"#.into(), format!(r#"<img alt="Total > SAR" src="x.png"> 10 {FRAG}"#)),
        ("1 < 2 SAR".into(), format!("1 < 2 {FRAG}")),
    ];

    for (input, expected) in cases {
        assert_eq!(engine().substitute(&input), expected, "input: {input:?}");
    }
}

#[test]
fn every_variant_with_every_noise_yields_one_fragment() {
    let table = SymbolTable::saudi_riyal();
    for variant in &table.currencies()[0].variants {
        for noise in table.noise() {
            let input = format!("100 {variant}{noise}");
            let out = engine().substitute(&input);
            assert_eq!(out, format!("100 {FRAG}"), "input: {input:?}");
            assert_eq!(fragments_in(&out), 1);
        }
    }
}

#[test]
fn substitution_is_idempotent() {
    let inputs = [
        "100 \u{FDFC}.",
        "50 SAR",
        "75 ر.س .",
        "<p>SAR SAR\u{FDFC}ر.س</p>",
        "<span class=\"saudi-riyal-symbol\"></span>..",
        "<b title=\"SAR.\">SAR.</b>.",
        "SA<i>R</i>.",
        "SAR&nbsp;.&nbsp;.&rlm;",
        "text . \u{200F} SAR . \u{200F} . tail",
        "<span class=\"saudi-riyal-symbol\"><span class=\"saudi-riyal-symbol\"></span></span>",
    ];

    for input in inputs {
        let once = engine().substitute(input);
        let twice = engine().substitute(&once);
        assert_eq!(once, twice, "input: {input:?}");
        assert!(!twice.contains(EMPTY_FRAG), "empty fragment left for {input:?}");
    }
}

#[test]
fn adjacent_variants_are_not_double_wrapped() {
    let out = engine().substitute("SARSAR");
    assert_eq!(out, format!("{FRAG}{FRAG}"));

    let out = engine().substitute("\u{FDFC} ");
    assert_eq!(out, format!("{FRAG} "));
    assert!(!out.contains(&format!("{FRAG}{FRAG}")));
    assert!(!out.contains("<span class=\"saudi-riyal-symbol\"><span"));
}

#[test]
fn normalize_only_cleans_existing_fragments() {
    let input = format!("SAR {FRAG}. 5");
    assert_eq!(engine().normalize(&input), format!("SAR {FRAG} 5"));
}

#[test]
fn report_counts_each_stage() {
    let report = engine().substitute_with_report(&format!("10 SAR. 20 ر.س {EMPTY_FRAG}."));

    assert_eq!(report.output, format!("10 {FRAG} 20 {FRAG} {FRAG}"));
    assert_eq!(report.replacements, 2);
    assert_eq!(report.fragments_repaired, 1);
    assert_eq!(report.noise_trimmed, 1);
    assert_eq!(report.normalize_passes, 2);
    assert_eq!(
        report.hits.iter().map(|h| h.label.as_str()).collect::<Vec<_>>(),
        vec!["SAR.", "ر.س"]
    );
}

#[test]
fn custom_tables_use_their_own_fragment() {
    let table = SymbolTable::new(
        vec![CurrencySymbol {
            code: "AED".into(),
            variants: vec!["AED".into(), "د.إ".into()],
            fragment: CanonicalFragment::new("dirham-symbol", '\u{E901}').unwrap(),
        }],
        vec![".".into()],
    )
    .unwrap();
    let engine = Substituter::new(table).unwrap();

    assert_eq!(engine.substitute("5 AED."), "5 <span class=\"dirham-symbol\">&#xE901;</span>");
    assert_eq!(engine.substitute("5 SAR."), "5 SAR.");
    assert_eq!(engine.fragment_html("AED").as_deref(), Some("<span class=\"dirham-symbol\">&#xE901;</span>"));
    assert_eq!(engine.fragment_html("SAR"), None);
}

#[test]
fn fragment_shells_outside_text_are_left_alone() {
    // Comments and attribute values are opaque; only markup-level shells are repaired.
    let cases = vec![
        format!("<!-- {EMPTY_FRAG} -->"),
        format!("<b title='{EMPTY_FRAG}'>x</b>"),
    ];

    for input in cases {
        assert_eq!(engine().substitute(&input), input, "input: {input:?}");
    }
}
