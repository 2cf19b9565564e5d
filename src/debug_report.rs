use riyal_glyph::{CompiledPatterns, ScanOutcome, SubstitutionReport};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        fn wrap(&self, s: &str, code: &str) -> String {
            if self.enabled { format!("{code}{s}{RESET}") } else { s.to_string() }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            self.wrap(s.as_ref(), color)
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            self.wrap(s.as_ref(), BOLD)
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.wrap(s.as_ref(), DIM)
        }
    }
}

fn heading(palette: &ansi::Palette, title: &str) {
    println!("\n{}", palette.paint(format!("━━━ {title} ━━━"), ansi::GRAY));
}

pub fn print_inactive(input: &str, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Input: {input:?}"), ansi::CYAN)));
    println!("\n{}", palette.paint("Substitution is inactive for this store scope", ansi::YELLOW));
    println!("  • the feature flag is off, or");
    println!("  • the current currency is not the target currency");
    println!("\n{}", palette.dim(format!("  Tip: set {}=debug to see lookup details", crate::LOG_ENV)));
    println!();
}

pub fn print_report(input: &str, report: &SubstitutionReport, patterns: &CompiledPatterns, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Input: {input:?}"), ansi::CYAN)));

    heading(&palette, "Patterns");
    println!("  {}", palette.dim(format!("{} patterns, applied in order", patterns.patterns.len())));
    if report.hits.is_empty() {
        println!("  {}", palette.dim("✗ no variant matched"));
    }
    for hit in &report.hits {
        println!(
            "  {} {}",
            palette.paint(format!("{:?}", hit.label), ansi::BLUE),
            palette.paint(format!("✓ {} hit(s)", hit.hits), ansi::GREEN)
        );
    }

    heading(&palette, "Normalize");
    println!(
        "  {} {}  {} {}  {} {}",
        palette.dim("passes:"),
        palette.paint(report.normalize_passes.to_string(), ansi::YELLOW),
        palette.dim("│ noise bytes trimmed:"),
        palette.paint(report.noise_trimmed.to_string(), ansi::YELLOW),
        palette.dim("│ fragments repaired:"),
        palette.paint(report.fragments_repaired.to_string(), ansi::YELLOW),
    );

    heading(&palette, "Output");
    if report.changed(input) {
        println!("  {}", palette.bold(palette.paint(&report.output, ansi::GREEN)));
    } else {
        println!("  {}", palette.dim("(unchanged)"));
    }

    heading(&palette, "Timing");
    println!(
        "  Total: {}  │  Replacements: {}",
        palette.paint(format!("{:?}", report.elapsed), ansi::GREEN),
        palette.paint(report.replacements.to_string(), ansi::CYAN),
    );
    println!();
}

pub fn print_scan(outcome: &ScanOutcome, degraded: bool, color: bool) {
    let palette = ansi::Palette::new(color);
    heading(&palette, "Initial scan");
    println!(
        "  {} {}  {} {}  {} {}  {} {}",
        palette.dim("examined:"),
        palette.paint(outcome.examined.to_string(), ansi::YELLOW),
        palette.dim("│ rewritten:"),
        palette.paint(outcome.rewritten.to_string(), ansi::GREEN),
        palette.dim("│ skipped:"),
        palette.paint(outcome.skipped.to_string(), ansi::GRAY),
        palette.dim("│ classes added:"),
        palette.paint(outcome.classes_added.to_string(), ansi::BLUE),
    );
    if degraded {
        println!("  {}", palette.paint("observer unavailable: later insertions are not watched", ansi::YELLOW));
    }
    println!();
}
