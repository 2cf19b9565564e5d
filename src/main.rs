mod debug_report;

use riyal_glyph::{
    ActivationGate, ChangeWatcher, Config, Document, PriceRenderer, Substituter, SymbolFormatter, SymbolPosition,
};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RIYAL_GLYPH_LOG";

fn main() {
    init_tracing();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn run(cli: &CliConfig) -> Result<(), String> {
    let mut config = match &cli.config_path {
        Some(path) => Config::load(path).map_err(|err| format!("error: {err}"))?,
        None => Config::default(),
    };
    if let Some(currency) = &cli.currency {
        config.store.current_currency = currency.clone();
    }
    if cli.disabled {
        config.store.enabled = false;
    }

    let engine = config.substituter().map_err(|err| format!("error: {err}"))?;
    let formatter = SymbolFormatter::new("\u{FDFC}", SymbolPosition::After);
    let renderer = PriceRenderer::new(&engine, ActivationGate::new(config.store()), formatter)
        .target_currency(config.target_currency.clone())
        .container_class_name(config.container_class.clone());

    if !renderer.gate().should_substitute() {
        if cli.report {
            debug_report::print_inactive(&cli.input, cli.color);
        } else {
            println!("{}", cli.input);
        }
        return Ok(());
    }

    if cli.dom {
        return run_dom(cli, &config, &engine);
    }

    if cli.report {
        let report = engine.substitute_with_report(&cli.input);
        debug_report::print_report(&cli.input, &report, engine.patterns(), cli.color);
    } else {
        println!("{}", renderer.convert_price_html(&cli.input));
    }
    Ok(())
}

/// Parse the input as a document, run the watcher's initial scan over it and
/// print the converted body.
fn run_dom(cli: &CliConfig, config: &Config, engine: &Substituter) -> Result<(), String> {
    let mut doc = Document::parse(&cli.input);
    let gate = ActivationGate::new(config.store());
    let mut watcher = ChangeWatcher::new(engine, gate, &config.watch, config.container_class.clone())
        .map_err(|err| format!("error: {err}"))?;
    let outcome = watcher.attach(&mut doc);

    println!("{}", doc.inner_html(doc.root()));
    if cli.report {
        debug_report::print_scan(&outcome, watcher.is_degraded(), cli.color);
    }
    Ok(())
}

struct CliConfig {
    input: String,
    config_path: Option<PathBuf>,
    currency: Option<String>,
    disabled: bool,
    dom: bool,
    report: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut config_path = None;
    let mut currency = None;
    let mut disabled = false;
    let mut dom = false;
    let mut report = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("riyal-glyph {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--disabled" => disabled = true,
            "--dom" => dom = true,
            "--report" => report = true,
            "--config" | "-c" => {
                let value = args.next().ok_or_else(|| "error: --config expects a path".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "--currency" => {
                currency = Some(args.next().ok_or_else(|| "error: --currency expects a code".to_string())?);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    set_input(&mut input, rest)?;
                }
                break;
            }
            _ if arg.starts_with("--config=") => {
                config_path = Some(PathBuf::from(arg.trim_start_matches("--config=")));
            }
            _ if arg.starts_with("--currency=") => {
                currency = Some(arg.trim_start_matches("--currency=").to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                set_input(&mut input, rest)?;
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, config_path, currency, disabled, dom, report, color })
}

fn set_input(input: &mut Option<String>, value: String) -> Result<(), String> {
    if input.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *input = Some(value);
    Ok(())
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.trim_end_matches('\n').to_string())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "riyal-glyph {version}

Rewrite Saudi Riyal renderings (\u{FDFC}, SAR, ر.س) in price markup into the
canonical symbol fragment.

Usage:
  riyal-glyph [OPTIONS] [--] <markup...>
  echo '<span class=\"price\">10 SAR</span>' | riyal-glyph --dom

Options:
  -c, --config <path>        JSON configuration. Defaults to the built-in SAR setup.
  --currency <code>          Override the store's current currency.
  --disabled                 Treat the feature flag as off.
  --dom                      Parse the input as a document and convert every
                             price element, adding the container class.
  --report                   Print a pattern/normalize report instead of the bare output.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}            Log filter (default: warn), e.g. {log_env}=debug.

Exit codes:
  0  Success.
  1  Configuration error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV
    )
}
