#![forbid(unsafe_code)]

//! Command-line argument parsing for the showcase binary.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `RILL_SHOWCASE_*` prefix.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Rill Showcase — reactive stream composition demo

USAGE:
    rill-showcase [OPTIONS]

OPTIONS:
    --section=NAME   Which panel to run: 'numbers', 'list', or 'all' (default: all)
    --verbose        Log at debug level (form changes, fallback substitutions)
    --help, -h       Show this help message
    --version, -V    Show version

SECTIONS:
    numbers   Combine the three numbers feeds into one flattened stream
    list      Fetch the list with silent empty-list fallback on failure
    all       Both panels, plus form binding and lifecycle teardown

ENVIRONMENT VARIABLES:
    RILL_SHOWCASE_SECTION   Override --section (numbers|list|all)
    RILL_SHOWCASE_VERBOSE   Override --verbose (1/true to enable)";

/// Parsed command-line options.
pub struct Opts {
    /// Which panel to run: "numbers", "list", or "all".
    pub section: String,
    /// Log at debug level.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            section: "all".into(),
            verbose: false,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
}

/// Parse `std::env::args`, honoring environment overrides.
///
/// Prints help/version and exits for `--help`/`--version`; exits with an
/// error message for unknown arguments or sections.
#[must_use]
pub fn parse() -> Opts {
    let mut opts = Opts::default();

    if let Ok(section) = env::var("RILL_SHOWCASE_SECTION") {
        opts.section = section;
    }
    if let Some(verbose) = env_flag("RILL_SHOWCASE_VERBOSE") {
        opts.verbose = verbose;
    }

    for arg in env::args().skip(1) {
        if let Some(section) = arg.strip_prefix("--section=") {
            opts.section = section.to_owned();
        } else {
            match arg.as_str() {
                "--verbose" => opts.verbose = true,
                "--help" | "-h" => {
                    println!("{HELP_TEXT}");
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("rill-showcase {VERSION}");
                    process::exit(0);
                }
                other => {
                    eprintln!("unknown argument: {other}\n\n{HELP_TEXT}");
                    process::exit(2);
                }
            }
        }
    }

    if !matches!(opts.section.as_str(), "numbers" | "list" | "all") {
        eprintln!(
            "unknown section: {} (expected numbers|list|all)",
            opts.section
        );
        process::exit(2);
    }

    opts
}
