use std::{io, path::PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser};
use numkit::{
    menu::Menu,
    printer::PrintOptions,
    settings::{
        Settings, DEFAULT_FRAC_DIGITS, DEFAULT_INT_DIGITS, DEFAULT_MAX_ITERATIONS,
        DEFAULT_PRECISION, DEFAULT_SCAN_SUBDIVISIONS, DEFAULT_TOLERANCE, DEFAULT_ZERO_TOLERANCE,
    },
};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Interactive numerical methods: base conversion, linear systems and polynomial roots.
#[derive(Parser, Debug)]
#[command(name = "numkit", version, about)]
struct Cli {
    /// Stop bisecting once half the interval width is at most this value
    #[arg(long, env = "NUMKIT_TOLERANCE", default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Maximum number of bisection steps per root
    #[arg(long, env = "NUMKIT_MAX_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Entries with an absolute value at most this value count as zero pivots
    #[arg(long, env = "NUMKIT_ZERO_TOLERANCE", default_value_t = DEFAULT_ZERO_TOLERANCE)]
    zero_tolerance: f64,

    /// Number of decimals shown for matrices, solutions and roots
    #[arg(long, env = "NUMKIT_PRECISION", default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// Width of the integer part in base conversions
    #[arg(long, env = "NUMKIT_INT_DIGITS", default_value_t = DEFAULT_INT_DIGITS)]
    int_digits: usize,

    /// Number of fractional digits in base conversions
    #[arg(long, env = "NUMKIT_FRAC_DIGITS", default_value_t = DEFAULT_FRAC_DIGITS)]
    frac_digits: usize,

    /// Number of parts in which each root interval is scanned for sign changes
    #[arg(long, env = "NUMKIT_SCAN_SUBDIVISIONS", default_value_t = DEFAULT_SCAN_SUBDIVISIONS)]
    scan_subdivisions: usize,

    /// Do not clear the terminal between menu screens
    #[arg(long, env = "NUMKIT_NO_CLEAR")]
    no_clear: bool,

    /// Matrix file offered by default when solving linear systems
    #[arg(long, env = "NUMKIT_FILE")]
    file: Option<PathBuf>,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let mut s = Settings::default();
        s.bisection.tolerance = cli.tolerance;
        s.bisection.max_iterations = cli.max_iterations;
        s.elimination.zero_tolerance = cli.zero_tolerance;
        s.print = PrintOptions::with_precision(cli.precision);
        s.radix.int_digits = cli.int_digits;
        s.radix.frac_digits = cli.frac_digits;
        s.scan_subdivisions = cli.scan_subdivisions;
        s.clear_screen = !cli.no_clear;
        s.matrix_file = cli.file;
        s
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_env("NUMKIT_LOG"))
        .init();

    let settings: Settings = Cli::parse().into();
    if let Err(e) = settings.validate() {
        Cli::command().error(ErrorKind::InvalidValue, e).exit();
    }
    debug!("Settings: {:?}", settings);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(stdin.lock(), stdout.lock(), settings).run()
}
