//! Runs the bundled mesa scenarios through the in-process host.
//!
//! Usage: cargo run --bin mesa-demo -- [--run pattern] [--bench] [--benchtime 100x] [--json]

mod suites;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use mesa::{BenchSuite, BenchTime, HostConfig, Suite, B, T};

#[derive(Debug, Parser)]
#[command(
    name = "mesa-demo",
    version,
    about = "Runs the bundled mesa example suites."
)]
struct DemoArgs {
    /// Only run scenarios matching this slash-separated pattern.
    #[arg(long = "run", value_name = "PATTERN")]
    run: Option<String>,

    /// Run the benchmarks instead of the tests.
    #[arg(long)]
    bench: bool,

    /// Benchmark duration (e.g. `250ms`) or iteration count (e.g. `100x`).
    #[arg(long, value_name = "TIME")]
    benchtime: Option<String>,

    /// Print the outcome tree as JSON. Benchmarks need an iteration count.
    #[arg(long)]
    json: bool,

    #[arg(long)]
    no_color: bool,

    /// Add a scenario that always fails.
    #[arg(long, hide = true)]
    with_failure: bool,
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("MESA_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let args = DemoArgs::parse();
    let config = config(&args)?;
    // Criterion writes its own report to stdout while it measures.
    if args.json && args.bench && matches!(config.bench_time, BenchTime::Duration(_)) {
        return Err(miette::miette!(
            help = "use an iteration count, e.g. `--benchtime 100x`",
            "`--json` cannot be combined with a duration bench time"
        ));
    }

    let report = if args.bench {
        mesa::run_benchmarks("benchmarks", &config, |b| benchmarks(b))
    } else {
        mesa::run_tests("tests", &config, |t| tests(t, args.with_failure))
    };

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report.print(&config).into_diagnostic()?;
    }

    if report.summary().has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn config(args: &DemoArgs) -> miette::Result<HostConfig> {
    let mut config = HostConfig::from_env()?;
    if let Some(pattern) = &args.run {
        config = config.with_filter(pattern.as_str());
    }
    if let Some(raw) = &args.benchtime {
        config = config.with_bench_time(raw.parse::<BenchTime>()?);
    }
    if args.no_color {
        config = config.with_colors(false);
    }
    Ok(config)
}

fn tests(t: &T, with_failure: bool) {
    let buffer = suites::buffer_suite(with_failure);
    let adder = suites::adder_suite();
    t.run("buffer", |t| mesa::run(t, &[&buffer as &dyn Suite]));
    t.run("adder", |t| adder.run(t));
}

fn benchmarks(b: &B) {
    let buffer = suites::buffer_benchmarks();
    let sum = suites::sum_benchmarks();
    b.run("buffer", |b| mesa::bench(b, &[&buffer as &dyn BenchSuite]));
    b.run("sum", |b| sum.bench(b));
}
