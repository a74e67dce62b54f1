//! cut_harness command-line driver
//!
//! Runs solver comparisons over stored test groups, benchmarks a single
//! solver, writes new test groups, and sweeps parameter grids into reports.

use clap::{Args, Parser, Subcommand};
use cut_harness::compare::ZeroReferencePolicy;
use cut_harness::config::HarnessConfig;
use cut_harness::error::{HarnessError, Result};
use cut_harness::generator::{seeded_rng, GraphModel, InstanceGenerator, WeightRange};
use cut_harness::group::{run_benchmark_on_group, run_test_group, TestGroupStore};
use cut_harness::logging::{init_logging, LogFormat};
use cut_harness::report::{ExperimentLabel, GridReport, ReportStore};
use cut_harness::runner::Solver;
use cut_harness::sweep::{run_sweep, GridShape, SweepConfig, SweepGrid};
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "cut_harness")]
#[command(about = "Compare and benchmark external k-cut solvers on random graphs")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Random seed (overrides the configuration)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Test group directory (overrides the configuration)
    #[arg(long, global = true)]
    tests_dir: Option<PathBuf>,

    /// Report directory (overrides the configuration)
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,

    /// Console log format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Also write rolling JSON logs into this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two solvers over a stored test group
    Group {
        /// Group name
        name: String,

        /// Solver under evaluation (known name or path)
        #[arg(long, default_value = "approximate")]
        subject: String,

        /// Solver compared against (known name or path)
        #[arg(long, default_value = "naive")]
        reference: String,

        /// Ratio used when the reference returns 0
        #[arg(long, value_enum, default_value = "sentinel")]
        policy: ZeroReferencePolicy,

        /// Parse every group file before starting any solver
        #[arg(long)]
        validate: bool,
    },

    /// Time one solver over a stored test group
    Benchmark {
        /// Group name
        name: String,

        /// Solver to time (known name or path)
        #[arg(long, default_value = "approximate")]
        solver: String,

        /// Parse every group file before starting any solver
        #[arg(long)]
        validate: bool,
    },

    /// Generate and store a new test group
    GenerateGroup {
        /// Group name; an existing group is replaced
        name: String,

        /// Number of instances
        #[arg(long, default_value = "10")]
        count: usize,

        /// Partition count
        #[arg(long)]
        k: usize,

        /// Vertex count
        #[arg(long)]
        n: usize,

        /// Edge probability (triad probability for powerlaw-cluster)
        #[arg(long)]
        p: f64,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Sweep a parameter grid and write a report
    Sweep {
        #[command(flatten)]
        sweep: SweepArgs,
    },

    /// Run the standard batch of small and large sweeps
    Plan,

    /// Print a stored report as labelled tables
    Show {
        /// Report JSON file
        path: PathBuf,

        /// Grid shape the report was produced with
        #[arg(long, value_enum)]
        shape: GridShape,
    },
}

#[derive(Args, Clone, Copy)]
struct ModelArgs {
    /// Random graph model
    #[arg(long, value_enum, default_value = "erdos-renyi")]
    model: GraphModel,

    /// Lower bound of uniform edge weights
    #[arg(long, value_enum, default_value = "from-zero")]
    weights: WeightRange,

    /// Largest edge weight (defaults to the configuration)
    #[arg(long)]
    max_weight: Option<u32>,
}

#[derive(Args)]
struct SweepArgs {
    #[arg(long, value_enum)]
    shape: GridShape,

    /// Edge probability, fixed across the small and large grids
    #[arg(long)]
    p: Option<f64>,

    /// Vertex count, fixed across the density grid
    #[arg(long)]
    n: Option<usize>,

    /// Fresh instances per cell
    #[arg(long, default_value = "200")]
    trials: usize,

    /// Report tag, e.g. 0.2-500
    #[arg(long)]
    tag: String,

    #[arg(long, default_value = "approximate")]
    subject: String,

    #[arg(long, default_value = "naive")]
    reference: String,

    /// Ratio used when the reference returns 0
    #[arg(long, value_enum, default_value = "neutral")]
    policy: ZeroReferencePolicy,

    #[command(flatten)]
    model: ModelArgs,
}

fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(dir) = &cli.tests_dir {
        config.tests_dir = dir.clone();
    }
    if let Some(dir) = &cli.reports_dir {
        config.reports_dir = dir.clone();
    }
    Ok(config)
}

fn sweep_and_report(config: &HarnessConfig, rng: &mut StdRng, args: &SweepArgs) -> Result<()> {
    let subject = config.resolve_solver(&args.subject);
    let reference = config.resolve_solver(&args.reference);
    let generator = args.model.model.generator(args.model.weights);
    let grid = match (args.shape, args.n, args.p) {
        (GridShape::Density, Some(n), _) => SweepGrid::for_shape(args.shape, n, 0.0),
        (GridShape::Density, None, _) => {
            return Err(HarnessError::Config("--n is required for density sweeps".to_string()));
        }
        (shape, _, Some(p)) => SweepGrid::for_shape(shape, 0, p),
        (shape, _, None) => {
            return Err(HarnessError::Config(format!("--p is required for {} sweeps", shape)));
        }
    };
    let sweep_config = SweepConfig {
        trials_count: args.trials,
        max_weight: args.model.max_weight.unwrap_or(config.max_weight),
        policy: args.policy,
    };

    let label = ExperimentLabel::new(args.model.model, args.shape, args.tag.clone());
    info!(report = %label.file_stem(), n = ?args.n, p = ?args.p, "Sweep");

    let matrices = run_sweep(
        &grid,
        generator.as_ref(),
        rng,
        &subject,
        &reference,
        &sweep_config,
    )?;
    let path = ReportStore::new(&config.reports_dir).write(&label, &matrices)?;
    println!("Report written to {}", path.display());
    Ok(())
}

/// Three small sweeps of the approximate solver against the exact one,
/// then three large sweeps of the greedy solver against the approximate one
fn standard_plan() -> Vec<SweepArgs> {
    let model = ModelArgs {
        model: GraphModel::ErdosRenyi,
        weights: WeightRange::FromZero,
        max_weight: None,
    };
    let mut plan = Vec::new();
    for p in [0.2, 0.5, 0.9] {
        plan.push(SweepArgs {
            shape: GridShape::Small,
            p: Some(p),
            n: None,
            trials: 200,
            tag: format!("{}-500", p),
            subject: "approximate".to_string(),
            reference: "naive".to_string(),
            policy: ZeroReferencePolicy::Neutral,
            model,
        });
    }
    for p in [0.2, 0.5, 0.9] {
        plan.push(SweepArgs {
            shape: GridShape::Large,
            p: Some(p),
            n: None,
            trials: 5,
            tag: p.to_string(),
            subject: "greedy".to_string(),
            reference: "approximate".to_string(),
            policy: ZeroReferencePolicy::Neutral,
            model,
        });
    }
    plan
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let mut rng = seeded_rng(config.seed);
    info!(seed = config.seed, "Harness started");

    match cli.command {
        Commands::Group {
            name,
            subject,
            reference,
            policy,
            validate,
        } => {
            let store = TestGroupStore::new(&config.tests_dir).with_validation(validate);
            let subject = config.resolve_solver(&subject);
            let reference = config.resolve_solver(&reference);
            println!("=== Running test group {} ===", name);
            let comparison = run_test_group(&store, &name, &subject, &reference, policy)?;
            println!("Subject:         {}", subject.name());
            println!("Reference:       {}", reference.name());
            println!("{}\n", comparison);
        }
        Commands::Benchmark {
            name,
            solver,
            validate,
        } => {
            let store = TestGroupStore::new(&config.tests_dir).with_validation(validate);
            let solver = config.resolve_solver(&solver);
            println!("=== Running benchmark on group {} ===", name);
            let benchmark = run_benchmark_on_group(&store, &name, &solver)?;
            println!("Solver:          {}", solver.name());
            println!("{}\n", benchmark);
        }
        Commands::GenerateGroup {
            name,
            count,
            k,
            n,
            p,
            model,
        } => {
            let generator = model.model.generator(model.weights);
            let max_weight = model.max_weight.unwrap_or(config.max_weight);
            let tests = (0..count)
                .map(|_| generator.generate(&mut rng, k, n, p, max_weight))
                .collect::<Result<Vec<_>>>()?;
            let dir = TestGroupStore::new(&config.tests_dir).write_group(&name, &tests)?;
            println!("Wrote {} tests to {}", tests.len(), dir.display());
        }
        Commands::Sweep { sweep } => sweep_and_report(&config, &mut rng, &sweep)?,
        Commands::Plan => {
            for args in standard_plan() {
                sweep_and_report(&config, &mut rng, &args)?;
            }
        }
        Commands::Show { path, shape } => {
            let report = GridReport::load(&path, shape)?;
            println!("=== Average ratio ({}) ===", path.display());
            println!("{}\n", report.render_table(false));
            println!("=== Maximum ratio ({}) ===", path.display());
            println!("{}", report.render_table(true));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.log_format, cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to initialise logging: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Harness run aborted");
            ExitCode::FAILURE
        }
    }
}
