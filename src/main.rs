use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use hyppo::independence::{Dcorr, Hsic, IndepTestKind, IndependenceTest, MaxMargin};
use hyppo::input::{load_blocks, load_matrix, load_options, write_table};
use hyppo::ksample::KSampleKind;
use hyppo::report::{NullDistribution, Report};
use hyppo::tools::{Kernel, Metric, Simulation, TestOptions, TestOutput, simulate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multivariate independence and k-sample hypothesis tests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test whether paired samples X and Y are independent
    Indep {
        /// dcorr, hsic, kendall, pearson or spearman
        #[arg(long, default_value = "dcorr")]
        test: String,
        #[arg(short = 'x', value_name = "X_FILE")]
        x: Utf8PathBuf,
        #[arg(short = 'y', value_name = "Y_FILE")]
        y: Utf8PathBuf,
        /// Distance metric for dcorr (euclidean, cityblock, minkowski:3, ...)
        #[arg(long)]
        metric: Option<String>,
        /// Kernel for hsic (gaussian, linear, laplacian, ...)
        #[arg(long)]
        kernel: Option<String>,
        /// Use the biased statistic
        #[arg(long)]
        bias: bool,
        /// Maximum of the test over every pair of dimensions
        #[arg(long)]
        max_margin: bool,
        /// Write the permutation null distribution to this binary file
        #[arg(long, value_name = "FILE")]
        save_null: Option<Utf8PathBuf>,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Test whether two or more samples share a distribution
    Ksample {
        /// energy, disco, mmd, hotelling, manova or ksample:<indep test>
        #[arg(long, default_value = "energy")]
        test: String,
        #[arg(value_name = "SAMPLE_FILE", num_args = 2.., required = true)]
        samples: Vec<Utf8PathBuf>,
        #[arg(long, value_name = "FILE")]
        save_null: Option<Utf8PathBuf>,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Run several independence tests on the same data
    Compare {
        #[arg(short = 'x', value_name = "X_FILE")]
        x: Utf8PathBuf,
        #[arg(short = 'y', value_name = "Y_FILE")]
        y: Utf8PathBuf,
        /// Comma-separated test names; every test when omitted
        #[arg(long, value_delimiter = ',')]
        tests: Vec<String>,
        #[command(flatten)]
        common: CommonOpts,
    },
    /// Draw a simulated dependence and write X and Y tables
    Sim {
        #[arg(long, default_value = "linear")]
        sim: String,
        #[arg(short = 'n', default_value_t = 100)]
        n: usize,
        #[arg(short = 'p', default_value_t = 1)]
        p: usize,
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_name = "FILE")]
        out_x: Utf8PathBuf,
        #[arg(long, value_name = "FILE")]
        out_y: Utf8PathBuf,
    },
}

/// Flags shared by every test subcommand. They override `--config`.
#[derive(Args, Debug)]
struct CommonOpts {
    /// Permutation replications
    #[arg(long)]
    reps: Option<usize>,
    /// Worker threads for permutations (default: all cores)
    #[arg(long)]
    workers: Option<usize>,
    /// Always permute; never use the chi-square shortcut
    #[arg(long)]
    no_auto: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file with test options
    #[arg(long, value_name = "FILE")]
    config: Option<Utf8PathBuf>,
    /// Integer table of exchangeable permutation blocks, one row per sample
    #[arg(long, value_name = "FILE")]
    perm_blocks: Option<Utf8PathBuf>,
}

impl CommonOpts {
    fn options(&self) -> Result<TestOptions> {
        let mut opts = match &self.config {
            Some(path) => load_options(path)?,
            None => TestOptions::default(),
        };
        if let Some(reps) = self.reps {
            opts.reps = reps;
        }
        if let Some(workers) = self.workers {
            opts.workers = Some(workers);
        }
        if self.no_auto {
            opts.auto = false;
        }
        if let Some(seed) = self.seed {
            opts.seed = Some(seed);
        }
        if let Some(path) = &self.perm_blocks {
            opts.perm_blocks = Some(load_blocks(path)?);
        }
        tracing::debug!(?opts, "test options");
        Ok(opts)
    }
}

fn build_indep(
    name: &str,
    metric: Option<&str>,
    kernel: Option<&str>,
    bias: bool,
    max_margin: bool,
) -> Result<Box<dyn IndependenceTest>> {
    let kind: IndepTestKind = name.parse()?;
    let test: Box<dyn IndependenceTest> = match kind {
        IndepTestKind::Dcorr => {
            let metric: Metric = metric.unwrap_or("euclidean").parse()?;
            Box::new(Dcorr::new(metric).with_bias(bias))
        }
        IndepTestKind::Hsic => {
            let kernel: Kernel = kernel.unwrap_or("gaussian").parse()?;
            Box::new(Hsic::new(kernel).with_bias(bias))
        }
        other => other.build(),
    };
    Ok(if max_margin {
        Box::new(MaxMargin::new(test))
    } else {
        test
    })
}

fn save_null(path: Option<&Utf8PathBuf>, test: &str, out: &TestOutput) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    match NullDistribution::from_output(test, out) {
        Some(null) => null
            .save_to_binary(path)
            .with_context(|| format!("Write {}", path))?,
        None => tracing::warn!(test, "no permutation null distribution to save"),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Indep {
            test,
            x,
            y,
            metric,
            kernel,
            bias,
            max_margin,
            save_null: null_path,
            common,
        } => {
            let opts = common.options()?;
            let test = build_indep(
                &test,
                metric.as_deref(),
                kernel.as_deref(),
                bias,
                max_margin,
            )?;
            let (x, y) = (load_matrix(&x)?, load_matrix(&y)?);
            let out = test
                .test(&x, &y, &opts)
                .with_context(|| format!("{} test failed", test.name()))?;
            save_null(null_path.as_ref(), test.name(), &out)?;
            print_json(&out)
        }
        Command::Ksample {
            test,
            samples,
            save_null: null_path,
            common,
        } => {
            let opts = common.options()?;
            let kind: KSampleKind = test.parse()?;
            let test = kind.build();
            let inputs = samples
                .iter()
                .map(|p| load_matrix(p))
                .collect::<Result<Vec<_>>>()?;
            let out = test
                .test(&inputs, &opts)
                .with_context(|| format!("{} test failed", test.name()))?;
            save_null(null_path.as_ref(), test.name(), &out)?;
            print_json(&out)
        }
        Command::Compare {
            x,
            y,
            tests,
            common,
        } => {
            let opts = common.options()?;
            let kinds = if tests.is_empty() {
                IndepTestKind::ALL.to_vec()
            } else {
                tests
                    .iter()
                    .map(|t| t.parse::<IndepTestKind>())
                    .collect::<hyppo::Result<Vec<_>>>()?
            };
            let (x, y) = (load_matrix(&x)?, load_matrix(&y)?);
            print_json(&Report::compare(&x, &y, &kinds, &opts))
        }
        Command::Sim {
            sim,
            n,
            p,
            noise,
            seed,
            out_x,
            out_y,
        } => {
            let sim: Simulation = sim.parse()?;
            let mut rng = match seed {
                Some(s) => ChaCha8Rng::seed_from_u64(s),
                None => ChaCha8Rng::from_entropy(),
            };
            let (x, y) = simulate(sim, n, p, noise, &mut rng)?;
            write_table(&out_x, &x)?;
            write_table(&out_y, &y)?;
            tracing::info!(?sim, n, p, %out_x, %out_y, "simulation written");
            Ok(())
        }
    }
}
