//! Command-line runner: multiply two random n×n matrices once and time it.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use quadmul::logging::init_subscriber;
use quadmul::matrix::dense::{matmul_reference, max_relative_error};
use quadmul::{BaseKernel, QuadMatrix, RunConfig};
use tracing::info;

/// Largest relative error `--verify` accepts against the triple-loop product.
const VERIFY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Parser)]
#[command(version, about = "Recursive quad-tree matrix multiplication")]
struct Args {
    /// Matrix dimension n (must halve evenly down to the block size)
    size: usize,

    /// Block threshold: quadrants at or below this size use the dense kernel
    block: usize,

    /// Worker threads (default: RAYON_NUM_THREADS or the number of CPUs)
    threads: Option<usize>,

    /// Base-case kernel
    #[arg(long, value_enum, default_value_t = BaseKernel::Auto)]
    kernel: BaseKernel,

    /// Seed for the random input matrices
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the result matrix (default: res_mm_recursive_<SIZE>)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Skip writing the result matrix
    #[arg(long, conflicts_with = "output")]
    no_output: bool,

    /// Check the result against the naive triple-loop product
    #[arg(long)]
    verify: bool,
}

impl Args {
    fn config(&self) -> RunConfig {
        RunConfig {
            size: self.size,
            block: self.block,
            threads: self.threads,
            kernel: self.kernel,
            seed: self.seed,
        }
    }

    fn output_path(&self) -> Option<PathBuf> {
        if self.no_output {
            return None;
        }
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("res_mm_recursive_{}", self.size))),
        )
    }
}

fn main() -> anyhow::Result<()> {
    init_subscriber();
    let args = Args::parse();

    let config = args.config();
    let layout = config.validate().context("invalid configuration")?;
    let engine = config.engine()?;
    let scheduler = config.scheduler()?;

    let mut rng = config.rng();
    let mut a = QuadMatrix::zeros(layout)?;
    let mut b = QuadMatrix::zeros(layout)?;
    let mut c = QuadMatrix::zeros(layout)?;
    let mut d = QuadMatrix::zeros(layout)?;
    a.fill_random(&mut rng);
    b.fill_random(&mut rng);

    let start = Instant::now();
    scheduler.install(|| engine.multiply_with_scratch(&a, &b, &mut c, &mut d))?;
    let elapsed = start.elapsed().as_secs_f64();
    drop(d);

    info!(
        threads = scheduler.num_threads(),
        kernel = %engine.kernel(),
        depth = layout.depth(),
        "Recursive Size {} Block {} Time {:.6}",
        config.size,
        config.block,
        elapsed
    );

    if args.verify {
        verify(&a, &b, &c)?;
    }

    if let Some(path) = args.output_path() {
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        c.write_text(BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "result written");
    }

    Ok(())
}

fn verify(a: &QuadMatrix, b: &QuadMatrix, c: &QuadMatrix) -> anyhow::Result<()> {
    let n = a.size();
    let mut expected = vec![0.0; n * n];
    matmul_reference(&a.to_dense(), &b.to_dense(), &mut expected, n);

    let error = max_relative_error(&expected, &c.to_dense());
    if error >= VERIFY_TOLERANCE {
        bail!("verification failed: max relative error {:e}", error);
    }
    info!(max_relative_error = error, "verification passed");
    Ok(())
}
