use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::error;
use xi_forecast_data::{
    constants::{defaults, files::DATA_PATH, synth::TIME_STEPS},
    data::{save_record, synthetic_record},
    ContiguousSets, GeneratorConfig, Result, Split, XiGenerator,
};

#[derive(Parser)]
#[command(name = "xi-data")]
#[command(about = "Train/val/test batches of Xi trajectories for recurrent forecasting", long_about = None)]
struct Cli {
    /// Folder holding the Xi_<r>.bin records
    #[arg(long, global = true, default_value = DATA_PATH)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic record in place of the reduction stage output
    Synth {
        #[arg(short, long, default_value_t = defaults::RANK)]
        r: usize,

        #[arg(long, default_value_t = TIME_STEPS)]
        steps: usize,

        #[arg(long, default_value_t = defaults::SEED)]
        seed: u64,
    },
    /// Load a record and report the split and epoch sizes
    Inspect {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Draw a few train batches and one test batch
    Sample {
        #[command(flatten)]
        config: ConfigArgs,

        #[arg(short = 'k', long, default_value_t = 3)]
        batches: usize,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML file with generator settings, flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    r: Option<usize>,

    #[arg(long)]
    n_steps: Option<usize>,

    #[arg(short, long)]
    batch_size: Option<usize>,

    #[arg(long)]
    m_hist: Option<usize>,

    #[arg(long)]
    stride: Option<usize>,

    #[arg(long)]
    train_frac: Option<f64>,

    #[arg(long)]
    val_frac: Option<f64>,

    #[arg(long, value_enum)]
    contiguous_sets: Option<ContiguousSets>,

    #[arg(long, default_value_t = false)]
    return_q: bool,

    #[arg(long)]
    seed: Option<u64>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_toml_file(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(r) = self.r {
            config.r = r;
        }
        if let Some(n_steps) = self.n_steps {
            config.n_steps = n_steps;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(m_hist) = self.m_hist {
            config.m_hist = m_hist;
        }
        if let Some(stride) = self.stride {
            config.stride = stride;
        }
        if let Some(train_frac) = self.train_frac {
            config.train_frac = train_frac;
        }
        if let Some(val_frac) = self.val_frac {
            config.val_frac = val_frac;
        }
        if let Some(contiguous_sets) = self.contiguous_sets {
            config.contiguous_sets = contiguous_sets;
        }
        if self.return_q {
            config.return_q = true;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("{}", "Start".green());

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Synth { r, steps, seed } => synth(&cli, *r, *steps, *seed),
        Commands::Inspect { config } => inspect(&cli, config),
        Commands::Sample { config, batches } => sample(&cli, config, *batches),
    };

    match result {
        Ok(()) => {
            println!("{}", "End".green());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            println!("{}", "Failed".red());
            ExitCode::FAILURE
        }
    }
}

fn synth(cli: &Cli, r: usize, steps: usize, seed: u64) -> Result<()> {
    let record = synthetic_record(r, steps, seed);
    let path = save_record(&cli.data_dir, &record)?;

    println!("wrote {} steps of rank {r} to {}", steps, path.display());
    Ok(())
}

fn inspect(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let generator = XiGenerator::new(args.resolve()?, &cli.data_dir)?;
    let config = generator.config();
    let data = generator.data();

    println!(
        "{} {} time steps x {} coefficients",
        "Xi".bold(),
        data.time_steps(),
        data.rank()
    );
    println!(
        "valid samples m={} (history {} x stride {}, horizon {})",
        generator.valid_samples(),
        config.m_hist,
        config.stride,
        config.n_steps
    );

    let (train_batches, val_batches, test_batches) = generator.batches_per_epoch();
    for (split, batches) in Split::ALL
        .into_iter()
        .zip([train_batches, val_batches, test_batches])
    {
        let indices = generator.splits().get(split);
        let first = indices.iter().min().map(|&i| data.time()[i]);
        let last = indices.iter().max().map(|&i| data.time()[i]);
        println!(
            "{:>5}: {:>7} samples, {:>5} batches of {}, t in {:?}..{:?}",
            split.name().cyan(),
            indices.len(),
            batches,
            config.batch_size,
            first,
            last
        );
    }

    Ok(())
}

fn sample(cli: &Cli, args: &ConfigArgs, batches: usize) -> Result<()> {
    let mut generator = XiGenerator::new(args.resolve()?, &cli.data_dir)?;

    for i in 0..batches {
        let batch = generator.next_train();
        println!(
            "train batch {i}: history {:?} forecast {:?} q {:?}",
            batch.history.shape(),
            batch.forecast.shape(),
            batch.q_forecast.as_ref().map(|q| q.shape().to_vec())
        );
    }

    let batch = generator.next_test(true);
    let indices = batch.indices.unwrap_or_default();
    println!(
        "test batch: history {:?} forecast {:?}",
        batch.history.shape(),
        batch.forecast.shape()
    );
    let times = generator.times_at(&indices).unwrap_or_default();
    for (index, time) in indices.iter().zip(times).take(10) {
        println!("  sample {index} at t={time}");
    }

    Ok(())
}
