//! glyphmm: train word-level hidden Markov models and generate words from them.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use glyphmm_cli::{generate_words, preview_words, train_epochs, GenerateOptions, TrainOptions};
use glyphmm_hmm::{Alphabet, HmmModel, TrainConfig};
use glyphmm_io::{load_model, read_corpus, save_model};

#[derive(Parser)]
#[command(name = "glyphmm")]
#[command(version)]
#[command(
    about = "Train hidden Markov models on word lists and generate new words",
    long_about = None
)]
struct Cli {
    /// Log every word as it is trained
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh model
    Init {
        /// Number of hidden states
        #[arg(short = 'n', long)]
        states: usize,

        /// Alphabet, one char per symbol (include the stop symbol)
        #[arg(short, long)]
        alphabet: String,

        /// Output model file
        #[arg(short, long, env = "GLYPHMM_MODEL")]
        output: PathBuf,

        /// RNG seed for the initial distribution
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Train a model on a word list
    Train {
        /// Model file, updated in place
        #[arg(short, long, env = "GLYPHMM_MODEL")]
        model: PathBuf,

        /// Word list, one word per line, '#' starts a comment line
        #[arg(short, long)]
        corpus: PathBuf,

        /// Passes over the corpus
        #[arg(short, long, default_value = "10")]
        epochs: usize,

        /// Learning rate in (0, 1]
        #[arg(short, long, default_value = "0.0005")]
        rate: f64,

        /// Stop symbol appended to every word
        #[arg(long, default_value = "$")]
        stop: char,

        /// Rescale every row to sum to 1 after each update
        #[arg(long)]
        renormalize: bool,

        /// Warn and continue on words the model rejects
        #[arg(long)]
        skip_invalid: bool,

        /// Print this many sample words after training
        #[arg(long, default_value = "0")]
        preview: usize,

        /// RNG seed for corpus shuffling and preview sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate words from a model
    Generate {
        /// Model file
        #[arg(short, long, env = "GLYPHMM_MODEL")]
        model: PathBuf,

        /// Number of words
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Stop symbol
        #[arg(long, default_value = "$")]
        stop: char,

        /// Minimum word length
        #[arg(long, default_value = "4")]
        min_len: usize,

        /// Add a random 0..len-jitter to each word's minimum length
        #[arg(long, default_value = "4")]
        len_jitter: usize,

        /// Minimum geometric-mean per-symbol likelihood, in [0, 1)
        #[arg(short, long, default_value = "0.09")]
        quality: f64,

        /// Give up on a word after this many samples below the quality threshold
        #[arg(long)]
        max_attempts: Option<usize>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the likelihood of words under a model
    Score {
        /// Model file
        #[arg(short, long, env = "GLYPHMM_MODEL")]
        model: PathBuf,

        /// Words to score, scored as given (append the stop symbol yourself)
        #[arg(required = true)]
        words: Vec<String>,
    },
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init {
            states,
            alphabet,
            output,
            seed,
        } => {
            let alphabet = Alphabet::from_chars(&alphabet).context("invalid alphabet")?;
            let model = HmmModel::random(states, alphabet, &mut rng_from(seed))?;
            save_model(&output, &model)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), states, "created model");
        }

        Commands::Train {
            model: path,
            corpus,
            epochs,
            rate,
            stop,
            renormalize,
            skip_invalid,
            preview,
            seed,
        } => {
            let mut model = load_model(&path)
                .with_context(|| format!("failed to load model {}", path.display()))?;
            if !model.alphabet().contains(stop) {
                bail!("stop symbol {:?} is not in the model alphabet", stop);
            }
            let mut words = read_corpus(&corpus, stop)
                .with_context(|| format!("failed to read corpus {}", corpus.display()))?;
            info!(words = words.len(), epochs, rate, "loaded corpus");

            let opts = TrainOptions {
                epochs,
                config: TrainConfig { rate, renormalize },
                skip_invalid,
            };
            let mut rng = rng_from(seed);
            let summary = train_epochs(&mut model, &mut words, &opts, &mut rng)?;
            info!(trained = summary.trained, skipped = summary.skipped, "training finished");

            save_model(&path, &model)
                .with_context(|| format!("failed to write {}", path.display()))?;

            if preview > 0 {
                let samples = preview_words(&model, preview, stop, &mut rng)
                    .context("failed to sample preview words")?;
                println!("{}", samples.join(" "));
            }
        }

        Commands::Generate {
            model: path,
            count,
            stop,
            min_len,
            len_jitter,
            quality,
            max_attempts,
            seed,
        } => {
            let model = load_model(&path)
                .with_context(|| format!("failed to load model {}", path.display()))?;
            let opts = GenerateOptions {
                count,
                stop,
                min_len,
                len_jitter,
                quality,
                max_attempts,
            };
            let words = generate_words(&model, &opts, &mut rng_from(seed))?;
            println!("{}", words.join(" "));
        }

        Commands::Score { model: path, words } => {
            let model = load_model(&path)
                .with_context(|| format!("failed to load model {}", path.display()))?;
            for word in &words {
                let p = model
                    .evaluate(word)
                    .with_context(|| format!("cannot score {word:?}"))?;
                let q = model.quality(word)?;
                println!("{word}\t{p:e}\t{q:.6}");
            }
        }
    }

    Ok(())
}
