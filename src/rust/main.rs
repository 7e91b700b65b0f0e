use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tokenstat::{init_logger, FileStore, PretrainedTokenizer, StatisticalClassifier};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding model files (defaults to $TOKENSTAT_HOME/models or the platform data dir)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Additive smoothing constant used for scoring
    #[arg(long, global = true, default_value_t = 1.0)]
    smoothing: f64,

    /// Use a HuggingFace tokenizer.json instead of the built-in word tokenizer.
    /// Models do not record their tokenizer: pass the same file to every
    /// train and classify call for a model, for its whole lifetime.
    #[arg(long, global = true)]
    tokenizer: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new, empty model
    Create {
        name: String,
        /// Number of classes
        #[arg(short, long, default_value_t = 2)]
        classes: usize,
    },
    /// Train a model on one or more texts of the same class
    Train {
        name: String,
        /// Class index of the texts
        #[arg(short, long)]
        class: usize,
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Classify a text and print the posterior of every class
    Classify { name: String, text: String },
    /// Show a model's statistics
    Info { name: String },
    /// Check whether a model exists
    Exists { name: String },
    /// List all models in the store
    List,
    /// Delete a model
    Remove { name: String },
}

fn open_store(path: Option<PathBuf>) -> Result<Arc<FileStore>> {
    let store = match path {
        Some(path) => FileStore::new(&path).with_context(|| format!("Failed to open store at {:?}", path))?,
        None => FileStore::new_default().context("Failed to open default store")?,
    };
    info!("Using model store at {:?}", store.models_dir());
    Ok(Arc::new(store))
}

fn open_classifier(args: &Args, store: Arc<FileStore>, name: &str) -> Result<StatisticalClassifier> {
    let mut builder = StatisticalClassifier::builder()
        .with_store(store)
        .with_smoothing(args.smoothing);
    if let Some(path) = &args.tokenizer {
        builder = builder.with_tokenizer(PretrainedTokenizer::from_file(path)?);
    }
    Ok(builder.load(name)?)
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let store = open_store(args.store.clone())?;
    let start_time = Instant::now();

    match &args.command {
        Command::Create { name, classes } => {
            let classifier = StatisticalClassifier::create(store, name, *classes)?;
            println!("{}", classifier);
        }
        Command::Train { name, class, texts } => {
            let mut classifier = open_classifier(&args, store, name)?;
            classifier.train_batch(texts.iter().map(|text| (text.as_str(), *class)))?;
            classifier.flush()?;
            info!("Trained on {} texts in {:.2?}", texts.len(), start_time.elapsed());
            println!("{}", classifier);
        }
        Command::Classify { name, text } => {
            let classifier = open_classifier(&args, store, name)?;
            let (class, posteriors) = classifier.predict(text)?;
            println!("Predicted class: {}", class);
            for (i, p) in posteriors.iter().enumerate() {
                println!("  {}: {:.1}%", i, p * 100.0);
            }
        }
        Command::Info { name } => {
            let classifier = open_classifier(&args, store, name)?;
            let info = classifier.info();
            println!("{}", classifier);
            println!("  Vocabulary size: {}", info.vocabulary_size);
            for (i, (docs, tokens)) in info.class_documents.iter().zip(&info.class_tokens).enumerate() {
                println!("  Class {}: {} texts, {} tokens", i, docs, tokens);
            }
        }
        Command::Exists { name } => {
            let exists = StatisticalClassifier::exists(&*store, name)?;
            println!("{}", exists);
            if !exists {
                std::process::exit(1);
            }
        }
        Command::List => {
            for name in store.list()? {
                println!("{}", name);
            }
        }
        Command::Remove { name } => {
            if !store.remove(name)? {
                bail!("Model '{}' not found", name);
            }
            println!("Removed {}", name);
        }
    }

    Ok(())
}
