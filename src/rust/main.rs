use clap::{Parser, Subcommand};
use log::info;
use moodlens::{
    AnalyzerConfig, BuiltinModel, Classifier, ModelManager, MoodAnalyzer, ServerConfig,
    DEFAULT_MAX_CHUNK_CHARS,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding downloaded models
    /// (defaults to $MOODLENS_CACHE/models or the user cache dir)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// Force a fresh download of the model files
    #[arg(short, long, global = true)]
    fresh: bool,

    /// Override the ONNX model download URL
    #[arg(long, global = true)]
    model_url: Option<String>,

    /// Override the tokenizer download URL
    #[arg(long, global = true)]
    tokenizer_url: Option<String>,

    /// Load a local ONNX export instead of downloading one
    #[arg(long, global = true, requires = "tokenizer_file")]
    model_file: Option<PathBuf>,

    /// Tokenizer file to pair with --model-file
    #[arg(long, global = true, requires = "model_file")]
    tokenizer_file: Option<PathBuf>,

    /// Maximum characters per classifier chunk
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    max_chunk_chars: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value_t = 5000)]
        port: u16,

        /// Request timeout in seconds, 0 to disable
        #[arg(long, default_value_t = 0)]
        timeout_secs: u64,

        /// Disable permissive CORS headers
        #[arg(long)]
        no_cors: bool,
    },
    /// Analyze a single text and print the result as JSON
    Analyze {
        text: String,
    },
}

async fn load_classifier(args: &Args) -> anyhow::Result<Classifier> {
    let model = BuiltinModel::DistilBertEmotion;
    if let (Some(model_file), Some(tokenizer_file)) = (&args.model_file, &args.tokenizer_file) {
        info!("Loading model from {}", model_file.display());
        let builder = Classifier::builder().with_model_files(model, model_file, tokenizer_file)?;
        return Ok(builder.build()?);
    }

    let manager = match &args.model_dir {
        Some(dir) => ModelManager::new(dir)?,
        None => ModelManager::new_default()?,
    };
    let mut info = model.get_model_info();
    if let Some(url) = &args.model_url {
        info.model_url = url.clone();
    }
    if let Some(url) = &args.tokenizer_url {
        info.tokenizer_url = url.clone();
    }

    if args.fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(&info.name)?;
    }
    manager.ensure_model_downloaded(&info).await?;

    Ok(Classifier::builder().with_model_from(&manager, model)?.build()?)
}

async fn load_analyzer(args: &Args) -> anyhow::Result<MoodAnalyzer> {
    let start = Instant::now();
    let classifier = load_classifier(args).await?;
    info!(
        "Classifier ready with labels {:?} (took {:.2?})",
        classifier.info().labels,
        start.elapsed()
    );

    let config = AnalyzerConfig {
        max_chunk_chars: args.max_chunk_chars,
    };
    Ok(MoodAnalyzer::new(Arc::new(classifier), config)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    moodlens::init_logger();
    let args = Args::parse();

    let analyzer = load_analyzer(&args).await?;

    match args.command {
        Some(Command::Analyze { text }) => {
            let summary = analyzer.analyze_text(&text)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Some(Command::Serve { host, port, timeout_secs, no_cors }) => {
            let config = ServerConfig {
                host,
                port,
                timeout_secs,
                enable_cors: !no_cors,
            };
            moodlens::start_server(config, analyzer).await?;
        }
        None => moodlens::start_server(ServerConfig::default(), analyzer).await?,
    }

    Ok(())
}
