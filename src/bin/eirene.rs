use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, info};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use eirene::core::{Config, DebateConfig};
use eirene::features::characters::{CharacterCreator, CharacterRegistry, CharacterStore};
use eirene::features::debate::{DebateOrchestrator, DebateRequest};
use eirene::features::generation::{Debator, OpenAiBackend};

/// Eirene - turn-based debates between two language-model characters
#[derive(Parser, Debug)]
#[command(name = "eirene")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available characters
    Characters,

    /// Run a debate between two existing characters
    Debate {
        /// The debate topic
        #[arg(short, long)]
        topic: String,

        /// Character who speaks first
        #[arg(short = 'a', long)]
        character_a: String,

        /// Character who speaks second
        #[arg(short = 'b', long)]
        character_b: String,

        /// Round budget (defaults to debate_rounds_count from the debate config)
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Send the full history every turn instead of keeping per-character memory
        #[arg(long)]
        no_memory: bool,
    },

    /// Create a character from a description and debate it against an existing one
    Create {
        /// Free-text description of the new character
        #[arg(short, long)]
        description: String,

        /// Existing opponent character
        #[arg(short, long)]
        opponent: String,

        /// The debate topic
        #[arg(short, long)]
        topic: String,

        #[arg(short, long, default_value_t = 3)]
        rounds: u32,
    },
}

fn init_logging(level: &str, log_path: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Some(path) = log_path {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn load_store(dump_path: Option<&Path>) -> Result<Arc<CharacterStore>> {
    let store = CharacterStore::with_builtins();
    if let Some(dir) = dump_path {
        store.load_dir(dir)?;
    }
    Ok(Arc::new(store))
}

/// Cancel the debate on Ctrl-C; the partial transcript is still printed
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current turn");
            signal_token.cancel();
        }
    });
    token
}

/// Everything a debate needs, built from the environment and the debate file
struct App {
    config: Config,
    store: Arc<CharacterStore>,
    debator: Arc<Debator>,
    orchestrator: DebateOrchestrator,
}

impl App {
    fn load() -> Result<Self> {
        let config = Config::from_env()?;

        // The openai crate reads its key from the environment
        std::env::set_var("OPENAI_API_KEY", &config.openai_api_key);
        std::env::set_var("OPENAI_KEY", &config.openai_api_key);

        init_logging(&config.log_level, config.log_path.as_deref())?;
        info!("Starting Eirene with model {}", config.openai_model);

        let debate_config = DebateConfig::load(&config.debate_config_path)?;
        let store = load_store(config.character_dump_path.as_deref())?;

        let backend = OpenAiBackend::new(config.openai_model.clone())
            .with_temperature(config.temperature)
            .with_timeout(Duration::from_secs(config.request_timeout_secs));
        let debator = Arc::new(Debator::new(Arc::new(backend)));
        let orchestrator = DebateOrchestrator::new(store.clone(), debator.clone(), debate_config)?;

        Ok(Self {
            config,
            store,
            debator,
            orchestrator,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Characters => {
            let dump_path = std::env::var("CHARACTER_DUMP_PATH").ok();
            let store = load_store(dump_path.as_deref().map(Path::new))?;
            for name in store.character_names() {
                println!("{name}");
            }
            return Ok(());
        }
        Commands::Debate {
            topic,
            character_a,
            character_b,
            rounds,
            no_memory,
        } => {
            let app = App::load()?;
            let mut request =
                DebateRequest::new(&topic, &character_a, &character_b).with_memory(!no_memory);
            request.rounds = rounds;
            app.orchestrator
                .start_debate_with_cancel(request, cancel_on_ctrl_c())
                .await
        }
        Commands::Create {
            description,
            opponent,
            topic,
            rounds,
        } => {
            let app = App::load()?;
            let mut creator = CharacterCreator::new(
                app.debator.clone(),
                app.store.clone(),
                app.orchestrator.config().character_creation_prompt(),
            );
            if let Some(dir) = &app.config.character_dump_path {
                creator = creator.with_dump_dir(dir);
            }
            app.orchestrator
                .create_character_and_debate(&creator, &description, &opponent, &topic, rounds)
                .await
        }
    };

    match outcome {
        Ok(outcome) => {
            println!("{}", outcome.transcript);
            Ok(())
        }
        Err(e) => {
            error!("Debate failed: {e}");
            Err(e.into())
        }
    }
}
