use std::io::{self, Read};
use std::path::PathBuf;

use chat_core::{codec, Temperature};
use clap::{Parser, Subcommand};
use database::HistoryRecord;
use dispatcher::{Dispatcher, DispatcherConfig};
use llm_desk::{
    init_logging, open_store, AppConfig, AppError, ProviderSet, Session, DEFAULT_HISTORY_LIMIT,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "llm-desk")]
#[command(about = "Send prompts to several LLM providers and keep a searchable history")]
struct Args {
    /// History database file
    #[arg(long, env = "LLM_DESK_DB", default_value = llm_desk::DEFAULT_DB_FILE)]
    db: PathBuf,

    /// Config file with model keys and prompt templates
    #[arg(long, env = "LLM_DESK_CONFIG", default_value = llm_desk::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Concurrent provider calls
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Directory for the rolling log file
    #[arg(long, default_value = llm_desk::logging::DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available model keys
    Models,

    /// List prompt templates
    Prompts,

    /// Send a prompt to one or more models
    Send {
        /// Model key (repeat to fan out)
        #[arg(short, long = "model", required = true)]
        models: Vec<String>,

        /// Temperature on the 0-10 scale
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=10))]
        temperature: u8,

        /// Prompt template placed before the text
        #[arg(long)]
        template: Option<String>,

        /// Prompt text; read from stdin when omitted
        text: Option<String>,
    },

    /// Browse stored exchanges
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    /// Most recent exchanges
    List {
        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: i64,
    },
    /// Exchanges containing every word of the query
    Search { query: Vec<String> },
    /// Print one exchange
    Show { id: i64 },
    /// Delete one exchange
    Delete { id: i64 },
    /// Delete every exchange
    Clear,
    /// Print the prompt that continues an exchange
    Continue { id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let _log_guard = init_logging((!args.no_log_file).then_some(args.log_dir.as_path()));

    let config = AppConfig::load(&args.config)?;
    let providers = ProviderSet::from_env();
    let table = providers.model_table(&config);

    let (dispatcher, results) = Dispatcher::new(table, DispatcherConfig::with_workers(args.workers))?;
    let store = open_store(&args.db).await;
    let mut session = Session::new(dispatcher, results, store);

    let outcome = run(&mut session, &config, &providers, args.command).await;
    session.close().await;
    outcome?;
    Ok(())
}

async fn run(
    session: &mut Session,
    config: &AppConfig,
    providers: &ProviderSet,
    command: Command,
) -> Result<(), AppError> {
    match command {
        Command::Models => {
            for warning in providers.warnings() {
                eprintln!("warning: {}", warning);
            }
            if session.models().is_empty() {
                eprintln!("No models available. Set provider API keys and check the config file.");
            }
            for (key, route) in session.models().iter() {
                println!("{}\t{}\t{}", key, route.model_id, route.backend.name());
            }
        }
        Command::Prompts => {
            for (name, text) in &config.prompts {
                println!("{}\t{}", name, text);
            }
        }
        Command::Send {
            models,
            temperature,
            template,
            text,
        } => {
            let body = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let prompt = match template {
                Some(name) => {
                    let template = config
                        .prompt(&name)
                        .ok_or_else(|| AppError::UnknownPrompt(name.clone()))?;
                    codec::with_template(template, &body)
                }
                None => body,
            };

            let temperature = Temperature::new(temperature);
            let mut pending = session.submit_all(&prompt, &models, temperature)?;

            while pending > 0 {
                let Some(done) = session.next_result().await else {
                    break;
                };
                pending -= 1;
                let id = done
                    .record
                    .as_ref()
                    .map(|r| format!(" #{}", r.id))
                    .unwrap_or_default();
                println!(
                    "=== {}{} [{}] ===\n{}\n",
                    done.envelope.model, id, done.envelope.datetime, done.envelope.response
                );
            }
            info!("{}", session.status_text());
        }
        Command::History(command) => history(session, command).await?,
    }
    Ok(())
}

async fn history(session: &mut Session, command: HistoryCommand) -> Result<(), AppError> {
    if !session.has_history() {
        eprintln!("warning: history database unavailable");
    }

    match command {
        HistoryCommand::List { limit } => print_rows(&session.recent(limit).await),
        HistoryCommand::Search { query } => print_rows(&session.search(&query.join(" ")).await),
        HistoryCommand::Show { id } => {
            let record = session.select(id).await.ok_or(AppError::NotFound(id))?;
            println!(
                "#{} {} [{}] temperature={}",
                record.id,
                record.model,
                record.datetime,
                record
                    .temperature
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("--- prompt ---\n{}", record.prompt);
            println!("--- response ---\n{}", record.response);
        }
        HistoryCommand::Delete { id } => session.delete(id).await,
        HistoryCommand::Clear => {
            let removed = session.clear().await;
            println!("Deleted {} item(s)", removed);
        }
        HistoryCommand::Continue { id } => {
            let text = session.continuation(id).await.ok_or(AppError::NotFound(id))?;
            print!("{}", text);
        }
    }
    Ok(())
}

fn print_rows(rows: &[HistoryRecord]) {
    for row in rows {
        let preview: String = row
            .prompt
            .lines()
            .find(|line| !line.trim().is_empty() && !codec::is_delimiter_line(line))
            .unwrap_or_default()
            .chars()
            .take(60)
            .collect();
        println!("{}\t{}\t{}\t{}", row.id, row.datetime, row.model, preview);
    }
}
