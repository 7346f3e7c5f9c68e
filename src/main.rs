use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use hanyu_recap::{Command, Config, ScanPlan};

#[derive(Parser, Debug)]
#[command(
    name = "hanyu-recap",
    version,
    about = "Turn Chinese study notes into translated, romanized review sheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<CliCommand>,

    /// Translation API key (overrides environment variables)
    #[arg(short = 'k', long = "key", global = true)]
    key: Option<String>,

    /// Model name for LLM-backed translation
    #[arg(short = 'm', long = "model", global = true)]
    model: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings", global = true)]
    read_settings: Option<String>,

    /// Answer yes to the review confirmation prompt
    #[arg(short = 'y', long = "yes", global = true)]
    yes: bool,

    /// Enable verbose logging
    #[arg(long = "verbose", global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Annotate a document into sentence and keyword record sets
    Annotate {
        /// Document id (omit to start a blank document)
        #[arg(short = 'd', long = "doc-id")]
        doc_id: Option<String>,
    },
    /// Recompute the pinyin column of a record set
    RegeneratePinyin { record_set_id: String },
    /// Collect every row of every record set into a review set
    ReviewAll,
    /// Collect a few random rows per section into a review set
    ReviewCount {
        /// Rows per section (default from settings)
        #[arg(short = 'n', long = "per-section")]
        per_section: Option<usize>,
    },
    /// Shuffle one record set into a review set
    ReviewFrom {
        record_set_id: String,
        /// Keep only the first COUNT shuffled rows
        #[arg(short = 'c', long = "count")]
        count: Option<usize>,
    },
    /// Show recent annotation runs
    ShowHistories,
    /// Numbered interactive menu
    Menu,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    hanyu_recap::logging::init(cli.verbose)?;

    let config = Config {
        settings_path: cli.read_settings.clone(),
        key: cli.key.clone(),
        model: cli.model.clone(),
        confirm: confirm_on_stdin,
        assume_yes: cli.yes,
    };

    let command = match cli.command {
        None | Some(CliCommand::Menu) => return run_menu(config).await,
        Some(CliCommand::Annotate { doc_id }) => Command::Annotate {
            document_id: doc_id,
        },
        Some(CliCommand::RegeneratePinyin { record_set_id }) => {
            Command::RegeneratePinyin { record_set_id }
        }
        Some(CliCommand::ReviewAll) => Command::ReviewAll,
        Some(CliCommand::ReviewCount { per_section }) => Command::ReviewCount { per_section },
        Some(CliCommand::ReviewFrom {
            record_set_id,
            count,
        }) => Command::ReviewFrom {
            record_set_id,
            count,
        },
        Some(CliCommand::ShowHistories) => Command::ShowHistories,
    };

    let output = hanyu_recap::run(config, command).await?;
    println!("{}", output);
    Ok(())
}

async fn run_menu(config: Config) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print_menu();
        let Some(choice) = prompt(&stdin, &mut line, "> ")? else {
            break;
        };
        let command = match choice.as_str() {
            "1" => {
                let Some(id) = prompt(&stdin, &mut line, "document id (empty for a new one): ")?
                else {
                    break;
                };
                Command::Annotate {
                    document_id: Some(id).filter(|id| !id.is_empty()),
                }
            }
            "2" => {
                let Some(id) = prompt(&stdin, &mut line, "record set id: ")? else {
                    break;
                };
                if id.is_empty() {
                    println!("a record set id is required");
                    continue;
                }
                Command::RegeneratePinyin { record_set_id: id }
            }
            "3" => Command::ReviewAll,
            "4" => Command::ReviewCount { per_section: None },
            "5" | "q" | "quit" | "exit" => break,
            "" => continue,
            other => {
                println!("unknown option: {}", other);
                continue;
            }
        };

        // A failed operation reports and returns to the menu.
        match hanyu_recap::run(config.clone(), command).await {
            Ok(output) => println!("{}", output),
            Err(err) => eprintln!("error: {:#}", err),
        }
    }
    Ok(())
}

fn print_menu() {
    println!();
    println!("1) annotate a document");
    println!("2) regenerate pinyin for a record set");
    println!("3) build a review set from all rows");
    println!("4) build a review set from a few rows per section");
    println!("5) quit");
}

fn prompt(stdin: &io::Stdin, line: &mut String, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;
    line.clear();
    if stdin.lock().read_line(line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn confirm_on_stdin(plan: &ScanPlan) -> bool {
    print!(
        "scan {} record sets ({})? [y/N] ",
        plan.record_sets,
        plan.mode.describe()
    );
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
