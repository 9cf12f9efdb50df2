//! Command line front end: download a file, browse the history, manage settings.
//!
//! ```text
//! cargo run --example pdl -- get https://example.com/file.iso -t 8 -H "Referer: https://example.com"
//! cargo run --example pdl -- history 2
//! cargo run --example pdl -- settings --reset
//! ```

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use console::style;
use pdl::{
    parse_header, DownloaderBuilder, HistoryStatus, HistoryStore, Settings, Verdict,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pdl", about = "Parallel ranged HTTP downloader")]
struct Cli {
    /// Settings file.
    #[arg(long, default_value = "settings.toml", global = true)]
    settings: PathBuf,

    /// History database.
    #[arg(long, default_value = "data/history.db", global = true)]
    history: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download a file.
    Get {
        url: String,
        /// Extra request header, as `Key: Value`. Repeatable.
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Download directory, overriding the settings.
        #[arg(short, long)]
        root: Option<PathBuf>,
        /// Number of parallel partitions, overriding the settings.
        #[arg(short, long)]
        threads: Option<usize>,
        /// Attempts per partition, overriding the settings.
        #[arg(long)]
        retry: Option<u32>,
        /// Write chunks as they arrive instead of once per partition.
        #[arg(long)]
        streaming: bool,
    },
    /// Show one page of the download history.
    History {
        #[arg(default_value_t = 1)]
        page: u64,
        /// Delete every record.
        #[arg(long)]
        clear: bool,
    },
    /// Show the settings, or reset them to the defaults.
    Settings {
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Get {
            url,
            headers,
            root,
            threads,
            retry,
            streaming,
        } => {
            let mut settings = Settings::load_or_default(&cli.settings)?;
            if let Some(root) = root {
                settings.download_dir = root;
            }
            if let Some(threads) = threads {
                settings.worker_count = threads;
            }
            if let Some(retry) = retry {
                settings.retry_count = retry;
            }

            let mut task = settings.task(&url)?;
            for line in &headers {
                let (name, value) = parse_header(line)?;
                task = task.header(name, value);
            }

            let history = Arc::new(HistoryStore::open(&cli.history)?);
            let mut builder = DownloaderBuilder::new().history(history);
            if streaming {
                builder = builder.write_mode(pdl::WriteMode::Streaming);
            }
            let summary = builder.build().download(&task).await?;

            let verdict = match summary.verdict() {
                Verdict::Match => style("MD5 verified").green(),
                Verdict::Mismatch => style("MD5 mismatch").red(),
                Verdict::Unknown => style("no checksum provided").yellow(),
            };
            println!(
                "{} {} in {:.1?} ({})",
                style("Saved").green().bold(),
                summary.task().destination.display(),
                summary.elapsed(),
                verdict
            );
        }
        Command::History { page, clear } => {
            let history = HistoryStore::open(&cli.history)?;
            if clear {
                let deleted = history.clear()?;
                println!("Deleted {} record(s)", deleted);
                return Ok(());
            }
            if history.count()? == 0 {
                println!("{}", style("No downloads yet").dim());
                return Ok(());
            }

            let records = history.page(page)?;
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec![
                "ID", "File", "Status", "Started", "Finished", "Size", "URL",
            ]);
            for record in records {
                let status = match record.status {
                    HistoryStatus::Ok => Cell::new("ok").fg(Color::Green),
                    HistoryStatus::Error => Cell::new("error").fg(Color::Red),
                    HistoryStatus::Other(ref s) => Cell::new(s),
                };
                table.add_row(vec![
                    Cell::new(record.id),
                    Cell::new(&record.filename),
                    status,
                    Cell::new(record.start_time),
                    Cell::new(record.end_time),
                    Cell::new(&record.size),
                    Cell::new(&record.url),
                ]);
            }
            println!("{table}");
            println!("Page {} of {}", page, history.page_count()?);
        }
        Command::Settings { reset } => {
            let settings = if reset {
                Settings::reset(&cli.settings)?
            } else {
                Settings::load_or_default(&cli.settings)?
            };
            let rendered = toml::to_string_pretty(&settings).map_err(|e| eyre!(e))?;
            println!("{}", style(cli.settings.display()).bold());
            println!("{}", rendered);
        }
    }

    Ok(())
}
