//! # modtree CLI
//!
//! Command-line interface for crawling a content library and mapping how
//! its modules call each other.
//!
//! ## Subcommands
//!
//! - `crawl`: visit one or more modules, follow their references, and
//!   write a notes report per starting module
//! - `scan`: walk whole folders and report the modules whose query
//!   expressions contain a keyword
//!
//! Crawls print their run context first and wait for confirmation, since a
//! deep crawl can issue a large number of requests against a shared
//! backend.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};
use tokio::sync::mpsc;
use tracing::instrument;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use modtree::config::Settings;
use modtree::crawler::{Crawler, CrawlerConfig, FolderScanner};
use modtree::report;
use modtree::session::Session;

#[derive(Parser)]
#[command(author, version, about = "Crawl a content library and map module call graphs", long_about = None)]
struct Cli {
    /// Settings file (defaults to Modtree.toml, modtree.toml, or .modtree.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl modules and write a notes report per starting module
    Crawl(CrawlArgs),

    /// Scan folders for modules whose queries contain a keyword
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Module names to crawl, without folder or extension
    #[arg(required = true)]
    modules: Vec<String>,

    /// Content-library folder containing the modules
    #[arg(short, long, default_value = "modules")]
    folder: String,

    /// Resolve the tables read by extracted queries
    #[arg(short, long)]
    tables: bool,

    /// Do not follow references into called modules
    #[arg(long)]
    no_follow: bool,

    /// Omit raw document content from the report
    #[arg(long)]
    no_content: bool,

    /// Maximum crawl depth, counting the starting module as one level
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    depth: Option<u32>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Keyword to look for inside extracted queries
    #[arg(required = true)]
    keyword: String,

    /// Folder to scan; repeatable (defaults to the configured folder list)
    #[arg(short, long)]
    folder: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;

    // Execute the appropriate command
    match cli.command {
        Some(Commands::Crawl(args)) => {
            crawl_command(args, settings).await?;
        }
        Some(Commands::Scan(args)) => {
            scan_command(args, settings).await?;
        }
        None => {
            // If no command is provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn init_tracing() {
    // Log to stderr so reports and prompts on stdout stay clean
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

#[instrument(skip(settings))]
async fn crawl_command(args: CrawlArgs, settings: Settings) -> anyhow::Result<()> {
    let module_paths: Vec<String> = args
        .modules
        .iter()
        .map(|module| format!("/contentlibrary/{}/{}.htm", args.folder, module))
        .collect();

    let config = CrawlerConfig::builder()
        .max_depth(args.depth.unwrap_or(settings.crawl.max_depth))
        .follow_references(!args.no_follow)
        .find_tables(args.tables)
        .include_content(!args.no_content)
        .build();

    print_run_context(&module_paths, &config)?;
    if !args.yes && !confirm_proceed()? {
        println!("Shutting down: terminated by user");
        return Ok(());
    }

    let session = Session::new(&settings)?;
    // A failed login aborts the run; per-document failures later do not
    session.token().await?;

    let crawler = Crawler::new(&session, config.clone());
    for module_path in &module_paths {
        println!("Crawling {}...", module_path);
        let records = crawler.crawl(module_path).await;
        if records.is_empty() {
            println!("No records gathered for {}", module_path);
            continue;
        }

        let notes = report::render_notes(&records, config.include_content)?;
        let path = report::write_notes(&settings.crawl.output_dir, module_path, &notes).await?;
        println!("Wrote {} record(s) to {}", records.len(), path.display());
    }

    println!("Finished parsing {} module(s)", module_paths.len());
    Ok(())
}

#[instrument(skip(settings))]
async fn scan_command(args: ScanArgs, settings: Settings) -> anyhow::Result<()> {
    let folders = if args.folder.is_empty() {
        settings.crawl.folders.clone()
    } else {
        args.folder.clone()
    };

    let session = Session::new(&settings)?;
    session.token().await?;

    println!(
        "Scanning {} folder(s) for keyword '{}'...",
        folders.len(),
        args.keyword
    );

    // Create a channel for progress updates
    let (progress_sender, mut progress_receiver) = mpsc::channel(100);

    // The total is unknown until each folder is listed, so run a spinner
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {pos} visited {msg}")
            .unwrap(),
    );
    progress_bar.set_message("Scanning modules...");

    // Spawn a task to process progress updates
    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(module) = progress_receiver.recv().await {
                progress_bar.inc(1);
                progress_bar.set_message(module);
            }
            progress_bar.finish_with_message("Scan completed");
        }
    });

    let scanner = FolderScanner::new(&session, &args.keyword, folders);
    let outcome = scanner.scan(Some(progress_sender)).await;

    // Wait for the progress task (it ends when all senders are dropped)
    let _ = progress_handle.await;

    let matched: usize = outcome.iter().map(|f| f.modules.len()).sum();
    let notes = report::render_scan(&outcome);
    let path = report::write_scan_notes(&settings.crawl.output_dir, &args.keyword, &notes).await?;

    println!("Found {} matching module(s); wrote {}", matched, path.display());
    Ok(())
}

/// Print the run-context banner with the switch states in bold
fn print_run_context(module_paths: &[String], config: &CrawlerConfig) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut bold = ColorSpec::new();
    bold.set_bold(true);

    writeln!(&mut stdout)?;
    writeln!(&mut stdout, "{}", "*".repeat(100))?;
    writeln!(&mut stdout, "Will parse modules: {}", module_paths.join(", "))?;

    write!(&mut stdout, "Reference following switch: ")?;
    write_switch(&mut stdout, &bold, config.follow_references)?;

    write!(&mut stdout, "Table lookup switch: ")?;
    write_switch(&mut stdout, &bold, config.find_tables)?;

    write!(&mut stdout, "Content echo switch: ")?;
    write_switch(&mut stdout, &bold, config.include_content)?;

    write!(&mut stdout, "Will visit modules this deep, counting the module itself: ")?;
    stdout.set_color(&bold)?;
    writeln!(&mut stdout, "{}", config.max_depth)?;
    stdout.reset()?;

    writeln!(&mut stdout, "{}", "*".repeat(100))?;
    Ok(())
}

fn write_switch(stdout: &mut StandardStream, bold: &ColorSpec, on: bool) -> io::Result<()> {
    stdout.set_color(bold)?;
    write!(stdout, "{}", if on { "ON" } else { "OFF" })?;
    stdout.reset()?;
    writeln!(stdout)
}

/// Ask for confirmation on stdin; anything but `y` declines
fn confirm_proceed() -> io::Result<bool> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut bold = ColorSpec::new();
    bold.set_bold(true);

    stdout.set_color(&bold)?;
    write!(&mut stdout, "Continue with the above settings? (y/N) ")?;
    stdout.reset()?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y"))
}
