use std::io::Read;

use clap::Parser;
use indexmap::IndexMap;
use tracing::info;

use flownote::{DiagramSession, report};

#[derive(Parser)]
#[command(name = "flownote", about = "Parse workflow diagrams and show their nodes, edges and notes")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    file: Option<std::path::PathBuf>,

    /// Print the session snapshot as JSON
    #[arg(long)]
    json: bool,

    /// JSON object mapping node ids to note text
    #[arg(long)]
    notes: Option<std::path::PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let input = match &cli.file {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            fail(&format!("failed to read {}: {e}", path.display()));
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                fail(&format!("failed to read stdin: {e}"));
            });
            buf
        }
    };

    let mut session = DiagramSession::new(input);
    if let Some(err) = session.error() {
        fail(err);
    }
    info!(
        nodes = session.parsed_diagram().nodes.len(),
        edges = session.actions().len(),
        "parsed diagram"
    );

    if let Some(path) = &cli.notes {
        let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
            fail(&format!("failed to read {}: {e}", path.display()));
        });
        let notes: IndexMap<String, String> = serde_json::from_str(&text).unwrap_or_else(|e| {
            fail(&format!("invalid notes file {}: {e}", path.display()));
        });
        if let Err(e) = session.import_notes(notes) {
            fail(&e.to_string());
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&session.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(&format!("failed to serialize session: {e}")),
        }
    } else {
        println!("{}", report::render_report(&session));
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

fn fail(message: &str) -> ! {
    eprintln!("ERROR: {message}");
    std::process::exit(1);
}
