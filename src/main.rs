//! Melonbooks Tracker - artist catalog curation and listing server
//!
//! One-shot curation commands for scripting, or a web server exposing the
//! curation and listing API.

use clap::Parser;
use melonbooks_tracker::curation::{Curation, CurationOutcome, CurationRequest};
use melonbooks_tracker::database::{init_schema, list_artist_names, list_skip_sequences};
use melonbooks_tracker::TrackerError;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Artist catalog curation and product listing server
#[derive(Parser, Debug)]
#[command(name = "melonbooks_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Source site the curation commands operate on
    #[arg(long, default_value = "melonbooks")]
    site: String,

    /// Port for the web UI (used when no one-shot command is given)
    #[arg(long, default_value_t = 8080)]
    web_port: u16,

    /// Track a new artist and exit
    #[arg(long, value_name = "NAME")]
    add_artist: Option<String>,

    /// Stop tracking an artist and exit
    #[arg(long, value_name = "NAME")]
    remove_artist: Option<String>,

    /// Print tracked artists and exit
    #[arg(long, default_value_t = false)]
    list_artists: bool,

    /// Add a title skip sequence for --artist and exit
    #[arg(long, value_name = "SEQUENCE", requires = "artist")]
    add_skip: Option<String>,

    /// Remove a title skip sequence for --artist and exit
    #[arg(long, value_name = "SEQUENCE", requires = "artist")]
    remove_skip: Option<String>,

    /// Artist context for the skip sequence commands
    #[arg(long)]
    artist: Option<String>,
}

/// Returns the default database path: ~/.local/share/melonbooks_tracker/melonbooks.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("melonbooks_tracker")
        .join("melonbooks.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let db_path = PathBuf::from(&args.database);

    log::info!("Database path: {}", db_path.display());

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create database directory: {}", e);
                std::process::exit(1);
            }
            log::info!("Created directory: {}", parent.display());
        }
    }

    // Open database connection
    let mut conn = match Connection::open(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize database schema
    if let Err(e) = init_schema(&conn) {
        log::error!("Failed to initialize database schema: {}", e);
        std::process::exit(1);
    }

    let curation = Curation::new(args.site.clone());

    // One-shot curation commands
    if let Some(request) = one_shot_request(&args) {
        apply_one_shot(&curation, &mut conn, request);
        return;
    }
    if args.list_artists {
        match list_artist_names(&conn, &args.site) {
            Ok(names) => {
                for name in &names {
                    println!("{}", name);
                    if let Ok(sequences) = list_skip_sequences(&conn, name, &args.site) {
                        for seq in sequences {
                            println!("  skip: {}", seq);
                        }
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to list artists: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // No one-shot command: run the web server
    let db = Arc::new(Mutex::new(conn));
    if let Err(e) = melonbooks_tracker::web::serve(db, Arc::new(curation), args.web_port).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}

/// Build the curation request for a one-shot command, if any was given.
fn one_shot_request(args: &Args) -> Option<CurationRequest> {
    if let Some(name) = &args.add_artist {
        return Some(CurationRequest::AddArtist {
            name: name.clone(),
            site: args.site.clone(),
        });
    }
    if let Some(name) = &args.remove_artist {
        return Some(CurationRequest::RemoveArtist { name: name.clone() });
    }
    if let Some(sequence) = &args.add_skip {
        return Some(CurationRequest::AddSkipSequence {
            artist: args.artist.clone().expect("clap enforces --artist"),
            sequence: sequence.clone(),
        });
    }
    if let Some(sequence) = &args.remove_skip {
        return Some(CurationRequest::RemoveSkipSequence {
            artist: args.artist.clone().expect("clap enforces --artist"),
            sequence: sequence.clone(),
        });
    }
    None
}

fn apply_one_shot(curation: &Curation, conn: &mut Connection, request: CurationRequest) {
    match curation.handle(conn, request) {
        Ok(CurationOutcome::Applied) => log::info!("Done"),
        Ok(CurationOutcome::Ignored) => log::warn!("Input was blank, nothing changed"),
        Err(e @ TrackerError::DuplicateArtist { .. }) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("Curation command failed: {}", e);
            std::process::exit(1);
        }
    }
}
