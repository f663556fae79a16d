// SPDX-License-Identifier: Apache-2.0

//! Fetches the user feed and prints a summary of every user.
//!
//! The endpoint comes from `--endpoint` or the `SOCIALFEED_ENDPOINT`
//! environment variable; `--file` decodes a local document instead.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use log::info;
use socialfeed::{DecodeResult, FeedConfig, FetchCoordinator, User, UserListDecoder};

#[derive(Parser, Debug)]
#[command(about = "Fetch and decode a social user feed")]
struct Args {
    /// Feed URL, overriding SOCIALFEED_ENDPOINT
    #[arg(long, conflicts_with = "file")]
    endpoint: Option<String>,

    /// Decode a local JSON file instead of fetching
    #[arg(long)]
    file: Option<PathBuf>,

    /// Print friend names for every user
    #[arg(long)]
    friends: bool,
}

fn print_user(user: &User, with_friends: bool) {
    println!(
        "{:<26} {:<32} {:<18} {} friends",
        user.id,
        user.email,
        user.phone_number,
        user.friends.len()
    );
    if with_friends {
        for friend in &user.friends {
            println!("    #{:<4} {}", friend.id, friend.name);
        }
    }
}

fn fetch(endpoint: Option<String>) -> Result<DecodeResult, String> {
    let config = match endpoint {
        Some(endpoint) => FeedConfig::new(&endpoint),
        None => FeedConfig::from_env(),
    }
    .map_err(|e| e.to_string())?;

    let (tx, rx) = mpsc::channel();
    let coordinator = FetchCoordinator::with_default_client();
    info!("requesting users from {}", config.endpoint());
    coordinator
        .request_configured(&config, move |result| {
            // The receiver only goes away if main already exited
            let _ = tx.send(result);
        })
        .map_err(|e| format!("unable to start fetch worker: {e}"))?;
    rx.recv()
        .map_err(|_| "fetch worker exited without a result".to_string())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match &args.file {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => UserListDecoder::new().decode(&bytes),
            Err(e) => {
                eprintln!("Error: Unable to read file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => match fetch(args.endpoint) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(users) => {
            for user in &users {
                print_user(user, args.friends);
            }
            println!("{} users", users.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e} ({:?})", e.kind());
            ExitCode::FAILURE
        }
    }
}
