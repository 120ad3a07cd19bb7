// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Linda.
//
// Linda is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Linda is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Linda. If not, see <https://www.gnu.org/licenses/>.


//! `linda-search`: fuzzy word search with a pool of searchers
//!
//! Reads candidate words (one per line) from a file, starts the searchers and
//! a manager on one in-process tuple space, and prints the matches best-first.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use linda_search::tracing_setup::init_tracing;
use linda_search::{Manager, Searcher, DEFAULT_MAX_DISTANCE};
use linda_tuplespace::{SharedLinda, SpaceConfig, TupleSpace};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "linda-search")]
#[command(about = "Fuzzy word search coordinated through a tuple space", long_about = None)]
struct Cli {
    /// Word to look for
    #[arg(short, long)]
    query: String,

    /// File with one candidate word per line
    #[arg(short, long)]
    words: PathBuf,

    /// Number of searcher tasks
    #[arg(short, long, default_value_t = 4)]
    searchers: usize,

    /// Report candidates strictly closer than this distance
    #[arg(short = 'd', long, default_value_t = DEFAULT_MAX_DISTANCE)]
    max_distance: usize,

    /// Give up waiting for searchers after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Tuple space config file (YAML, TOML or JSON); env vars otherwise
    #[arg(short, long, env = "LINDA_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("tracing disabled: {e}");
    }

    if cli.searchers == 0 {
        bail!("--searchers must be at least 1");
    }

    let config = match &cli.config {
        Some(path) => SpaceConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SpaceConfig::from_env().context("loading config from environment")?,
    };
    let space = TupleSpace::with_config(config).context("creating tuple space")?;

    let text = tokio::fs::read_to_string(&cli.words)
        .await
        .with_context(|| format!("reading {}", cli.words.display()))?;
    let words: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect();
    info!(candidates = words.len(), searchers = cli.searchers, "Starting search");

    let linda: SharedLinda = Arc::new(space.clone());
    let mut workers = Vec::with_capacity(cli.searchers);
    for _ in 0..cli.searchers {
        let searcher = Searcher::new(linda.clone())
            .with_max_searchers(cli.searchers as i64)
            .with_max_distance(cli.max_distance);
        workers.push(tokio::spawn(async move { searcher.run().await }));
    }

    let mut manager = Manager::new(linda);
    if let Some(ms) = cli.timeout_ms {
        manager = manager.with_deadline(Duration::from_millis(ms));
    }
    let matches = manager.search(&cli.query, &words).await?;

    // Releases searchers still waiting for a request
    space.shutdown();
    for worker in workers {
        match worker.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "Searcher failed"),
            Err(e) => warn!(error = %e, "Searcher task panicked"),
        }
    }

    if matches.is_empty() {
        println!("No match for \"{}\"", cli.query);
    }
    for m in &matches {
        println!("{}\t{}", m.distance, m.candidate);
    }
    Ok(())
}
