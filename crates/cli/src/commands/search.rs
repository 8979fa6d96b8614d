// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost search` - delegate to the external semantic index.

use super::require_repo;
use anyhow::{bail, Result};
use clap::Args;
use ghost_adapters::{collection_for, SearchEngine, SemdexEngine};

#[derive(Args)]
pub struct SearchArgs {
    /// Query text
    pub query: String,
    /// Restrict to sessions carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
}

pub async fn handle(args: SearchArgs) -> Result<()> {
    let git = require_repo().await?;
    let collection = collection_for(git.root());

    let engine = SemdexEngine::new();
    match engine
        .search(&collection, &args.query, args.tag.as_deref())
        .await
    {
        Ok(results) => {
            if results.trim().is_empty() {
                println!("No results");
            } else {
                print!("{}", results);
            }
            Ok(())
        }
        Err(err) => bail!("search failed: {}", err),
    }
}
