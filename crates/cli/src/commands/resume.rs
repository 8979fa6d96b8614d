// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost resume` and `ghost brief` - continuity output for humans and
//! for manual injection into an agent session.

use super::require_repo;
use anyhow::{bail, Result};
use ghost_engine::context;

pub async fn resume(id: Option<&str>) -> Result<()> {
    let git = require_repo().await?;
    match context::resume_block(git.root(), id) {
        Some(block) => {
            println!("{}", block);
            Ok(())
        }
        None => match id {
            Some(id) => bail!("session {} not found", id),
            None => bail!("no completed sessions to resume"),
        },
    }
}

pub async fn brief(topic: &str) -> Result<()> {
    let git = require_repo().await?;
    match context::brief_block(git.root(), topic) {
        Some(block) => {
            println!("{}", block);
            Ok(())
        }
        None => {
            println!("No knowledge matches '{}'", topic);
            Ok(())
        }
    }
}
