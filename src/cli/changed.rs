// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Changed-files command - print what changed, nothing else

use miette::Result;
use std::path::PathBuf;

use super::{change_source, collect_changes};
use crate::config::Settings;

/// Print one changed file per line
pub async fn run(settings: Settings, changed_files: Option<PathBuf>, verbose: bool) -> Result<()> {
    let source = change_source(&settings, changed_files);
    let files = collect_changes(source.as_ref(), verbose).await?;

    for file in files {
        println!("{}", file);
    }

    Ok(())
}
