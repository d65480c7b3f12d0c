// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::statement::{RawTable, normalize, variant_for, write_canonical};
use crate::utils::{
    banner, data_folder, file_name, find_files, parse_account, parse_year, required, rule,
    statement_prefix, year_dirs,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a `parse` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

fn t1_path(input: &Path) -> PathBuf {
    let name = file_name(input);
    let out = match name.strip_suffix("_T0.csv") {
        Some(stem) => format!("{}_T1.csv", stem),
        None => format!("{}_T1.csv", name.trim_end_matches(".csv")),
    };
    input.with_file_name(out)
}

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    run(settings, m).map(|_| ())
}

pub fn run(settings: &Settings, m: &clap::ArgMatches) -> Result<ParseOutcome> {
    let account = parse_account(required(m, "type")?)?;
    let variant = variant_for(account.key)?;
    let folder = data_folder(settings, m.get_one::<String>("folder"))?;
    let year = m.get_one::<String>("year").map(|y| parse_year(y)).transpose()?;

    banner(
        settings,
        "Parse bank statements",
        &[
            ("Folder", folder.display().to_string()),
            ("Bank", account.bank_name.to_string()),
            ("Account", account.account_name.to_string()),
            ("Year", year.map_or("ALL".to_string(), |y| y.to_string())),
        ],
    );

    let prefix = statement_prefix(&account);
    let mut outcome = ParseOutcome::default();
    for (y, dir) in year_dirs(&folder, year)? {
        let inputs = find_files(&dir, &prefix, "_T0.csv")?;
        if inputs.is_empty() {
            continue;
        }
        println!("\n Year {}", y);
        println!("{}", rule(settings, '-'));

        for (i, input) in inputs.iter().enumerate() {
            let output = t1_path(input);
            print!("[{:02}] {} -> ", i + 1, file_name(input));
            if output.exists() {
                println!("SKIPPED (output exists)");
                warn!(output = %output.display(), "canonical file exists, not overwriting");
                outcome.skipped.push(output);
                continue;
            }

            let bytes = fs::read(input).with_context(|| format!("Read {}", input.display()))?;
            let raw = RawTable::from_bytes(&bytes, variant.delimiter)
                .with_context(|| format!("Read CSV {}", input.display()))?;
            let records = normalize(&raw, &variant)
                .with_context(|| format!("Normalize {}", input.display()))?;

            let mut buf = Vec::new();
            write_canonical(&mut buf, &records, settings.delimiter())?;
            fs::write(&output, buf).with_context(|| format!("Write {}", output.display()))?;
            println!("{} ({} rows)", file_name(&output), records.len());
            info!(input = %input.display(), rows = records.len(), "normalized statement");
            outcome.written.push(output);
        }
    }

    println!("\n{}", rule(settings, '='));
    println!(
        " Completed. Output files written: {} (skipped: {})",
        outcome.written.len(),
        outcome.skipped.len()
    );
    println!("{}", rule(settings, '='));
    Ok(outcome)
}
