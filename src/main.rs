// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use fluxo::{cli, commands, config::Settings};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = Settings::load(matches.get_one::<String>("config").map(Path::new))?;

    match matches.subcommand() {
        Some(("parse", sub)) => commands::parse::handle(&settings, sub)?,
        Some(("cashflow", sub)) => commands::cashflow::handle(&settings, sub)?,
        Some(("report", sub)) => commands::report::handle(&settings, sub)?,
        Some(("budget", sub)) => commands::budget::handle(&settings, sub)?,
        Some(("nfse", sub)) => commands::nfse::handle(&settings, sub)?,
        Some(("payroll", sub)) => commands::payroll::handle(sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
