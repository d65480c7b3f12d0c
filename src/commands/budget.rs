// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{
    BudgetEntry, BudgetTotals, expand_all, load_budget, summary_by_contract, summary_by_status,
    summary_by_tags, tag_counts, totals, update_status, write_budget,
};
use crate::config::Settings;
use crate::utils::{
    fmt_money, maybe_print_json, money_table, parse_date, parse_year, pretty_table, required,
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct BudgetSummary {
    pub totals: BudgetTotals,
    pub by_status: Vec<(String, Decimal)>,
    pub by_contract: Vec<(String, Decimal)>,
    pub by_tags: Vec<(String, Decimal)>,
    pub tag_counts: Vec<(String, usize)>,
}

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(settings, sub).map(|_| ()),
        Some(("expand", sub)) => expand(settings, sub).map(|_| ()),
        _ => Ok(()),
    }
}

fn load(path: &str, settings: &Settings) -> Result<Vec<BudgetEntry>> {
    let path = Path::new(path.trim());
    let file = File::open(path).with_context(|| format!("Open budget {}", path.display()))?;
    load_budget(file, settings.delimiter())
        .with_context(|| format!("Parse budget {}", path.display()))
}

fn grouped(title: &str, rows: &[(String, Decimal)]) -> comfy_table::Table {
    let data = rows
        .iter()
        .map(|(k, v)| vec![k.clone(), fmt_money(v)])
        .collect();
    money_table(&[title, "Value"], data, 1)
}

pub fn summary(settings: &Settings, sub: &clap::ArgMatches) -> Result<BudgetSummary> {
    let entries = load(required(sub, "file")?, settings)?;
    let today = match sub.get_one::<String>("today") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let entries = update_status(&entries, today);
    let committed_only = !sub.get_flag("all");

    let out = BudgetSummary {
        totals: totals(&entries, committed_only),
        by_status: summary_by_status(&entries, committed_only),
        by_contract: summary_by_contract(&entries, committed_only),
        by_tags: summary_by_tags(&entries, committed_only),
        tag_counts: tag_counts(&entries, committed_only),
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        return Ok(out);
    }

    let t = &out.totals;
    println!(
        "{}",
        money_table(
            &["Revenue", "Expenses", "Net"],
            vec![vec![
                fmt_money(&t.revenue),
                fmt_money(&t.expenses),
                fmt_money(&t.net)
            ]],
            0,
        )
    );
    println!("{}", grouped("Status", &out.by_status));
    println!("{}", grouped("Contract", &out.by_contract));
    println!("{}", grouped("Tags", &out.by_tags));
    let counts = out
        .tag_counts
        .iter()
        .map(|(k, n)| vec![k.clone(), n.to_string()])
        .collect();
    println!("{}", pretty_table(&["Tag", "Count"], counts));
    Ok(out)
}

pub fn expand(settings: &Settings, sub: &clap::ArgMatches) -> Result<Vec<BudgetEntry>> {
    let entries = load(required(sub, "file")?, settings)?;
    let year = parse_year(required(sub, "year")?)?;
    let expanded = expand_all(&entries, year)?;

    if let Some(out) = sub.get_one::<String>("out") {
        let mut buf = Vec::new();
        write_budget(&mut buf, &expanded, settings.delimiter())?;
        fs::write(out.trim(), buf).with_context(|| format!("Write {}", out.trim()))?;
    }
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &expanded)? {
        return Ok(expanded);
    }

    let data = expanded
        .iter()
        .map(|e| {
            vec![
                e.date_due
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                e.status.to_string(),
                e.contract.clone(),
                e.name.clone(),
                fmt_money(&e.signed_value()),
            ]
        })
        .collect();
    println!(
        "{}",
        money_table(&["Date_Due", "Status", "Contract", "Name", "Value"], data, 4)
    );
    Ok(expanded)
}
