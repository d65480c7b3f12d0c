// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cashflow::{
    CashflowAnalysis, MONTHLY_HEADER, MonthlyBucket, YEARLY_HEADER, YearlyBucket, analyse,
    write_monthly, write_yearly,
};
use crate::config::Settings;
use crate::models::{AccountType, CanonicalRecord};
use crate::statement::{concat, read_canonical, write_canonical};
use crate::utils::{
    banner, cashflow_stem, data_folder, file_name, find_files, fmt_money, money_table,
    parse_account, parse_year, required, rule, statement_prefix, year_dirs,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PREVIEW_ROWS: usize = 20;

pub fn monthly_table(rows: &[MonthlyBucket]) -> comfy_table::Table {
    let data = rows
        .iter()
        .map(|b| {
            vec![
                b.year.to_string(),
                b.month.clone(),
                b.category.clone(),
                fmt_money(&b.inflow),
                b.inflow_count.to_string(),
                fmt_money(&b.outflow),
                b.outflow_count.to_string(),
                fmt_money(&b.net),
                fmt_money(&b.inflow_cum),
                fmt_money(&b.outflow_cum),
                fmt_money(&b.net_cum),
            ]
        })
        .collect();
    money_table(&MONTHLY_HEADER, data, 3)
}

pub fn yearly_table(rows: &[YearlyBucket]) -> comfy_table::Table {
    let data = rows
        .iter()
        .map(|b| {
            vec![
                b.year.to_string(),
                b.category.clone(),
                fmt_money(&b.inflow),
                b.inflow_count.to_string(),
                fmt_money(&b.outflow),
                b.outflow_count.to_string(),
                fmt_money(&b.net),
                fmt_money(&b.inflow_cum),
                fmt_money(&b.outflow_cum),
                fmt_money(&b.net_cum),
            ]
        })
        .collect();
    money_table(&YEARLY_HEADER, data, 2)
}

fn preview(records: &[CanonicalRecord]) -> comfy_table::Table {
    let mut data: Vec<Vec<String>> = records
        .iter()
        .take(PREVIEW_ROWS)
        .map(|r| {
            vec![
                r.date.format("%Y-%m-%d").to_string(),
                fmt_money(&r.value),
                r.category.clone(),
                r.description.clone(),
            ]
        })
        .collect();
    if records.len() > PREVIEW_ROWS {
        data.push(vec![
            format!("... {} more", records.len() - PREVIEW_ROWS),
            String::new(),
            String::new(),
            String::new(),
        ]);
    }
    money_table(&["Data", "Valor", "Categoria", "Descricao"], data, 1)
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> crate::error::Result<()>,
{
    let mut buf = Vec::new();
    write(&mut buf)?;
    fs::write(path, buf).with_context(|| format!("Write {}", path.display()))?;
    println!("  Output : {}", path.display());
    Ok(())
}

fn load_canonical(path: &Path, delimiter: u8) -> Result<Vec<CanonicalRecord>> {
    let bytes = fs::read(path).with_context(|| format!("Read {}", path.display()))?;
    read_canonical(&bytes, delimiter).with_context(|| format!("Parse {}", path.display()))
}

fn suffix(category: Option<&str>) -> String {
    category
        .map(|c| format!("-{}", c.to_uppercase().replace(' ', "_")))
        .unwrap_or_default()
}

fn write_analysis(
    dir: &Path,
    stem: &str,
    analysis: &CashflowAnalysis,
    category: Option<&str>,
    delimiter: u8,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let sfx = suffix(category);
    let monthly = dir.join(format!("{}_MENSAL{}.csv", stem, sfx));
    write_file(&monthly, |b| write_monthly(b, &analysis.monthly, delimiter))?;
    written.push(monthly);
    let yearly = dir.join(format!("{}_ANUAL{}.csv", stem, sfx));
    write_file(&yearly, |b| write_yearly(b, &analysis.yearly, delimiter))?;
    written.push(yearly);
    Ok(())
}

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    run(settings, m).map(|_| ())
}

/// Returns every file written, per-year tables first, merged tables last.
pub fn run(settings: &Settings, m: &clap::ArgMatches) -> Result<Vec<PathBuf>> {
    let account = parse_account(required(m, "type")?)?;
    let folder = data_folder(settings, m.get_one::<String>("folder"))?;
    let year = m.get_one::<String>("year").map(|y| parse_year(y)).transpose()?;
    let filters: Vec<Option<String>> = match m.get_one::<String>("category") {
        Some(c) => vec![Some(c.clone())],
        None => std::iter::once(None)
            .chain(settings.categories_for(&account).iter().cloned().map(Some))
            .collect(),
    };
    let delimiter = settings.delimiter();

    banner(
        settings,
        "Cashflow analysis from bank statements",
        &[
            ("Folder", folder.display().to_string()),
            ("Bank", account.bank_name.to_string()),
            ("Account", account.account_name.to_string()),
            ("Year", year.map_or("ALL".to_string(), |y| y.to_string())),
        ],
    );

    let prefix = statement_prefix(&account);
    let mut written = Vec::new();
    for (y, dir) in year_dirs(&folder, year)? {
        let inputs = find_files(&dir, &prefix, "_T1.csv")?;
        if inputs.is_empty() {
            continue;
        }
        println!("\n Year {}", y);
        println!("{}", rule(settings, '-'));

        let mut parts = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            parts.push(load_canonical(input, delimiter)?);
            println!("[{:02}] {} -> LOADED", i + 1, file_name(input));
        }
        let records = concat(parts);
        let stem = cashflow_stem(&account, Some(y));

        println!("\n Year {} -- Daily Cash Flow (preview)", y);
        println!("{}", preview(&records));
        let daily = dir.join(format!("{}_DIARIO.csv", stem));
        write_file(&daily, |b| write_canonical(b, &records, delimiter))?;
        written.push(daily);

        for filter in &filters {
            let analysis = analyse(&records, filter.as_deref());
            println!("\n Year {} -- Monthly Cash Flow ({})", y, analysis.category);
            println!("{}", monthly_table(&analysis.monthly));
            println!("\n Year {} -- Annual Cash Flow ({})", y, analysis.category);
            println!("{}", yearly_table(&analysis.yearly));
            write_analysis(&dir, &stem, &analysis, filter.as_deref(), delimiter, &mut written)?;
        }
        info!(year = y, records = records.len(), "cash-flow tables written");
    }

    if written.is_empty() {
        println!(" No input files found. Nothing to process.");
        println!("{}", rule(settings, '='));
        return Ok(written);
    }

    merge(settings, &folder, &account, &mut written)?;

    println!("\n{}", rule(settings, '='));
    println!(" Completed. Output files written: {}", written.len());
    println!("{}", rule(settings, '='));
    Ok(written)
}

/// Merge every year's daily table found under `folder` into the `_O_` tables.
///
/// The merged panels are built from all years at once, so the yearly
/// cumulative columns carry over from one year to the next.
fn merge(
    settings: &Settings,
    folder: &Path,
    account: &AccountType,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let delimiter = settings.delimiter();
    let mut daily = Vec::new();
    for (y, dir) in year_dirs(folder, None)? {
        let path = dir.join(format!("{}_DIARIO.csv", cashflow_stem(account, Some(y))));
        if !path.is_file() {
            continue;
        }
        let records = load_canonical(&path, delimiter)?;
        debug!(year = y, records = records.len(), "merging year");
        daily.extend(records);
    }
    daily.sort_by_key(|r| r.date);
    let CashflowAnalysis { monthly, yearly, .. } = analyse(&daily, None);

    let stem = cashflow_stem(account, None);
    println!();
    let path = folder.join(format!("{}_DIARIO.csv", stem));
    write_file(&path, |b| write_canonical(b, &daily, delimiter))?;
    written.push(path);
    let path = folder.join(format!("{}_MENSAL.csv", stem));
    write_file(&path, |b| write_monthly(b, &monthly, delimiter))?;
    written.push(path);
    let path = folder.join(format!("{}_ANUAL.csv", stem));
    write_file(&path, |b| write_yearly(b, &yearly, delimiter))?;
    written.push(path);

    println!("\n ANNUAL CASH FLOW");
    println!("{}", rule(settings, '='));
    println!("{}", yearly_table(&yearly));
    Ok(())
}
