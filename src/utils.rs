// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::models::{AccountType, account_type};
use crate::value::format_br;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_year(s: &str) -> Result<i32> {
    s.trim()
        .parse::<i32>()
        .with_context(|| format!("Invalid year '{}', expected YYYY", s))
}

pub fn parse_account(s: &str) -> Result<AccountType> {
    account_type(s)
        .with_context(|| format!("Unknown account type '{}' (use bb-cc|bb-ccpj|bb-pp)", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("R$ {}", format_br(*d))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Like [`pretty_table`], with the columns from `first_money` on right-aligned.
pub fn money_table(headers: &[&str], rows: Vec<Vec<String>>, first_money: usize) -> Table {
    let mut t = pretty_table(headers, rows);
    for i in first_money..headers.len() {
        if let Some(col) = t.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    t
}

pub fn rule(settings: &Settings, ch: char) -> String {
    ch.to_string().repeat(settings.table_width)
}

pub fn banner(settings: &Settings, title: &str, lines: &[(&str, String)]) {
    println!("{}", rule(settings, '='));
    println!(" {}", title.to_uppercase());
    for (k, v) in lines {
        println!(" {:<8}: {}", k, v);
    }
    println!("{}", rule(settings, '='));
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Resolve `--folder`, falling back to the configured data folder.
pub fn data_folder(settings: &Settings, arg: Option<&String>) -> Result<PathBuf> {
    match arg {
        Some(f) => Ok(PathBuf::from(f.trim())),
        None => settings
            .data_folder
            .clone()
            .context("No --folder given and no data_folder configured"),
    }
}

/// Sub-folders of `folder` named after a year, ascending.
pub fn year_dirs(folder: &Path, only: Option<i32>) -> Result<Vec<(i32, PathBuf)>> {
    let mut out = Vec::new();
    let entries =
        fs::read_dir(folder).with_context(|| format!("Read folder {}", folder.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(year) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.parse::<i32>().ok())
        else {
            continue;
        };
        if only.is_none_or(|y| y == year) {
            out.push((year, path));
        }
    }
    out.sort();
    Ok(out)
}

/// Files directly in `dir` whose name has the given prefix and suffix, sorted.
pub fn find_files(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let entries = fs::read_dir(dir).with_context(|| format!("Read folder {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix) && n.ends_with(suffix));
        if matches && path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    m.get_one::<String>(name)
        .with_context(|| format!("Missing required argument --{}", name))
}

/// `EXTRATO_BB_CC_`
pub fn statement_prefix(account: &AccountType) -> String {
    format!("EXTRATO_{}_{}_", account.bank(), account.account())
}

/// `CAIXA_BB_CC_2024`, or `CAIXA_BB_CC_O` for the merged tables.
pub fn cashflow_stem(account: &AccountType, year: Option<i32>) -> String {
    match year {
        Some(y) => format!("CAIXA_{}_{}_{}", account.bank(), account.account(), y),
        None => format!("CAIXA_{}_{}_O", account.bank(), account.account()),
    }
}
