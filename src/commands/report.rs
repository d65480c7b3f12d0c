// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::report::{
    CashflowReport, Granularity, OpeningBalances, PANEL_HEADER, SUMMARY_HEADER, compose,
    write_panel, write_summary,
};
use crate::statement::read_canonical;
use crate::utils::{
    banner, cashflow_stem, data_folder, fmt_money, maybe_print_json, money_table, parse_account,
    parse_year, required, rule, year_dirs,
};
use anyhow::{Context, Result, anyhow, bail};
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::info;

fn summary_table(r: &CashflowReport) -> comfy_table::Table {
    let s = &r.summary;
    money_table(
        &SUMMARY_HEADER,
        vec![vec![
            s.year.to_string(),
            fmt_money(&s.opening_balance),
            fmt_money(&s.inflow),
            fmt_money(&s.outflow),
            fmt_money(&s.net),
            fmt_money(&s.closing_balance),
        ]],
        1,
    )
}

fn panel_table(r: &CashflowReport) -> comfy_table::Table {
    let data = r
        .panel
        .iter()
        .map(|p| {
            vec![
                p.period.clone(),
                fmt_money(&p.inflow),
                fmt_money(&p.outflow),
                fmt_money(&p.net),
                fmt_money(&p.balance),
            ]
        })
        .collect();
    money_table(&PANEL_HEADER, data, 1)
}

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    run(settings, m).map(|_| ())
}

pub fn run(settings: &Settings, m: &clap::ArgMatches) -> Result<Vec<CashflowReport>> {
    let account = parse_account(required(m, "type")?)?;
    let folder = data_folder(settings, m.get_one::<String>("folder"))?;
    let year = m.get_one::<String>("year").map(|y| parse_year(y)).transpose()?;
    let granularity: Granularity = m
        .get_one::<String>("granularity")
        .map_or(Ok(Granularity::Monthly), |g| g.parse::<Granularity>())
        .map_err(|e: String| anyhow!(e))?;
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let quiet = json_flag || jsonl_flag;
    let delimiter = settings.delimiter();

    let balances_path = folder.join(settings.balances_file_for(&account));
    let file = File::open(&balances_path)
        .with_context(|| format!("Open opening balances {}", balances_path.display()))?;
    let balances = OpeningBalances::from_reader(file, delimiter)
        .with_context(|| format!("Parse {}", balances_path.display()))?;

    let mut daily: Vec<(i32, PathBuf)> = Vec::new();
    for (y, dir) in year_dirs(&folder, None)? {
        let path = dir.join(format!("{}_DIARIO.csv", cashflow_stem(&account, Some(y))));
        if path.is_file() {
            daily.push((y, path));
        }
    }
    let available: Vec<i32> = daily.iter().map(|(y, _)| *y).collect();
    if let Some(y) = year {
        if !available.contains(&y) {
            bail!(
                "Requested year {} not found in data. Available years: {:?}",
                y,
                available
            );
        }
    }

    if !quiet {
        banner(
            settings,
            "Cashflow report",
            &[
                ("Folder", folder.display().to_string()),
                ("Bank", account.bank_name.to_string()),
                ("Account", account.account_name.to_string()),
                ("Year", year.map_or("ALL".to_string(), |y| y.to_string())),
            ],
        );
    }

    let selected = daily
        .into_iter()
        .filter(|(y, _)| year.is_none_or(|w| w == *y))
        .map(|(y, path)| -> Result<_> { Ok((y, path, balances.for_year(y)?)) })
        .collect::<Result<Vec<_>>>()?;

    let mut reports = Vec::new();
    for (y, path, opening) in selected {
        let bytes = fs::read(&path).with_context(|| format!("Read {}", path.display()))?;
        let records =
            read_canonical(&bytes, delimiter).with_context(|| format!("Parse {}", path.display()))?;
        let report = compose(&records, y, opening, granularity);

        let out_dir = folder.join(y.to_string());
        fs::create_dir_all(&out_dir)?;
        let panel_path = out_dir.join(format!(
            "REPORT_{}_{}_{}.csv",
            account.bank(),
            account.account(),
            y
        ));
        let summary_path = out_dir.join(format!(
            "SUMMARY_{}_{}_{}.csv",
            account.bank(),
            account.account(),
            y
        ));
        let mut buf = Vec::new();
        write_panel(&mut buf, &report.panel, delimiter)?;
        fs::write(&panel_path, buf).with_context(|| format!("Write {}", panel_path.display()))?;
        let mut buf = Vec::new();
        write_summary(&mut buf, &report.summary, delimiter)?;
        fs::write(&summary_path, buf)
            .with_context(|| format!("Write {}", summary_path.display()))?;
        info!(year = y, rows = report.panel.len(), "report written");

        if !quiet {
            println!("\n Year {}", y);
            println!("{}", rule(settings, '-'));
            println!("\n[Summary]\n{}", summary_table(&report));
            println!("\n[Panel]\n{}", panel_table(&report));
            println!("[OK] Files written for {}", y);
        }
        reports.push(report);
    }

    if !maybe_print_json(json_flag, jsonl_flag, &reports)? {
        println!("\n{}", rule(settings, '='));
        println!(" Completed. Reports written: {}", reports.len());
        println!("{}", rule(settings, '='));
    }
    Ok(reports)
}
