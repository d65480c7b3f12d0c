// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn folder_arg() -> Arg {
    Arg::new("folder")
        .long("folder")
        .short('f')
        .help("Data folder holding one sub-folder per year")
}

fn type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .short('t')
        .required(true)
        .help("Account type: bb-cc | bb-ccpj | bb-pp")
}

fn year_arg() -> Arg {
    Arg::new("year")
        .long("year")
        .short('y')
        .help("Process a single year instead of every detected year")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON instead of a table"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("fluxo")
        .version(crate_version!())
        .about("Normalize bank statements and build cash-flow reports")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a JSON config file"),
        )
        .subcommand(
            Command::new("parse")
                .about("Normalize raw statements (*_T0.csv) into canonical files (*_T1.csv)")
                .arg(folder_arg())
                .arg(type_arg())
                .arg(year_arg()),
        )
        .subcommand(
            Command::new("cashflow")
                .about("Build daily, monthly and yearly cash-flow tables from canonical files")
                .arg(folder_arg())
                .arg(type_arg())
                .arg(year_arg())
                .arg(
                    Arg::new("category")
                        .long("category")
                        .short('c')
                        .help("Only analyse this category"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Running-balance report per year from the daily cash-flow files")
                .arg(folder_arg())
                .arg(type_arg())
                .arg(year_arg())
                .arg(
                    Arg::new("granularity")
                        .long("granularity")
                        .short('g')
                        .default_value("monthly")
                        .value_parser(["monthly", "daily"])
                        .help("Panel rows per month or per active day"),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("budget")
                .about("Budget ledger summaries")
                .subcommand_required(true)
                .subcommand(
                    Command::new("summary")
                        .about("Totals and grouped sums")
                        .arg(Arg::new("file").long("file").required(true))
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include prospected and cancelled lines"),
                        )
                        .arg(
                            Arg::new("today")
                                .long("today")
                                .help("Reference date for automatic executions (YYYY-MM-DD)"),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("expand")
                        .about("Expand recurring lines over a year using their Freq column")
                        .arg(Arg::new("file").long("file").required(true))
                        .arg(Arg::new("year").long("year").required(true))
                        .arg(Arg::new("out").long("out").help("Write the expanded budget here"))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("nfse")
                .about("Service invoices (NFSe XML)")
                .subcommand_required(true)
                .subcommand(
                    Command::new("show")
                        .about("Show one invoice")
                        .arg(Arg::new("file").long("file").required(true))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("catalog")
                        .about("List every invoice in a folder")
                        .arg(folder_arg().required(true))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("payroll")
                .about("INSS and IRRF withholding for a gross salary (2025 tables)")
                .arg(Arg::new("gross").long("gross").required(true))
                .args(json_args()),
        )
}
