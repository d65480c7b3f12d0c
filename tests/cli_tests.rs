// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fluxo::cli;
use fluxo::commands;
use fluxo::config::Settings;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::{TempDir, tempdir};

const STATEMENT: &str = r#""Data","Lançamento","Detalhes","N° documento","Valor","Tipo Lançamento"
"31/12/2023","Saldo Anterior","","","1.000,00",""
"02/01/2024","Pix - Recebido","Maria","123","5.000,00","Entrada"
"03/01/2024","Pagamento de Boleto","Luz","456","-403,00","Saída"
"03/01/2024","Saldo do dia","","","5.597,00",""
"#;

const STATEMENT_FEB: &str = r#""Data","Lançamento","Detalhes","N° documento","Valor","Tipo Lançamento"
"05/02/2024","Tarifa","","","-12,50",""
"#;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn setup() -> (TempDir, String) {
    let dir = tempdir().unwrap();
    let year = dir.path().join("2024");
    fs::create_dir_all(&year).unwrap();
    fs::write(year.join("EXTRATO_BB_CC_2024-01_T0.csv"), STATEMENT).unwrap();
    fs::write(year.join("EXTRATO_BB_CC_2024-02_T0.csv"), STATEMENT_FEB).unwrap();
    fs::write(year.join("EXTRATO_BB_PP_2024-01_T0.csv"), "not a checking file").unwrap();
    fs::write(dir.path().join("SALDOS_BB_CC.csv"), "Year;Value\n2024;1.000,00\n").unwrap();
    let folder = dir.path().to_string_lossy().to_string();
    (dir, folder)
}

fn run_parse(folder: &str) -> commands::parse::ParseOutcome {
    let m = cli::build_cli()
        .get_matches_from(["fluxo", "parse", "--folder", folder, "--type", "bb-cc"]);
    let (_, sub) = m.subcommand().unwrap();
    commands::parse::run(&Settings::default(), sub).unwrap()
}

fn run_cashflow(folder: &str, settings: &Settings) -> Vec<std::path::PathBuf> {
    let m = cli::build_cli().get_matches_from(["fluxo", "cashflow", "-f", folder, "-t", "bb-cc"]);
    let (_, sub) = m.subcommand().unwrap();
    commands::cashflow::run(settings, sub).unwrap()
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn parse_writes_canonical_files_once() {
    let (dir, folder) = setup();

    let first = run_parse(&folder);
    assert_eq!(first.written.len(), 2);
    assert!(first.skipped.is_empty());

    let t1 = dir.path().join("2024").join("EXTRATO_BB_CC_2024-01_T1.csv");
    let content = lines(&t1);
    assert_eq!(
        content[0],
        "Data;Valor;Categoria;Descricao;Lancamento;Detalhes;Documento"
    );
    assert_eq!(content.len(), 3);
    assert_eq!(content[1], "2024-01-02;5000.00;;;Pix - Recebido;Maria;123");

    fs::write(&t1, "edited by hand").unwrap();
    let second = run_parse(&folder);
    assert!(second.written.is_empty());
    assert_eq!(second.skipped.len(), 2);
    assert_eq!(fs::read_to_string(&t1).unwrap(), "edited by hand");
}

#[test]
fn cashflow_writes_yearly_and_merged_tables() {
    let (dir, folder) = setup();
    run_parse(&folder);

    let mut settings = Settings::default();
    settings
        .categories
        .insert("bb-cc".into(), vec!["Mercado".into()]);
    let written = run_cashflow(&folder, &settings);

    let year = dir.path().join("2024");
    for name in [
        "CAIXA_BB_CC_2024_DIARIO.csv",
        "CAIXA_BB_CC_2024_MENSAL.csv",
        "CAIXA_BB_CC_2024_ANUAL.csv",
        "CAIXA_BB_CC_2024_MENSAL-MERCADO.csv",
        "CAIXA_BB_CC_2024_ANUAL-MERCADO.csv",
    ] {
        assert!(written.contains(&year.join(name)), "{}", name);
    }
    for name in [
        "CAIXA_BB_CC_O_DIARIO.csv",
        "CAIXA_BB_CC_O_MENSAL.csv",
        "CAIXA_BB_CC_O_ANUAL.csv",
    ] {
        assert!(dir.path().join(name).is_file(), "{}", name);
    }

    assert_eq!(lines(&year.join("CAIXA_BB_CC_2024_DIARIO.csv")).len(), 4);
    let monthly = lines(&year.join("CAIXA_BB_CC_2024_MENSAL.csv"));
    assert_eq!(monthly.len(), 13);
    assert_eq!(
        monthly[2],
        "2024;2024-02;Geral;0.00;0;-12.50;1;-12.50;5000.00;-415.50;4584.50"
    );
    let annual = lines(&dir.path().join("CAIXA_BB_CC_O_ANUAL.csv"));
    assert_eq!(
        annual[1],
        "2024;Geral;5000.00;1;-415.50;2;4584.50;5000.00;-415.50;4584.50"
    );
    // No Mercado records, so the category panel is empty.
    assert_eq!(lines(&year.join("CAIXA_BB_CC_2024_MENSAL-MERCADO.csv")).len(), 1);
}

fn setup_two_years() -> (TempDir, String) {
    let dir = tempdir().unwrap();
    let header = r#""Data","Lançamento","Detalhes","N° documento","Valor","Tipo Lançamento""#;
    for (year, row) in [
        ("2023", r#""10/03/2023","Pix - Recebido","Ana","1","100,00","Entrada""#),
        ("2024", r#""15/06/2024","Pix - Recebido","Ana","2","50,00","Entrada""#),
    ] {
        let year_dir = dir.path().join(year);
        fs::create_dir_all(&year_dir).unwrap();
        fs::write(
            year_dir.join(format!("EXTRATO_BB_CC_{}-01_T0.csv", year)),
            format!("{}\n{}\n", header, row),
        )
        .unwrap();
    }
    let folder = dir.path().to_string_lossy().to_string();
    run_parse(&folder);
    run_cashflow(&folder, &Settings::default());
    (dir, folder)
}

#[test]
fn merged_annual_table_accumulates_across_years() {
    let (dir, _folder) = setup_two_years();

    let annual = lines(&dir.path().join("CAIXA_BB_CC_O_ANUAL.csv"));
    assert_eq!(annual.len(), 3);
    assert_eq!(annual[1], "2023;Geral;100.00;1;0.00;0;100.00;100.00;0.00;100.00");
    assert_eq!(annual[2], "2024;Geral;50.00;1;0.00;0;50.00;150.00;0.00;150.00");

    // Monthly cumulatives in the merged table still restart each January.
    let monthly = lines(&dir.path().join("CAIXA_BB_CC_O_MENSAL.csv"));
    assert_eq!(monthly.len(), 25);
    assert_eq!(
        monthly[13],
        "2024;2024-01;Geral;0.00;0;0.00;0;0.00;0.00;0.00;0.00"
    );
    assert_eq!(
        monthly[24],
        "2024;2024-12;Geral;0.00;0;0.00;0;0.00;50.00;0.00;50.00"
    );
}

#[test]
fn cashflow_without_inputs_writes_nothing() {
    let dir = tempdir().unwrap();
    let folder = dir.path().to_string_lossy().to_string();
    let written = run_cashflow(&folder, &Settings::default());
    assert!(written.is_empty());
    assert!(!dir.path().join("CAIXA_BB_CC_O_ANUAL.csv").exists());
}

#[test]
fn report_closes_on_opening_plus_net() {
    let (dir, folder) = setup();
    run_parse(&folder);
    run_cashflow(&folder, &Settings::default());

    let m = cli::build_cli().get_matches_from([
        "fluxo", "report", "-f", folder.as_str(), "-t", "bb-cc", "-y", "2024", "--json",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    let reports = commands::report::run(&Settings::default(), sub).unwrap();
    assert_eq!(reports.len(), 1);
    let s = &reports[0].summary;
    assert_eq!(s.opening_balance, d("1000"));
    assert_eq!(s.net, d("4584.50"));
    assert_eq!(s.closing_balance, d("5584.50"));
    assert_eq!(reports[0].panel.len(), 12);

    let summary = lines(&dir.path().join("2024").join("SUMMARY_BB_CC_2024.csv"));
    assert_eq!(summary[1], "2024;1000.00;5000.00;-415.50;4584.50;5584.50");
    assert!(dir.path().join("2024").join("REPORT_BB_CC_2024.csv").is_file());

    let m = cli::build_cli().get_matches_from([
        "fluxo", "report", "-f", folder.as_str(), "-t", "bb-cc", "-g", "daily", "--json",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    let reports = commands::report::run(&Settings::default(), sub).unwrap();
    let balances: Vec<Decimal> = reports[0].panel.iter().map(|p| p.balance).collect();
    assert_eq!(balances, vec![d("6000"), d("5597"), d("5584.50")]);
}

#[test]
fn report_rejects_unknown_year_and_missing_balance() {
    let (dir, folder) = setup();
    run_parse(&folder);
    run_cashflow(&folder, &Settings::default());

    let m = cli::build_cli().get_matches_from([
        "fluxo", "report", "-f", folder.as_str(), "-t", "bb-cc", "-y", "2030",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    let err = commands::report::run(&Settings::default(), sub).unwrap_err();
    assert!(err.to_string().contains("Available years: [2024]"));

    fs::write(dir.path().join("SALDOS_BB_CC.csv"), "Year;Value\n2023;10,00\n").unwrap();
    let m = cli::build_cli()
        .get_matches_from(["fluxo", "report", "-f", folder.as_str(), "-t", "bb-cc"]);
    let (_, sub) = m.subcommand().unwrap();
    let err = commands::report::run(&Settings::default(), sub).unwrap_err();
    assert!(format!("{:#}", err).contains("2024"));
}

#[test]
fn report_checks_every_balance_before_writing() {
    let (dir, folder) = setup_two_years();
    fs::write(dir.path().join("SALDOS_BB_CC.csv"), "Year;Value\n2023;0,00\n").unwrap();

    let m = cli::build_cli()
        .get_matches_from(["fluxo", "report", "-f", folder.as_str(), "-t", "bb-cc"]);
    let (_, sub) = m.subcommand().unwrap();
    let err = commands::report::run(&Settings::default(), sub).unwrap_err();
    assert!(format!("{:#}", err).contains("2024"));
    assert!(!dir.path().join("2023").join("REPORT_BB_CC_2023.csv").exists());
    assert!(!dir.path().join("2023").join("SUMMARY_BB_CC_2023.csv").exists());
}

#[test]
fn budget_commands_summarize_and_expand() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("orcamento.csv");
    fs::write(
        &file,
        "Type;Status;Contract;Name;Value;Date_Due;Method;Freq\n\
         Revenue;Executed;ACME;Consulting;5000,00;2025-01-10;Transfer;\n\
         Expense;Expected;Landlord;Rent;1500,00;2025-01-05;Automatic;ME\n",
    )
    .unwrap();
    let file = file.to_string_lossy().to_string();
    let out = dir.path().join("expandido.csv");
    let out_arg = out.to_string_lossy().to_string();

    let m = cli::build_cli().get_matches_from([
        "fluxo", "budget", "summary", "--file", file.as_str(), "--today", "2025-02-01", "--json",
    ]);
    let (_, budget) = m.subcommand().unwrap();
    let (_, sub) = budget.subcommand().unwrap();
    let summary = commands::budget::summary(&Settings::default(), sub).unwrap();
    assert_eq!(summary.totals.net, d("3500"));
    assert_eq!(summary.by_status, vec![("Executed".to_string(), d("3500"))]);

    let m = cli::build_cli().get_matches_from([
        "fluxo",
        "budget",
        "expand",
        "--file",
        file.as_str(),
        "--year",
        "2025",
        "--out",
        out_arg.as_str(),
        "--json",
    ]);
    let (_, budget) = m.subcommand().unwrap();
    let (_, sub) = budget.subcommand().unwrap();
    let expanded = commands::budget::expand(&Settings::default(), sub).unwrap();
    assert_eq!(expanded.len(), 13);
    assert_eq!(lines(&out).len(), 14);
}
