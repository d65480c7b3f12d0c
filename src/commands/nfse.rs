// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::nfse::{CatalogRow, Invoice, catalog};
use crate::utils::{
    data_folder, file_name, find_files, fmt_money, maybe_print_json, money_table, pretty_table,
    required,
};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn na(v: &Option<String>) -> String {
    v.clone().unwrap_or_else(|| "N/A".to_string())
}

pub fn load_invoice(path: &Path) -> Result<Invoice> {
    let file = File::open(path).with_context(|| format!("Open {}", path.display()))?;
    Invoice::from_reader(BufReader::new(file))
        .with_context(|| format!("Parse NFSe {}", path.display()))
}

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(sub).map(|_| ()),
        Some(("catalog", sub)) => list(settings, sub).map(|_| ()),
        _ => Ok(()),
    }
}

pub fn show(sub: &clap::ArgMatches) -> Result<Invoice> {
    let path = Path::new(required(sub, "file")?.trim()).to_path_buf();
    let inv = load_invoice(&path)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &inv)? {
        return Ok(inv);
    }

    let e = &inv.emitter;
    let t = &inv.taker;
    let rows = vec![
        vec!["NFSe ID".into(), inv.id.clone()],
        vec!["Local de Emissão".into(), inv.issue_location.clone()],
        vec!["Local de Prestação".into(), inv.service_location.clone()],
        vec!["Número da NFSe".into(), inv.number.clone()],
        vec!["Código de Local de Incidência".into(), inv.incidence_code.clone()],
        vec!["Descrição do Serviço".into(), inv.tax_description.clone()],
        vec!["Valor Líquido".into(), fmt_money(&inv.net_value)],
        vec!["Data do Processo".into(), inv.processed_at.clone()],
        vec!["Data Competência".into(), inv.competence.to_string()],
        vec!["Prestador".into(), inv.emitter_label()],
        vec![
            "  Endereço".into(),
            format!(
                "{}, {} - {} - {}/{} - CEP {}",
                na(&e.address.street),
                na(&e.address.number),
                na(&e.address.district),
                na(&e.address.city),
                na(&e.address.state),
                na(&e.address.postal_code)
            ),
        ],
        vec!["  Telefone".into(), na(&e.phone)],
        vec!["  Email".into(), na(&e.email)],
        vec!["Tomador".into(), inv.taker_label()],
        vec![
            "  Endereço".into(),
            format!(
                "{}, {} {} - {} - {} - CEP {}",
                na(&t.address.street),
                na(&t.address.number),
                t.address.complement.clone().unwrap_or_default(),
                na(&t.address.district),
                na(&t.address.city),
                na(&t.address.postal_code)
            ),
        ],
        vec!["Código do Serviço".into(), inv.service.code.clone()],
        vec!["Descrição".into(), inv.service.description.clone()],
        vec!["Valor do Serviço".into(), fmt_money(&inv.service.value)],
        vec!["Tributos SN (%)".into(), inv.service.simples_tax_pct.to_string()],
    ];
    println!("{}", pretty_table(&["Campo", "Valor"], rows));
    Ok(inv)
}

pub fn list(settings: &Settings, sub: &clap::ArgMatches) -> Result<Vec<CatalogRow>> {
    let folder = data_folder(settings, sub.get_one::<String>("folder"))?;
    let mut invoices = Vec::new();
    for path in find_files(&folder, "", ".xml")? {
        let stem = file_name(&path).trim_end_matches(".xml").to_string();
        invoices.push((format!("NFSe_{}", stem), load_invoice(&path)?));
    }
    let rows = catalog(&invoices);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(rows);
    }
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.source.clone(),
                r.date.to_string(),
                r.number.clone(),
                r.emitter.clone(),
                r.taker.clone(),
                r.service_id.clone(),
                fmt_money(&r.service_value),
                r.simples_tax_pct.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        money_table(
            &[
                "Name",
                "Date",
                "Number",
                "Prestador",
                "Tomador",
                "ServicoID",
                "ValorServico",
                "PTributoSN",
            ],
            data,
            6,
        )
    );
    Ok(rows)
}
