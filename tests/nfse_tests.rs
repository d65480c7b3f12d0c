// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fluxo::cli;
use fluxo::commands;
use fluxo::config::Settings;
use fluxo::error::Error;
use fluxo::nfse::{DEFAULT_SIMPLES_PCT, Invoice, NFSE_NS, catalog, parse_document};
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use tempfile::tempdir;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn invoice_xml(number: &str, competence: &str, taker: &str, trib: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<NFSe xmlns="http://www.sped.fazenda.gov.br/nfse" versao="1.00">
  <infNFSe Id="NFS{number}">
    <xLocEmi>Porto Alegre</xLocEmi>
    <xLocPrestacao>Porto Alegre</xLocPrestacao>
    <nNFSe>{number}</nNFSe>
    <cLocIncid>4314902</cLocIncid>
    <xTribNac>Desenvolvimento de programas</xTribNac>
    <dhProc>2025-03-10T10:00:00-03:00</dhProc>
    <emit>
      <CNPJ>12345678000199</CNPJ>
      <xNome>Fluxo Consultoria LTDA</xNome>
      <enderNac>
        <xLgr>Rua A</xLgr>
        <nro>100</nro>
        <xBairro>Centro</xBairro>
        <cMun>4314902</cMun>
        <UF>RS</UF>
        <CEP>90000000</CEP>
      </enderNac>
      <fone>5133334444</fone>
      <email>contato@example.com</email>
    </emit>
    <valores>
      <vLiq>4700.00</vLiq>
    </valores>
    <DPS>
      <infDPS>
        <dCompet>{competence}</dCompet>
        <toma>{taker}</toma>
        <serv>
          <cServ>
            <cTribNac>010101</cTribNac>
            <xDescServ>Consultoria em TI &amp; suporte</xDescServ>
          </cServ>
        </serv>
        <valores>
          <vServPrest><vServ>5000.00</vServ></vServPrest>
          {trib}
        </valores>
      </infDPS>
    </DPS>
  </infNFSe>
  <Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo/></Signature>
</NFSe>
"#
    )
}

const FOREIGN_TAKER: &str = "<NIF>987654</NIF><xNome>Foreign Client Inc</xNome>";
const LOCAL_TAKER: &str = "<CNPJ>11222333000144</CNPJ><xNome>Cliente Local SA</xNome>\
<end><xLgr>Av B</xLgr><nro>5</nro><xBairro>Moinhos</xBairro>\
<endNac><cMun>4314902</cMun><CEP>90500000</CEP></endNac></end>";
const SIMPLES_4_5: &str = "<trib><totTrib><pTotTribSN>4.50</pTotTribSN></totTrib></trib>";

#[test]
fn parses_invoice_fields() {
    let xml = invoice_xml("42", "2025-03-01", FOREIGN_TAKER, "");
    let inv = Invoice::from_reader(xml.as_bytes()).unwrap();

    assert_eq!(inv.id, "NFS42");
    assert_eq!(inv.number, "42");
    assert_eq!(inv.issue_location, "Porto Alegre");
    assert_eq!(inv.incidence_code, "4314902");
    assert_eq!(inv.net_value, d("4700"));
    assert_eq!(inv.competence, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    assert_eq!(inv.emitter.address.state.as_deref(), Some("RS"));
    assert_eq!(inv.emitter.address.complement, None);
    assert_eq!(inv.service.code, "010101");
    assert_eq!(inv.service.description, "Consultoria em TI & suporte");
    assert_eq!(inv.service.value, d("5000"));
    assert_eq!(inv.service.simples_tax_pct, DEFAULT_SIMPLES_PCT);
    assert_eq!(inv.service.simples_tax_pct, d("6.0"));
}

#[test]
fn party_labels_name_the_identifier() {
    let foreign = Invoice::from_reader(invoice_xml("1", "2025-01-01", FOREIGN_TAKER, "").as_bytes())
        .unwrap();
    assert_eq!(foreign.emitter_label(), "12345678000199 -- Fluxo Consultoria LTDA");
    assert_eq!(foreign.taker_label(), "987654 (NIF) -- Foreign Client Inc");

    let local =
        Invoice::from_reader(invoice_xml("2", "2025-01-01", LOCAL_TAKER, SIMPLES_4_5).as_bytes())
            .unwrap();
    assert_eq!(local.taker_label(), "11222333000144 (CNPJ) -- Cliente Local SA");
    assert_eq!(local.taker.address.city.as_deref(), Some("4314902"));
    assert_eq!(local.service.simples_tax_pct, d("4.5"));

    let anonymous =
        Invoice::from_reader(invoice_xml("3", "2025-01-01", "<xNome>Fulano</xNome>", "").as_bytes())
            .unwrap();
    assert_eq!(anonymous.taker_label(), "Fulano");
}

#[test]
fn missing_required_element_is_reported() {
    let xml = invoice_xml("42", "2025-03-01", FOREIGN_TAKER, "")
        .replace("<nNFSe>42</nNFSe>", "");
    match Invoice::from_reader(xml.as_bytes()) {
        Err(Error::MissingElement(path)) => assert_eq!(path, "nNFSe"),
        other => panic!("unexpected: {:?}", other),
    }

    assert!(matches!(
        Invoice::from_reader("<NFSe><infNFSe>".as_bytes()),
        Err(Error::Xml(_))
    ));
}

#[test]
fn lookups_respect_namespaces() {
    let doc = parse_document(
        r#"<a xmlns="urn:x"><b xmlns="urn:y">1</b><c><b>2</b></c></a>"#.as_bytes(),
    )
    .unwrap();
    assert_eq!(doc.find_text("urn:x", ".//b"), Some("2"));
    assert_eq!(doc.find_text("urn:y", "b"), Some("1"));
    assert_eq!(doc.find_text("urn:x", "c/b"), Some("2"));
    assert_eq!(doc.find_text("urn:x", "b"), None);
    assert!(doc.find(NFSE_NS, ".//b").is_none());
}

#[test]
fn catalog_orders_by_competence() {
    let later = Invoice::from_reader(invoice_xml("7", "2025-05-01", LOCAL_TAKER, "").as_bytes())
        .unwrap();
    let earlier =
        Invoice::from_reader(invoice_xml("9", "2025-02-01", FOREIGN_TAKER, "").as_bytes()).unwrap();
    let rows = catalog(&[("NFSe_b".into(), later), ("NFSe_a".into(), earlier)]);
    assert_eq!(rows[0].number, "9");
    assert_eq!(rows[0].source, "NFSe_a");
    assert_eq!(rows[1].taker, "11222333000144 (CNPJ) -- Cliente Local SA");
}

#[test]
fn catalog_command_reads_a_folder() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("0042.xml"),
        invoice_xml("42", "2025-03-01", FOREIGN_TAKER, ""),
    )
    .unwrap();
    fs::write(
        dir.path().join("0043.xml"),
        invoice_xml("43", "2025-01-15", LOCAL_TAKER, SIMPLES_4_5),
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let folder = dir.path().to_string_lossy().to_string();
    let matches = cli::build_cli().get_matches_from([
        "fluxo",
        "nfse",
        "catalog",
        "--folder",
        folder.as_str(),
    ]);
    let (_, nfse) = matches.subcommand().unwrap();
    let (_, sub) = nfse.subcommand().unwrap();
    let rows = commands::nfse::list(&Settings::default(), sub).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].source, "NFSe_0043");
    assert_eq!(rows[1].simples_tax_pct, d("6.0"));
}
