// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! National service invoices (NFSe) in the SPED XML layout.
//!
//! The document is first read into a small element tree with namespaces
//! resolved, then queried with `.//a/b` style paths in the NFSe namespace.

use crate::error::{Error, Result};
use crate::value::{ValueRule, parse_value};
use chrono::NaiveDate;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::debug;

pub const NFSE_NS: &str = "http://www.sped.fazenda.gov.br/nfse";

/// Simples Nacional rate assumed when the invoice does not state one.
pub const DEFAULT_SIMPLES_PCT: Decimal = Decimal::from_parts(60, 0, 0, false, 1);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn is(&self, ns: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(ns)
    }

    fn descendants<'a>(&'a self, out: &mut Vec<&'a XmlElement>) {
        for c in &self.children {
            out.push(c);
            c.descendants(out);
        }
    }

    fn walk<'a, 'p, I>(&'a self, ns: &str, mut steps: I) -> Option<&'a XmlElement>
    where
        I: Iterator<Item = &'p str> + Clone,
    {
        let Some(step) = steps.next() else {
            return Some(self);
        };
        self.children
            .iter()
            .filter(|c| c.is(ns, step))
            .find_map(|c| c.walk(ns, steps.clone()))
    }

    /// First element matching `path`, in document order.
    ///
    /// `a/b` walks children; a leading `.//` lets the first step match at
    /// any depth below `self`.
    pub fn find(&self, ns: &str, path: &str) -> Option<&XmlElement> {
        match path.strip_prefix(".//") {
            Some(rest) => {
                let mut steps = rest.split('/');
                let first = steps.next()?;
                let mut all = Vec::new();
                self.descendants(&mut all);
                all.into_iter()
                    .filter(|e| e.is(ns, first))
                    .find_map(|e| e.walk(ns, steps.clone()))
            }
            None => self.walk(ns, path.split('/')),
        }
    }

    pub fn find_text(&self, ns: &str, path: &str) -> Option<&str> {
        self.find(ns, path).map(|e| e.text.as_str())
    }
}

fn xml<E: std::fmt::Display>(e: E) -> Error {
    Error::Xml(e.to_string())
}

fn element_from(ns: ResolveResult<'_>, e: &BytesStart<'_>) -> Result<XmlElement> {
    let namespace = match ns {
        ResolveResult::Bound(n) => Some(String::from_utf8_lossy(n.as_ref()).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(p) => {
            return Err(Error::Xml(format!(
                "unknown namespace prefix '{}'",
                String::from_utf8_lossy(&p)
            )));
        }
    };
    let mut attributes = Vec::new();
    for a in e.attributes() {
        let a = a.map_err(xml)?;
        let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
        let value = a.unescape_value().map_err(xml)?.into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        namespace,
        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

/// Read a whole XML document into an element tree.
pub fn parse_document<R: BufRead>(r: R) -> Result<XmlElement> {
    let mut reader = NsReader::from_reader(r);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf).map_err(xml)? {
            (ns, Event::Start(e)) => stack.push(element_from(ns, &e)?),
            (ns, Event::Empty(e)) => {
                let el = element_from(ns, &e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(el),
                    None => root = Some(el),
                }
            }
            (_, Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape().map_err(xml)?);
                }
            }
            (_, Event::CData(t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            (_, Event::End(_)) => {
                let done = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("unbalanced closing tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => root = Some(done),
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unexpected end of document".into()));
    }
    root.ok_or_else(|| Error::Xml("empty document".into()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub district: Option<String>,
    /// IBGE municipality code.
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub cnpj: Option<String>,
    pub nif: Option<String>,
    pub name: String,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub code: String,
    pub description: String,
    pub value: Decimal,
    pub simples_tax_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub issue_location: String,
    pub service_location: String,
    pub number: String,
    pub incidence_code: String,
    pub tax_description: String,
    pub net_value: Decimal,
    pub processed_at: String,
    pub competence: NaiveDate,
    pub emitter: Party,
    pub taker: Party,
    pub service: Service,
}

fn required<'a>(el: &'a XmlElement, path: &str) -> Result<&'a XmlElement> {
    el.find(NFSE_NS, path)
        .ok_or_else(|| Error::MissingElement(path.trim_start_matches(".//").to_string()))
}

fn required_text(el: &XmlElement, path: &str) -> Result<String> {
    required(el, path).map(|e| e.text.clone())
}

fn optional_text(el: &XmlElement, path: &str) -> Option<String> {
    el.find_text(NFSE_NS, path).map(str::to_string)
}

fn decimal(el: &XmlElement, path: &str) -> Result<Decimal> {
    parse_value(&required_text(el, path)?, ValueRule::CommaDecimal)
}

impl Invoice {
    pub fn from_document(root: &XmlElement) -> Result<Self> {
        let inf = required(root, ".//infNFSe")?;
        let id = inf
            .attr("Id")
            .ok_or_else(|| Error::MissingElement("infNFSe@Id".into()))?
            .to_string();

        let competence_raw = required_text(root, ".//dCompet")?;
        let competence =
            NaiveDate::parse_from_str(competence_raw.trim(), "%Y-%m-%d").map_err(|_| {
                Error::DateFormat {
                    value: competence_raw.clone(),
                    line: None,
                    expected: "YYYY-MM-DD",
                }
            })?;

        let emit = required(root, ".//emit")?;
        let emitter = Party {
            cnpj: Some(required_text(emit, ".//CNPJ")?),
            nif: None,
            name: required_text(emit, ".//xNome")?,
            address: Address {
                street: Some(required_text(emit, ".//enderNac/xLgr")?),
                number: Some(required_text(emit, ".//enderNac/nro")?),
                complement: optional_text(emit, ".//enderNac/xCpl"),
                district: Some(required_text(emit, ".//enderNac/xBairro")?),
                city: Some(required_text(emit, ".//enderNac/cMun")?),
                state: Some(required_text(emit, ".//enderNac/UF")?),
                postal_code: Some(required_text(emit, ".//enderNac/CEP")?),
            },
            phone: Some(required_text(emit, ".//fone")?),
            email: Some(required_text(emit, ".//email")?),
        };

        let toma = required(root, ".//toma")?;
        let taker = Party {
            cnpj: optional_text(toma, ".//CNPJ"),
            nif: optional_text(toma, ".//NIF"),
            name: required_text(toma, ".//xNome")?,
            address: Address {
                street: optional_text(toma, ".//end/xLgr"),
                number: optional_text(toma, ".//end/nro"),
                complement: optional_text(toma, ".//end/xCpl"),
                district: optional_text(toma, ".//end/xBairro"),
                city: optional_text(toma, ".//end/endNac/cMun"),
                state: None,
                postal_code: optional_text(toma, ".//end/endNac/CEP"),
            },
            phone: optional_text(toma, ".//fone"),
            email: optional_text(toma, ".//email"),
        };

        let serv = required(root, ".//serv")?;
        let simples_tax_pct = match root.find(NFSE_NS, ".//valores/trib/totTrib/pTotTribSN") {
            Some(e) => parse_value(&e.text, ValueRule::CommaDecimal)?,
            None => DEFAULT_SIMPLES_PCT,
        };
        let service = Service {
            code: required_text(serv, ".//cServ/cTribNac")?,
            description: required_text(serv, ".//cServ/xDescServ")?,
            value: decimal(root, ".//valores/vServPrest/vServ")?,
            simples_tax_pct,
        };

        let invoice = Invoice {
            id,
            issue_location: required_text(root, ".//xLocEmi")?,
            service_location: required_text(root, ".//xLocPrestacao")?,
            number: required_text(root, ".//nNFSe")?,
            incidence_code: required_text(root, ".//cLocIncid")?,
            tax_description: required_text(root, ".//xTribNac")?,
            net_value: decimal(root, ".//vLiq")?,
            processed_at: required_text(root, ".//dhProc")?,
            competence,
            emitter,
            taker,
            service,
        };
        debug!(id = %invoice.id, number = %invoice.number, "parsed NFSe");
        Ok(invoice)
    }

    pub fn from_reader<R: BufRead>(r: R) -> Result<Self> {
        Self::from_document(&parse_document(r)?)
    }

    /// `CNPJ -- Name`
    pub fn emitter_label(&self) -> String {
        format!(
            "{} -- {}",
            self.emitter.cnpj.as_deref().unwrap_or_default(),
            self.emitter.name
        )
    }

    /// `CNPJ (CNPJ) -- Name`, `NIF (NIF) -- Name`, or just the name.
    pub fn taker_label(&self) -> String {
        match (&self.taker.cnpj, &self.taker.nif) {
            (Some(cnpj), _) => format!("{} (CNPJ) -- {}", cnpj, self.taker.name),
            (None, Some(nif)) => format!("{} (NIF) -- {}", nif, self.taker.name),
            (None, None) => self.taker.name.clone(),
        }
    }
}

/// One line per invoice in a folder listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub source: String,
    pub number: String,
    pub date: NaiveDate,
    pub emitter: String,
    pub taker: String,
    pub service_id: String,
    pub service_value: Decimal,
    pub simples_tax_pct: Decimal,
}

/// Catalog of `(source name, invoice)` pairs ordered by competence date.
pub fn catalog(invoices: &[(String, Invoice)]) -> Vec<CatalogRow> {
    let mut rows: Vec<CatalogRow> = invoices
        .iter()
        .map(|(source, inv)| CatalogRow {
            source: source.clone(),
            number: inv.number.clone(),
            date: inv.competence,
            emitter: inv.emitter_label(),
            taker: inv.taker_label(),
            service_id: inv.service.code.clone(),
            service_value: inv.service.value,
            simples_tax_pct: inv.service.simples_tax_pct,
        })
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.number.cmp(&b.number)));
    rows
}
