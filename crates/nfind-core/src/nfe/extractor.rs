//! NFe fact extraction using namespace-aware streaming XML parsing.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::Result;
use super::cnpj::format_cnpj;
use crate::error::NfeError;

/// Namespace URI qualifying every element of an NFe document.
pub const NFE_NAMESPACE: &str = "http://www.portalfiscal.inf.br/nfe";

/// Facts collected from one NFe document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfeFacts {
    /// Invoice access key (`infNFe@Id`).
    pub access_key: Option<String>,

    /// Issuer facts (`emit`).
    pub issuer: PartyFacts,

    /// Recipient facts (`dest`); the node is optional in the source.
    pub recipient: PartyFacts,

    /// Line items (`det/prod`), in document order.
    pub items: Vec<ItemFacts>,

    /// Grand total (`ICMSTot/vNF`).
    pub total: Option<String>,
}

/// Legal name and tax id of an invoice party.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyFacts {
    pub name: Option<String>,
    pub cnpj: Option<String>,
}

/// Product facts for one line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFacts {
    pub code: Option<String>,
    pub description: Option<String>,
    pub ncm: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
}

impl NfeFacts {
    /// Render the canonical searchable text.
    ///
    /// Lines appear in the order key, issuer, recipient, items, total;
    /// absent fields are omitted entirely, never replaced by placeholders.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        if let Some(key) = &self.access_key {
            lines.push(format!("Chave: {}", key));
        }

        push_party_lines(&mut lines, &self.issuer, "Emitente");
        push_party_lines(&mut lines, &self.recipient, "Destinatário");

        for item in &self.items {
            let fields: Vec<String> = [
                item.code.as_ref().map(|v| format!("Código: {}", v)),
                item.description.as_ref().map(|v| format!("Produto: {}", v)),
                item.ncm.as_ref().map(|v| format!("NCM: {}", v)),
                item.quantity.as_ref().map(|v| format!("Qtd: {}", v)),
                item.unit_price.as_ref().map(|v| format!("Valor: {}", v)),
            ]
            .into_iter()
            .flatten()
            .collect();

            if !fields.is_empty() {
                lines.push(fields.join(" | "));
            }
        }

        if let Some(total) = &self.total {
            lines.push(format!("Valor Total NF: {}", total));
        }

        lines.join("\n")
    }
}

fn push_party_lines(lines: &mut Vec<String>, party: &PartyFacts, label: &str) {
    if let Some(name) = &party.name {
        lines.push(format!("{}: {}", label, name));
    }
    if let Some(cnpj) = &party.cnpj {
        lines.push(format!("CNPJ {}: {}", label, cnpj));
        lines.push(format!("CNPJ {} Formatado: {}", label, format_cnpj(cnpj)));
    }
}

/// Extract the canonical searchable text from NFe XML bytes.
pub fn extract_text(data: &[u8]) -> Result<String> {
    parse_facts(data).map(|facts| facts.render())
}

/// Parse NFe bytes into structured facts.
///
/// Only elements bound to [`NFE_NAMESPACE`] contribute; a well-formed
/// document in a foreign namespace yields empty facts rather than an
/// error.
pub fn parse_facts(data: &[u8]) -> Result<NfeFacts> {
    let mut reader = NsReader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut facts = NfeFacts::default();
    // Open elements: (local name, bound to the NFe namespace).
    let mut stack: Vec<(Vec<u8>, bool)> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let (ns, local) = reader.resolve_element(e.name());
                let in_nfe =
                    matches!(ns, ResolveResult::Bound(Namespace(n)) if n == NFE_NAMESPACE.as_bytes());
                let local = local.as_ref().to_vec();

                if in_nfe {
                    match local.as_slice() {
                        b"infNFe" => {
                            if let Some(attr) = e.try_get_attribute("Id").map_err(parse_err)? {
                                let key = attr.unescape_value().map_err(parse_err)?;
                                facts.access_key = Some(key.into_owned());
                            }
                        }
                        b"prod" if parent_is(&stack, b"det") => {
                            facts.items.push(ItemFacts::default());
                        }
                        _ => {}
                    }
                }

                stack.push((local, in_nfe));
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                let value = t.unescape().map_err(parse_err)?;
                let value = value.trim();
                if !value.is_empty() {
                    record_text(&mut facts, &stack, value);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(NfeError::Parse(e.to_string())),
        }
        buf.clear();
    }

    Ok(facts)
}

fn parse_err(e: impl std::fmt::Display) -> NfeError {
    NfeError::Parse(e.to_string())
}

fn parent_is(stack: &[(Vec<u8>, bool)], name: &[u8]) -> bool {
    stack
        .last()
        .map(|(local, in_nfe)| *in_nfe && local == name)
        .unwrap_or(false)
}

/// Route one text node to the fact it belongs to, keyed on its enclosing
/// element and that element's parent.
fn record_text(facts: &mut NfeFacts, stack: &[(Vec<u8>, bool)], value: &str) {
    let n = stack.len();
    if n < 2 {
        return;
    }

    let (element, element_in_nfe) = &stack[n - 1];
    let (parent, parent_in_nfe) = &stack[n - 2];
    if !element_in_nfe || !parent_in_nfe {
        return;
    }

    match (parent.as_slice(), element.as_slice()) {
        (b"emit", b"xNome") => facts.issuer.name = Some(value.to_string()),
        (b"emit", b"CNPJ") => facts.issuer.cnpj = Some(value.to_string()),
        (b"dest", b"xNome") => facts.recipient.name = Some(value.to_string()),
        (b"dest", b"CNPJ") => facts.recipient.cnpj = Some(value.to_string()),
        (b"prod", field) if n >= 3 && stack[n - 3].0 == b"det" => {
            if let Some(item) = facts.items.last_mut() {
                match field {
                    b"cProd" => item.code = Some(value.to_string()),
                    b"xProd" => item.description = Some(value.to_string()),
                    b"NCM" => item.ncm = Some(value.to_string()),
                    b"qCom" => item.quantity = Some(value.to_string()),
                    b"vUnCom" => item.unit_price = Some(value.to_string()),
                    _ => {}
                }
            }
        }
        (b"ICMSTot", b"vNF") => facts.total = Some(value.to_string()),
        _ => {}
    }
}
