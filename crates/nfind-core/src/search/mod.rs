//! Query matching and snippet derivation over the index.

use serde::{Deserialize, Serialize};

use crate::index::IndexTable;
use crate::models::config::SearchConfig;
use crate::models::document::DocumentKind;

/// How a query term is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Plain case-insensitive substring search.
    Literal,
    /// Structured code search (CNPJ or NCM): the literal term or its
    /// digit subsequence may match.
    Code,
}

/// A parsed search query.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    raw: String,
    lowered: String,
    digits: String,
}

impl SearchQuery {
    /// Parse a raw term, extracting its digit subsequence.
    pub fn parse(term: &str) -> Self {
        Self {
            raw: term.to_string(),
            lowered: term.to_lowercase(),
            digits: term.chars().filter(|c| c.is_ascii_digit()).collect(),
        }
    }

    /// The term as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Terms with more than six digits look like a CNPJ or NCM code.
    pub fn kind(&self) -> QueryKind {
        if self.digits.len() > 6 {
            QueryKind::Code
        } else {
            QueryKind::Literal
        }
    }

    /// Literal containment against lower-cased text. Both operands are
    /// plain substrings; the term is never interpreted as pattern syntax.
    fn matches(&self, lowered_text: &str) -> bool {
        match self.kind() {
            QueryKind::Literal => lowered_text.contains(&self.lowered),
            QueryKind::Code => {
                lowered_text.contains(&self.lowered) || lowered_text.contains(&self.digits)
            }
        }
    }
}

/// One search result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Identity of the matched document.
    pub identity: String,

    /// Declared format of the matched document.
    pub kind: DocumentKind,

    /// Context around the first occurrence, when one could be located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Matches queries against an index table.
pub struct SearchEngine {
    context_chars: usize,
}

impl SearchEngine {
    /// Create an engine from the search configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            context_chars: config.context_chars,
        }
    }

    /// Return the matching subsequence of the table, in table order.
    ///
    /// An empty result is a valid outcome, not an error.
    pub fn search(&self, term: &str, table: &IndexTable) -> Vec<SearchHit> {
        if term.trim().is_empty() {
            return Vec::new();
        }

        let query = SearchQuery::parse(term);

        table
            .records()
            .iter()
            .filter_map(|record| {
                let lowered = record.text.to_lowercase();
                if !query.matches(&lowered) {
                    return None;
                }

                Some(SearchHit {
                    identity: record.identity.clone(),
                    kind: record.kind,
                    snippet: self.snippet(&lowered, &query),
                })
            })
            .collect()
    }

    /// Derive the context snippet around the first occurrence of the term.
    ///
    /// When only the digit subsequence matched, the snippet falls back to
    /// that occurrence instead of reporting nothing.
    fn snippet(&self, lowered_text: &str, query: &SearchQuery) -> Option<String> {
        let position = lowered_text.find(&query.lowered).or_else(|| {
            if query.kind() == QueryKind::Code {
                lowered_text.find(&query.digits)
            } else {
                None
            }
        })?;

        let begin = back_chars(lowered_text, position, self.context_chars);
        let end = forward_chars(lowered_text, position, self.context_chars);
        Some(format!("...{}...", &lowered_text[begin..end]))
    }
}

/// Byte index `count` characters before `from`, clamped to the start.
fn back_chars(text: &str, from: usize, count: usize) -> usize {
    let mut index = from;
    for _ in 0..count {
        match text[..index].chars().next_back() {
            Some(c) => index -= c.len_utf8(),
            None => break,
        }
    }
    index
}

/// Byte index `count` characters after `from`, clamped to the end.
fn forward_chars(text: &str, from: usize, count: usize) -> usize {
    let mut index = from;
    let mut chars = text[from..].chars();
    for _ in 0..count {
        match chars.next() {
            Some(c) => index += c.len_utf8(),
            None => break,
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::ExtractedRecord;
    use pretty_assertions::assert_eq;

    fn record(identity: &str, text: &str) -> ExtractedRecord {
        ExtractedRecord {
            identity: identity.to_string(),
            kind: DocumentKind::Xml,
            text: text.to_string(),
        }
    }

    fn table(records: Vec<ExtractedRecord>) -> IndexTable {
        IndexTable::from_records(records)
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(SearchConfig::default())
    }

    #[test]
    fn literal_query_is_case_insensitive() {
        let table = table(vec![record("a.xml", "Produto: parafuso 3mm")]);
        let hits = engine().search("Parafuso", &table);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identity, "a.xml");
    }

    #[test]
    fn literal_query_requires_containment() {
        let table = table(vec![record("a.xml", "Produto: fechadura")]);
        assert!(engine().search("Parafuso", &table).is_empty());
    }

    #[test]
    fn short_digit_terms_stay_literal() {
        // Six digits or fewer is not a code query.
        let query = SearchQuery::parse("123456");
        assert_eq!(query.kind(), QueryKind::Literal);

        let table = table(vec![record("a.xml", "CNPJ Emitente: 00123456000199")]);
        assert_eq!(engine().search("123456", &table).len(), 1);
    }

    #[test]
    fn formatted_cnpj_matches_raw_digits() {
        let table = table(vec![record("c.xml", "CNPJ Emitente: 12345678000195")]);
        let hits = engine().search("12.345.678/0001-95", &table);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identity, "c.xml");
    }

    #[test]
    fn raw_digits_match_formatted_text() {
        let table = table(vec![record("c.xml", "CNPJ: 12.345.678/0001-95")]);
        // The query digits alternative does not fire here (text is
        // formatted), but the literal formatted term does when queried.
        assert_eq!(engine().search("12.345.678/0001-95", &table).len(), 1);
        // And a raw-digit query matches nothing in formatted-only text.
        assert!(engine().search("12345678000195", &table).is_empty());
    }

    #[test]
    fn code_query_punctuation_is_not_pattern_syntax() {
        // "12.345.678/0001-95" must not match "12X345Y678..." the way an
        // unescaped "." pattern would.
        let table = table(vec![record("a.xml", "12x345x678/0001-95")]);
        assert!(engine().search("12.345.678/0001-95", &table).is_empty());
    }

    #[test]
    fn results_preserve_table_order() {
        let table = table(vec![
            record("b.xml", "parafuso grande"),
            record("a.xml", "parafuso pequeno"),
            record("c.xml", "fechadura"),
        ]);

        let identities: Vec<String> = engine()
            .search("parafuso", &table)
            .into_iter()
            .map(|h| h.identity)
            .collect();
        assert_eq!(identities, vec!["b.xml", "a.xml"]);
    }

    #[test]
    fn empty_term_matches_nothing() {
        let table = table(vec![record("a.xml", "parafuso")]);
        assert!(engine().search("", &table).is_empty());
        assert!(engine().search("   ", &table).is_empty());
    }

    #[test]
    fn snippet_brackets_the_match() {
        let table = table(vec![record("a.xml", "Produto: Parafuso 3mm")]);
        let hits = engine().search("Parafuso", &table);

        assert_eq!(hits[0].snippet.as_deref(), Some("...produto: parafuso 3mm..."));
    }

    #[test]
    fn snippet_clamps_long_context() {
        let text = format!("{}parafuso{}", "x".repeat(300), "y".repeat(300));
        let table = table(vec![record("a.xml", &text)]);

        let hits = engine().search("parafuso", &table);
        let snippet = hits[0].snippet.as_deref().unwrap();

        // 100 chars of left context, then 100 from the match start.
        assert_eq!(snippet.len(), 3 + 100 + 100 + 3);
        assert!(snippet.starts_with("...x"));
        assert!(snippet.contains("parafuso"));
    }

    #[test]
    fn snippet_respects_utf8_boundaries() {
        let text = format!("{}café{}", "é".repeat(150), "á".repeat(150));
        let table = table(vec![record("a.xml", &text)]);

        let hits = engine().search("café", &table);
        assert!(hits[0].snippet.is_some());
    }

    #[test]
    fn digits_only_match_falls_back_for_the_snippet() {
        let table = table(vec![record("c.xml", "CNPJ Emitente: 12345678000195")]);
        let hits = engine().search("12.345.678/0001-95", &table);

        let snippet = hits[0].snippet.as_deref().unwrap();
        assert!(snippet.contains("12345678000195"));
    }
}
