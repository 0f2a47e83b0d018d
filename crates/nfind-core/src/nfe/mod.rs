//! NFe XML processing module.

pub mod cnpj;
mod extractor;

pub use cnpj::{format_cnpj, normalize_cnpj};
pub use extractor::{ItemFacts, NFE_NAMESPACE, NfeFacts, PartyFacts, extract_text, parse_facts};

use crate::error::NfeError;

/// Result type for NFe operations.
pub type Result<T> = std::result::Result<T, NfeError>;
