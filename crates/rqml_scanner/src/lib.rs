//! rqml_scanner: Tokenizer for QML documents.
//!
//! Produces ES5 tokens from source text. Positions are character offsets.
//! QML keywords other than `import` are contextual and come out as
//! identifiers; [`classify`] decides what a word means and which words are
//! reserved.

mod char_codes;
pub mod classify;
mod scanner;
mod token;

pub use char_codes::{is_identifier_part, is_identifier_start};
pub use classify::{classify_word, IdentifierRules, WordClass};
pub use scanner::{numeric_value, ScanError, Scanner, ScannerState};
pub use token::{TokenInfo, TokenRecord};
