//! Word classification: fixed keyword, contextual keyword, or identifier.
//!
//! Only ES5 keywords and `import` are fixed. QML keywords (`property`,
//! `signal`, `readonly`, `alias`, `as`, `pragma`) and the primitive type names
//! stay identifiers so that JavaScript using them as names keeps working; the
//! grammar asks for a keyword reading explicitly where one is possible.

use rqml_ast::syntax_kind::{ContextualKeyword, SyntaxKind};

/// What a word read from the input is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    Keyword(SyntaxKind),
    Contextual(ContextualKeyword),
    Identifier,
}

pub fn classify_word(word: &str) -> WordClass {
    if let Some(kind) = SyntaxKind::from_keyword(word) {
        WordClass::Keyword(kind)
    } else if let Some(kw) = ContextualKeyword::from_word(word) {
        WordClass::Contextual(kw)
    } else {
        WordClass::Identifier
    }
}

/// Words reserved by ES5 in every mode.
pub fn is_reserved_word(word: &str) -> bool {
    matches!(word, "class" | "const" | "enum" | "export" | "extends" | "super")
}

/// Words reserved by ES5 strict mode.
pub fn is_strict_reserved_word(word: &str) -> bool {
    matches!(
        word,
        "implements" | "interface" | "let" | "package" | "private" | "protected" | "public" | "static" | "yield"
    )
}

/// ES3 future-reserved words that QML does not need as type names.
pub fn is_future_reserved_word(word: &str) -> bool {
    matches!(
        word,
        "transient"
            | "synchronized"
            | "abstract"
            | "volatile"
            | "native"
            | "goto"
            | "byte"
            | "long"
            | "char"
            | "short"
            | "float"
    )
}

/// Which words may be used as binding identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRules {
    pub ecma_version: u32,
    /// Accept reserved words as identifiers.
    pub allow_reserved: bool,
}

impl IdentifierRules {
    pub fn new(ecma_version: u32, allow_reserved: bool) -> Self {
        Self {
            ecma_version,
            allow_reserved,
        }
    }

    /// Whether `word` must be rejected as an identifier.
    pub fn is_reserved(&self, word: &str) -> bool {
        if self.allow_reserved {
            return false;
        }
        // ES3 has no strict mode, so its strict list is ordinary names.
        is_reserved_word(word)
            || is_future_reserved_word(word)
            || (self.ecma_version >= 5 && is_strict_reserved_word(word))
    }
}

impl Default for IdentifierRules {
    fn default() -> Self {
        Self::new(5, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_word() {
        assert_eq!(classify_word("import"), WordClass::Keyword(SyntaxKind::ImportKeyword));
        assert_eq!(classify_word("property"), WordClass::Contextual(ContextualKeyword::Property));
        assert_eq!(classify_word("var"), WordClass::Contextual(ContextualKeyword::Var));
        assert_eq!(classify_word("Rectangle"), WordClass::Identifier);
    }

    #[test]
    fn test_reserved_rules() {
        let rules = IdentifierRules::default();
        assert!(rules.is_reserved("public"));
        assert!(rules.is_reserved("goto"));
        assert!(rules.is_reserved("export"));
        assert!(!rules.is_reserved("int"));
        assert!(!rules.is_reserved("property"));

        let es3 = IdentifierRules::new(3, false);
        assert!(!es3.is_reserved("public"));
        assert!(es3.is_reserved("goto"));

        let permissive = IdentifierRules::new(5, true);
        assert!(!permissive.is_reserved("public"));
    }
}
