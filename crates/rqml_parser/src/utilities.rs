//! Parser utility functions shared by the strict and loose grammars.

use rqml_ast::syntax_kind::ContextualKeyword;

/// Columns a tab counts for when measuring indentation.
pub const TAB_SIZE: u32 = 4;

/// Split a `major.minor` version literal. Both groups must be plain decimal
/// digits, so `2.0` splits but `2`, `0x01` and `2e1` do not.
pub fn split_version(raw: &str) -> Option<(u32, u32)> {
    let (major, minor) = raw.split_once('.')?;
    if major.is_empty() || minor.is_empty() {
        return None;
    }
    if !major.bytes().all(|b| b.is_ascii_digit()) || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Whether a word names a builtin property type (`int`, `var`, `alias`, ...).
pub fn is_builtin_type_name(word: &str) -> bool {
    ContextualKeyword::from_word(word).is_some_and(ContextualKeyword::is_builtin_type)
}

/// Whether a word names a primitive property type.
pub fn is_primitive_type_name(word: &str) -> bool {
    ContextualKeyword::from_word(word).is_some_and(ContextualKeyword::is_primitive_type)
}

/// Indentation width of the line starting at `line_start`.
pub fn indentation_at(chars: &[char], line_start: usize) -> u32 {
    let mut width = 0;
    for &ch in chars.iter().skip(line_start) {
        match ch {
            ' ' => width += 1,
            '\t' => width += TAB_SIZE,
            _ => break,
        }
    }
    width
}

/// Whether only whitespace separates `line_start` from `pos`.
pub fn starts_line(chars: &[char], line_start: usize, pos: usize) -> bool {
    chars
        .get(line_start..pos)
        .map_or(true, |prefix| prefix.iter().all(|c| matches!(c, ' ' | '\t' | '\u{b}' | '\u{c}' | '\u{feff}')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_version() {
        assert_eq!(split_version("2.0"), Some((2, 0)));
        assert_eq!(split_version("2.02"), Some((2, 2)));
        assert_eq!(split_version("2"), None);
        assert_eq!(split_version("0x01"), None);
        assert_eq!(split_version(".5"), None);
        assert_eq!(split_version("1e2"), None);
    }

    #[test]
    fn test_indentation() {
        let chars: Vec<char> = "a\n\t  b".chars().collect();
        assert_eq!(indentation_at(&chars, 0), 0);
        assert_eq!(indentation_at(&chars, 2), 6);
        assert!(starts_line(&chars, 2, 5));
        assert!(!starts_line(&chars, 0, 1));
    }

    #[test]
    fn test_type_names() {
        assert!(is_builtin_type_name("alias"));
        assert!(is_primitive_type_name("int"));
        assert!(!is_primitive_type_name("alias"));
        assert!(!is_builtin_type_name("Item"));
    }
}
