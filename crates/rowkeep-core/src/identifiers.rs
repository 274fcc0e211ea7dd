//! SQL identifier quoting.

/// Quote a SQL identifier using ANSI double-quoting.
///
/// Embedded double-quotes are escaped by doubling them.
///
/// ```
/// use rowkeep_core::quote_ident;
///
/// assert_eq!(quote_ident("people"), "\"people\"");
/// assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_keyword() {
        assert_eq!(quote_ident("order"), "\"order\"");
    }

    #[test]
    fn test_quote_injection_attempt() {
        assert_eq!(
            quote_ident("x\"; DROP TABLE people; --"),
            "\"x\"\"; DROP TABLE people; --\""
        );
    }
}
