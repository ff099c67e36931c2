//! SQL identifier quoting utilities
//!
//! The ledger table name is the only identifier Migrant interpolates into
//! SQL it generates itself; these helpers quote it.

/// Quote a SQL identifier, doubling any embedded double quotes.
///
/// # Examples
/// ```
/// use mg_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("versions"), r#""versions""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `ops.versions`).
///
/// # Examples
/// ```
/// use mg_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("versions"), r#""versions""#);
/// assert_eq!(quote_qualified("ops.versions"), r#""ops"."versions""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a potentially schema-qualified table name into (schema, table).
///
/// Without a `.` the schema defaults to `main`.
///
/// # Examples
/// ```
/// use mg_core::sql_utils::split_qualified_name;
/// assert_eq!(split_qualified_name("versions"), ("main", "versions"));
/// assert_eq!(split_qualified_name("ops.versions"), ("ops", "versions"));
/// ```
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("main", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_qualified_escapes_each_part() {
        assert_eq!(quote_qualified(r#"o"ps.v"#), r#""o""ps"."v""#);
    }

    #[test]
    fn test_split_keeps_last_dot() {
        assert_eq!(split_qualified_name("a.b.c"), ("a.b", "c"));
    }
}
