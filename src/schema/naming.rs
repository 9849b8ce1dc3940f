//! Identifier naming: record field names to column names, table prefixes.

/// Maps record identifiers onto database identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamingStrategy {
    /// Prepended to every table name, e.g. `app_`.
    pub table_prefix: Option<String>,
}

impl NamingStrategy {
    pub fn with_table_prefix(prefix: impl Into<String>) -> Self {
        NamingStrategy {
            table_prefix: Some(prefix.into()),
        }
    }

    pub fn table_name(&self, table: &str) -> String {
        match &self.table_prefix {
            Some(prefix) => format!("{}{}", prefix, table),
            None => table.to_string(),
        }
    }

    pub fn column_name(&self, field: &str) -> String {
        to_snake_case(field)
    }
}

/// Convert an identifier to snake_case. Acronym runs stay together.
/// e.g. "createdAt" -> "created_at", "UserID" -> "user_id", "HTTPStatus" -> "http_status"
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
