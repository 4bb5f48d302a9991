//! Schema and statement generation for raw datasets
//!
//! Turns a table name plus header-keyed rows into:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS "users" ("id" INTEGER, "name" VARCHAR);
//! INSERT INTO "users" ("id", "name") VALUES ($0, $1)
//! ```
//!
//! and one bound-value mapping (`$0`, `$1`, ...) per row. Identifiers are
//! always quoted, so headers such as `order` or `2024` are valid columns. The builder is pure
//! apart from a debug line per inferred column.

use std::collections::HashSet;

use tracing::debug;

use super::infer::{infer_type, CellValue, ColumnType};
use super::RawRow;

/// One column of a generated table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Sanitized column name used in statements
    pub name: String,
    /// Header as it appears in the raw rows
    pub source: String,
    /// Type inferred from every value of the column
    pub column_type: ColumnType,
}

/// Placeholder name to coerced value, for one execution of the insert statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundRow {
    values: Vec<(String, CellValue)>,
}

impl BoundRow {
    /// Iterate over `(placeholder, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Look up the value bound to a placeholder such as `$0`
    pub fn get(&self, placeholder: &str) -> Option<&CellValue> {
        self.values
            .iter()
            .find(|(name, _)| name == placeholder)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything needed to materialize one dataset as a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub create_sql: String,
    pub insert_sql: String,
    pub values: Vec<BoundRow>,
}

impl TableSpec {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            create_sql: String::new(),
            insert_sql: String::new(),
            values: Vec::new(),
        }
    }

    /// True when built from zero rows; applying it must not touch the engine.
    pub fn is_empty(&self) -> bool {
        self.create_sql.is_empty()
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Double-quote an identifier, doubling any embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Positional placeholder for the column at `index`
pub fn placeholder(index: usize) -> String {
    format!("${}", index)
}

/// Sanitize headers into column names that are unique within the table.
///
/// SQLite compares column names case-insensitively, so a later header that
/// collides gets a `_2`, `_3`, ... suffix. A header that sanitizes to
/// nothing is named after its position.
fn column_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    headers
        .enumerate()
        .map(|(index, header)| {
            let base = match sanitize_identifier(header) {
                s if s.is_empty() => format!("column{}", index),
                s => s,
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.to_ascii_lowercase()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

/// Build the create/insert statements and bound values for a table.
///
/// The table name is used as given. Column order follows the first row's
/// keys; every row is read against that column set, and a key missing from a
/// later row reads as an empty string.
pub fn build_table_spec(table_name: &str, rows: &[RawRow]) -> TableSpec {
    let Some(first) = rows.first() else {
        return TableSpec::empty(table_name);
    };

    let headers: Vec<&str> = first.keys().collect();
    let names = column_names(headers.iter().copied());

    let columns: Vec<ColumnSpec> = headers
        .iter()
        .zip(names)
        .map(|(header, name)| {
            let column_type = infer_type(rows.iter().map(|row| row.get(header).unwrap_or("")));
            debug!(
                table = %table_name,
                column = %name,
                column_type = %column_type,
                "Inferred column type"
            );
            ColumnSpec {
                name,
                source: header.to_string(),
                column_type,
            }
        })
        .collect();

    let create_sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        quote_identifier(table_name),
        columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type.sql_name()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table_name),
        columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", "),
        (0..columns.len())
            .map(placeholder)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let values = rows
        .iter()
        .map(|row| BoundRow {
            values: columns
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let raw = row.get(&column.source).unwrap_or("");
                    (placeholder(index), column.column_type.coerce(raw))
                })
                .collect(),
        })
        .collect();

    TableSpec {
        name: table_name.to_string(),
        columns,
        create_sql,
        insert_sql,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_rows_build_empty_spec() {
        let spec = build_table_spec("t", &[]);
        assert!(spec.is_empty());
        assert_eq!(spec.name, "t");
        assert_eq!(spec.create_sql, "");
        assert_eq!(spec.insert_sql, "");
        assert!(spec.values.is_empty());
        assert!(spec.columns.is_empty());
    }

    #[test]
    fn test_create_and_insert_text() {
        let rows = vec![
            row(&[("id", "1"), ("name", "Al"), ("score", "9.5")]),
            row(&[("id", "2"), ("name", "Bo"), ("score", "7")]),
        ];
        let spec = build_table_spec("users", &rows);

        assert_eq!(
            spec.create_sql,
            r#"CREATE TABLE IF NOT EXISTS "users" ("id" INTEGER, "name" VARCHAR, "score" DECIMAL);"#
        );
        assert_eq!(
            spec.insert_sql,
            r#"INSERT INTO "users" ("id", "name", "score") VALUES ($0, $1, $2)"#
        );
    }

    #[test]
    fn test_bound_values_are_coerced_per_column() {
        let rows = vec![
            row(&[("id", "1"), ("zip", "02134"), ("price", "3")]),
            row(&[("id", "2"), ("zip", "n/a"), ("price", "4.5")]),
        ];
        let spec = build_table_spec("t", &rows);
        assert_eq!(spec.values.len(), 2);

        let first = &spec.values[0];
        assert_eq!(first.get("$0"), Some(&CellValue::Integer(1)));
        // Numeric-looking value in a text column stays text.
        assert_eq!(first.get("$1"), Some(&CellValue::Text("02134".into())));
        assert_eq!(first.get("$2"), Some(&CellValue::Decimal(3.0)));

        let second = &spec.values[1];
        assert_eq!(second.get("$2"), Some(&CellValue::Decimal(4.5)));
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_column_names_are_sanitized() {
        let rows = vec![row(&[("first name", "Al"), ("e-mail", "a@b.c"), ("ok", "1")])];
        let spec = build_table_spec("people", &rows);

        let names: Vec<&str> = spec.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first_name", "e_mail", "ok"]);
        assert_eq!(spec.columns[0].source, "first name");
        assert!(spec.create_sql.contains(r#""first_name" VARCHAR"#));
        // Values are still read through the original header.
        assert_eq!(
            spec.values[0].get("$0"),
            Some(&CellValue::Text("Al".into()))
        );
    }

    #[test]
    fn test_table_name_is_not_sanitized() {
        let spec = build_table_spec("my_table", &[row(&[("a", "1")])]);
        assert!(spec
            .create_sql
            .starts_with(r#"CREATE TABLE IF NOT EXISTS "my_table" ("#));
    }

    #[test]
    fn test_keyword_and_digit_headers_are_quoted() {
        let rows = vec![row(&[("order", "1"), ("2024", "5"), ("group", "x")])];
        let spec = build_table_spec("orders", &rows);
        assert_eq!(
            spec.create_sql,
            r#"CREATE TABLE IF NOT EXISTS "orders" ("order" INTEGER, "2024" INTEGER, "group" VARCHAR);"#
        );
        assert_eq!(
            spec.insert_sql,
            r#"INSERT INTO "orders" ("order", "2024", "group") VALUES ($0, $1, $2)"#
        );
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("users"), r#""users""#);
        assert_eq!(quote_identifier(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_colliding_column_names_get_suffix() {
        let rows = vec![row(&[("a b", "1"), ("a_b", "2"), ("A-B", "3"), ("", "4")])];
        let spec = build_table_spec("t", &rows);
        let names: Vec<&str> = spec.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a_b", "a_b_2", "A_B_3", "column3"]);
    }

    #[test]
    fn test_missing_key_reads_as_blank() {
        let rows = vec![row(&[("id", "1"), ("n", "5")]), row(&[("id", "2")])];
        let spec = build_table_spec("t", &rows);
        assert_eq!(spec.columns[1].column_type, ColumnType::Varchar);
        assert_eq!(spec.values[1].get("$1"), Some(&CellValue::Text(String::new())));
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("time zones.csv"), "time_zones_csv");
        assert_eq!(sanitize_identifier("abc123"), "abc123");
        assert_eq!(sanitize_identifier("é"), "_");
    }
}
