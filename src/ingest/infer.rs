//! Column type inference
//!
//! A column's storage type is decided once from every raw value in it. A
//! column is numeric only if every value coerces to a number; a single value
//! that does not coerce turns the whole column into text.

use std::fmt;

/// Storage type chosen for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Decimal,
    Varchar,
}

impl ColumnType {
    /// Type name used in `CREATE TABLE` statements
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Varchar => "VARCHAR",
        }
    }

    /// Coerce a raw value into this column's representation.
    ///
    /// Numeric columns yield numbers, text columns keep the raw string. A raw
    /// value that does not fit a numeric column is kept as text, which can
    /// only happen when the type was not inferred from that value.
    pub fn coerce(&self, raw: &str) -> CellValue {
        match self {
            ColumnType::Varchar => CellValue::Text(raw.to_string()),
            ColumnType::Integer => match parse_number(raw) {
                Some(Numeric::Whole(n)) => CellValue::Integer(n),
                _ => CellValue::Text(raw.to_string()),
            },
            ColumnType::Decimal => match parse_number(raw) {
                Some(Numeric::Whole(n)) => CellValue::Decimal(n as f64),
                Some(Numeric::Fractional(f)) => CellValue::Decimal(f),
                None => CellValue::Text(raw.to_string()),
            },
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A raw value after its column's coercion, ready to be bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

/// Outcome of numeric coercion of one raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Whole(i64),
    Fractional(f64),
}

/// Parse a raw value as a finite decimal number.
///
/// Surrounding whitespace is ignored. Blank strings, `NaN`, infinities and
/// hexadecimal literals are not numbers.
fn parse_number(raw: &str) -> Option<Numeric> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Exact path first so large integers keep full precision.
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Numeric::Whole(n));
    }

    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }

    let value = trimmed.parse::<f64>().ok().filter(|v| v.is_finite())?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(Numeric::Whole(value as i64))
    } else {
        Some(Numeric::Fractional(value))
    }
}

/// Decide the storage type of a column from all of its raw values.
///
/// An empty column is `VARCHAR`: with nothing to test, every value would
/// vacuously be a whole number.
pub fn infer_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = false;
    let mut all_whole = true;

    for value in values {
        seen = true;
        match parse_number(value) {
            None => return ColumnType::Varchar,
            Some(Numeric::Fractional(_)) => all_whole = false,
            Some(Numeric::Whole(_)) => {}
        }
    }

    match (seen, all_whole) {
        (false, _) => ColumnType::Varchar,
        (true, true) => ColumnType::Integer,
        (true, false) => ColumnType::Decimal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_numbers_are_integer() {
        assert_eq!(infer_type(["1", "42", "-7", "0"]), ColumnType::Integer);
    }

    #[test]
    fn test_fraction_makes_decimal() {
        assert_eq!(infer_type(["1", "2.5", "3"]), ColumnType::Decimal);
    }

    #[test]
    fn test_any_text_makes_varchar() {
        assert_eq!(infer_type(["1", "2", "three"]), ColumnType::Varchar);
        assert_eq!(infer_type(["1.5", "n/a"]), ColumnType::Varchar);
    }

    #[test]
    fn test_empty_column_is_varchar() {
        let values: [&str; 0] = [];
        assert_eq!(infer_type(values), ColumnType::Varchar);
    }

    #[test]
    fn test_blank_value_forces_varchar() {
        assert_eq!(infer_type(["1", "", "3"]), ColumnType::Varchar);
        assert_eq!(infer_type(["1", "   "]), ColumnType::Varchar);
    }

    #[test]
    fn test_whole_valued_floats_and_exponents_are_integer() {
        assert_eq!(infer_type(["1.0", "1e3", " 12 "]), ColumnType::Integer);
    }

    #[test]
    fn test_non_decimal_spellings_are_text() {
        assert_eq!(infer_type(["NaN"]), ColumnType::Varchar);
        assert_eq!(infer_type(["inf"]), ColumnType::Varchar);
        assert_eq!(infer_type(["Infinity"]), ColumnType::Varchar);
        assert_eq!(infer_type(["0x1F"]), ColumnType::Varchar);
    }

    #[test]
    fn test_whole_number_beyond_i64_is_decimal() {
        assert_eq!(infer_type(["1e19"]), ColumnType::Decimal);
    }

    #[test]
    fn test_large_integer_keeps_precision() {
        assert_eq!(
            ColumnType::Integer.coerce("9007199254740993"),
            CellValue::Integer(9_007_199_254_740_993)
        );
    }

    #[test]
    fn test_coerce_by_column_type() {
        assert_eq!(ColumnType::Integer.coerce(" 5 "), CellValue::Integer(5));
        assert_eq!(ColumnType::Decimal.coerce("2"), CellValue::Decimal(2.0));
        assert_eq!(ColumnType::Decimal.coerce("2.25"), CellValue::Decimal(2.25));
        assert_eq!(
            ColumnType::Varchar.coerce("007"),
            CellValue::Text("007".to_string())
        );
    }

    #[test]
    fn test_sql_names() {
        assert_eq!(ColumnType::Integer.to_string(), "INTEGER");
        assert_eq!(ColumnType::Decimal.sql_name(), "DECIMAL");
        assert_eq!(ColumnType::Varchar.sql_name(), "VARCHAR");
    }
}
