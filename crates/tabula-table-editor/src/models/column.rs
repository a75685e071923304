//! Column model

use serde::{Deserialize, Serialize};
use tabula_core::{CellValue, ColumnId, ColumnType};

/// A column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Stable identity; the join key used by every row's cell map
    pub id: ColumnId,
    /// Display name
    pub name: String,
    /// Advisory type tag
    pub column_type: ColumnType,
    /// Allowed values for `List` columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Column {
    /// Create a new column
    pub fn new(id: ColumnId, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id,
            name: name.into(),
            column_type,
            options: Vec::new(),
        }
    }

    /// Builder: set list options
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Interpret raw user input the way this column's editor would.
    ///
    /// Input that does not parse as the column's type is kept as text, so
    /// nothing the user typed is lost.
    pub fn parse_input(&self, input: &str) -> CellValue {
        if input.is_empty() {
            return CellValue::Empty;
        }

        let text = CellValue::text(input);
        match self.column_type {
            ColumnType::Text => text,
            ColumnType::Number => text.as_number().map(CellValue::Number).unwrap_or(text),
            ColumnType::Timestamp => text
                .as_timestamp()
                .map(CellValue::Timestamp)
                .unwrap_or(text),
            ColumnType::List => CellValue::choice(input),
        }
    }

    /// Check a value against the column's type tag.
    ///
    /// Only consulted when strict typing is enabled; writes are otherwise
    /// unchecked. Empty values are always accepted.
    pub fn check_value(&self, value: &CellValue) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }

        match self.column_type {
            ColumnType::Text => Ok(()),
            ColumnType::Number => value
                .as_number()
                .map(|_| ())
                .ok_or_else(|| format!("'{}' is not a number", value)),
            ColumnType::Timestamp => value
                .as_timestamp()
                .map(|_| ())
                .ok_or_else(|| format!("'{}' is not a timestamp", value)),
            ColumnType::List => match value.as_str() {
                Some(choice) if self.options.iter().any(|o| o == choice) => Ok(()),
                _ => Err(format!(
                    "'{}' is not one of [{}]",
                    value,
                    self.options.join(", ")
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_text_accepts_anything() {
        let col = Column::new(ColumnId(1), "Name", ColumnType::Text);
        assert!(col.check_value(&CellValue::Number(3.0)).is_ok());
        assert!(col.check_value(&CellValue::text("x")).is_ok());
    }

    #[test]
    fn test_number_column() {
        let col = Column::new(ColumnId(1), "Qty", ColumnType::Number);
        assert!(col.check_value(&CellValue::Number(3.0)).is_ok());
        assert!(col.check_value(&CellValue::text("12.5")).is_ok());
        assert!(col.check_value(&CellValue::text("twelve")).is_err());
        assert!(col.check_value(&CellValue::Empty).is_ok());
    }

    #[test]
    fn test_timestamp_column() {
        let col = Column::new(ColumnId(1), "Due", ColumnType::Timestamp);
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(col.check_value(&CellValue::Timestamp(ts)).is_ok());
        assert!(col.check_value(&CellValue::text("2024-03-01T12:00:00Z")).is_ok());
        assert!(col.check_value(&CellValue::text("next tuesday")).is_err());
    }

    #[test]
    fn test_parse_input_per_type() {
        let qty = Column::new(ColumnId(1), "Qty", ColumnType::Number);
        assert_eq!(qty.parse_input("12.5"), CellValue::Number(12.5));
        assert_eq!(qty.parse_input("lots"), CellValue::text("lots"));
        assert_eq!(qty.parse_input(""), CellValue::Empty);

        let due = Column::new(ColumnId(2), "Due", ColumnType::Timestamp);
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(due.parse_input("2024-03-01T12:00:00Z"), CellValue::Timestamp(ts));

        let status = Column::new(ColumnId(3), "Status", ColumnType::List);
        assert_eq!(status.parse_input("Done"), CellValue::choice("Done"));
    }

    #[test]
    fn test_list_column_only_accepts_options() {
        let col = Column::new(ColumnId(1), "Status", ColumnType::List)
            .with_options(["Active", "Done"]);
        assert!(col.check_value(&CellValue::choice("Active")).is_ok());
        assert!(col.check_value(&CellValue::text("Done")).is_ok());
        let err = col.check_value(&CellValue::choice("Lost")).unwrap_err();
        assert!(err.contains("Active, Done"));
    }
}
