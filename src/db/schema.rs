//! Database schema types for sqlmend.
//!
//! Represents the structure of a SQLite database (tables, columns, foreign
//! keys and a few sample rows) and renders it as the per-table text documents
//! that the similarity index searches over.

use super::Value;
use crate::search::SchemaDocument;

/// Number of sample rows captured per table.
pub const SAMPLE_ROW_LIMIT: usize = 3;

/// Represents the complete schema of a database.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// All user tables in the schema.
    pub tables: Vec<Table>,

    /// Foreign key relationships between tables.
    pub foreign_keys: Vec<ForeignKey>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a table by exact name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Renders one schema document per table, in table order.
    pub fn to_documents(&self) -> Vec<SchemaDocument> {
        self.tables
            .iter()
            .map(|table| SchemaDocument::schema(self.format_table(table), &table.name))
            .collect()
    }

    /// Renders the document text for a single table.
    ///
    /// Layout: a `Table:` line, a `Columns:` section with one `- ` line per
    /// column, then optional `Foreign Keys:` and `Sample Data:` sections. The
    /// sample section is a ` | `-joined header row, a dashed separator and one
    /// ` | `-joined line per sample row.
    pub fn format_table(&self, table: &Table) -> String {
        let mut lines = vec![format!("Table: {}", table.name), "\nColumns:".to_string()];
        lines.extend(
            table
                .columns
                .iter()
                .map(|column| Self::format_column_line(table, column)),
        );

        let fk_lines = self
            .foreign_keys
            .iter()
            .filter(|fk| fk.from_table == table.name)
            .map(|fk| {
                format!(
                    "- {} references {}({})",
                    fk.from_column,
                    fk.to_table,
                    fk.to_column.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>();
        if !fk_lines.is_empty() {
            lines.push("\nForeign Keys:".to_string());
            lines.extend(fk_lines);
        }

        if !table.sample_rows.is_empty() {
            lines.push("\nSample Data:".to_string());
            let header = table
                .columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(" | ");
            let separator = "-".repeat(header.len());
            lines.push(header);
            lines.push(separator);
            lines.extend(table.sample_rows.iter().map(|row| {
                row.iter()
                    .map(Value::to_display_string)
                    .collect::<Vec<_>>()
                    .join(" | ")
            }));
        }

        lines.join("\n")
    }

    fn format_column_line(table: &Table, column: &Column) -> String {
        let mut flags = Vec::new();
        if table.primary_key.contains(&column.name) {
            flags.push("PRIMARY KEY".to_string());
        }
        if !column.is_nullable {
            flags.push("NOT NULL".to_string());
        }
        if let Some(default) = column.default.as_deref().filter(|d| !d.is_empty()) {
            flags.push(format!("DEFAULT {default}"));
        }

        if flags.is_empty() {
            format!("- {} ({})", column.name, column.data_type)
        } else {
            format!("- {} ({}) [{}]", column.name, column.data_type, flags.join(" "))
        }
    }
}

/// Represents a database table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Columns in declaration order.
    pub columns: Vec<Column>,

    /// Column names that form the primary key.
    pub primary_key: Vec<String>,

    /// Up to [`SAMPLE_ROW_LIMIT`] rows, one value per column.
    pub sample_rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates a new table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Represents a column in a table.
#[derive(Debug, Clone, Default)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Declared type (e.g., "INTEGER", "VARCHAR(80)"); may be empty in SQLite.
    pub data_type: String,

    /// Whether the column allows NULL values.
    pub is_nullable: bool,

    /// Default value expression, if any.
    pub default: Option<String>,
}

impl Column {
    /// Creates a new column with the given name and data type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default: None,
        }
    }

    /// Sets whether the column is nullable.
    pub fn nullable(self, nullable: bool) -> Self {
        Self {
            is_nullable: nullable,
            ..self
        }
    }

    /// Sets the default value.
    pub fn with_default(self, default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..self
        }
    }
}

/// A single-column foreign key reference, as reported by SQLite.
#[derive(Debug, Clone, Default)]
pub struct ForeignKey {
    /// Referencing table.
    pub from_table: String,

    /// Referencing column.
    pub from_column: String,

    /// Referenced table.
    pub to_table: String,

    /// Referenced column; `None` when the key implicitly targets the primary key.
    pub to_column: Option<String>,
}

impl ForeignKey {
    /// Creates a new foreign key reference.
    pub fn new(
        from_table: impl Into<String>,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: Option<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column,
        }
    }
}
