//! In-memory catalog of the database schema.

use sqlx::SqlitePool;

use crate::db;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type as written in `CREATE TABLE` (may be empty in SQLite).
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnInfo {
    /// `- name: TYPE [PRIMARY KEY] NULL|NOT NULL`
    #[must_use]
    pub fn describe(&self) -> String {
        let mut line = format!("- {}: {}", self.name, self.data_type);
        if self.primary_key {
            line.push_str(" PRIMARY KEY");
        }
        line.push_str(if self.nullable { " NULL" } else { " NOT NULL" });
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub referred_table: String,
    /// `None` when the constraint targets the referred table's primary key
    /// implicitly.
    pub referred_column: Option<String>,
}

impl ForeignKey {
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.referred_column {
            Some(col) => format!("- {} -> {}.{}", self.column, self.referred_table, col),
            None => format!("- {} -> {}", self.column, self.referred_table),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// Table header followed by one line per column.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("Table: {}", self.name), "Columns:".to_string()];
        lines.extend(self.columns.iter().map(ColumnInfo::describe));
        lines.join("\n")
    }
}

/// Tables of the database, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: Vec<TableSchema>,
}

impl SchemaCatalog {
    #[must_use]
    pub fn new(mut tables: Vec<TableSchema>) -> Self {
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Self { tables }
    }

    /// Introspect every user table of `pool`.
    pub async fn load(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let mut tables = Vec::new();

        for name in db::table_names(pool).await? {
            let columns = sqlx::query_as::<_, (String, String, i64, i64)>(
                r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?) ORDER BY cid"#,
            )
            .bind(&name)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|(name, data_type, not_null, pk)| ColumnInfo {
                name,
                data_type,
                nullable: not_null == 0,
                primary_key: pk > 0,
            })
            .collect();

            let foreign_keys = sqlx::query_as::<_, (String, String, Option<String>)>(
                r#"SELECT "from", "table", "to" FROM pragma_foreign_key_list(?) ORDER BY id, seq"#,
            )
            .bind(&name)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|(column, referred_table, referred_column)| ForeignKey {
                column,
                referred_table,
                referred_column,
            })
            .collect();

            tables.push(TableSchema {
                name,
                columns,
                foreign_keys,
            });
        }

        tracing::debug!(tables = tables.len(), "Schema catalog loaded");
        Ok(Self::new(tables))
    }

    #[must_use]
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every table described, separated by a blank line.
    #[must_use]
    pub fn format_schema_info(&self) -> String {
        self.tables
            .iter()
            .map(TableSchema::describe)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
