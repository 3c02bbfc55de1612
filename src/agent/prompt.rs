//! System prompts sent to the model.

use super::schema::SchemaCatalog;

pub const CLASSIFIER_PROMPT: &str = "You are a classifier that determines if a question requires SQL query execution. Respond with 'true' if the question needs SQL execution, 'false' otherwise.";

pub const GENERAL_PROMPT: &str = "You are a helpful SQL assistant. Answer questions about SQL and databases in a clear, concise way.";

const PREAMBLE: &str =
    "You are a SQL expert assistant. You have access to the following database schema:\n";

const INSTRUCTIONS: &str = r"IMPORTANT: You must respond with ONLY a valid SQL SELECT query. Do not include any explanations, markdown formatting, or other text.

Rules:
1. The response must be a single SQL SELECT query
2. The query must start with SELECT and end with a semicolon
3. Only use tables and columns that exist in the schema above
4. Do not include any text before or after the query
5. Do not use markdown code blocks or backticks

Example of correct response:
SELECT name FROM customers WHERE id = 1;

Example of incorrect responses:
- Here's the query: SELECT name FROM customers WHERE id = 1;
- ```sql
SELECT name FROM customers WHERE id = 1;
```
- The query to get the customer name is: SELECT name FROM customers WHERE id = 1;";

/// System prompt asking for one `SELECT` over the `relevant` tables.
#[must_use]
pub fn sql_prompt(catalog: &SchemaCatalog, relevant: &[String]) -> String {
    let tables: Vec<_> = catalog
        .tables()
        .iter()
        .filter(|t| relevant.contains(&t.name))
        .collect();

    let mut schema = vec!["Database Schema:\n".to_string()];
    for table in &tables {
        schema.push(table.describe());
        schema.push(String::new());
    }

    let mut relationships = vec!["Table Relationships:\n".to_string()];
    for table in tables.iter().filter(|t| !t.foreign_keys.is_empty()) {
        relationships.push(format!("{} relationships:", table.name));
        relationships.extend(table.foreign_keys.iter().map(|fk| fk.describe()));
        relationships.push(String::new());
    }

    [
        PREAMBLE.to_string(),
        schema.join("\n"),
        relationships.join("\n"),
        INSTRUCTIONS.to_string(),
    ]
    .join("\n")
}
