//! Picks the tables a question is about.

use std::collections::BTreeSet;

use super::schema::SchemaCatalog;

/// Table-name parts shorter than this are ignored (`id`, `a`, ...).
const MIN_PART_LEN: usize = 3;

/// Names of the tables relevant to `question`, in catalog order.
///
/// A table matches when its name, or one of its `_`-separated parts, appears
/// among the question's words (plural forms included). Tables referenced by a
/// match's foreign keys are added. With no match every table is returned.
#[must_use]
pub fn relevant_tables(catalog: &SchemaCatalog, question: &str) -> Vec<String> {
    let words: BTreeSet<String> = tokens(question).map(|w| singular(&w)).collect();

    let mut selected: BTreeSet<&str> = catalog
        .tables()
        .iter()
        .filter(|t| matches_table(&t.name, &words))
        .map(|t| t.name.as_str())
        .collect();

    if selected.is_empty() {
        tracing::debug!("No table named in question, using full schema");
        return catalog.tables().iter().map(|t| t.name.clone()).collect();
    }

    let referenced: Vec<&str> = catalog
        .tables()
        .iter()
        .filter(|t| selected.contains(t.name.as_str()))
        .flat_map(|t| t.foreign_keys.iter().map(|fk| fk.referred_table.as_str()))
        .collect();
    selected.extend(referenced);

    let tables: Vec<String> = catalog
        .tables()
        .iter()
        .filter(|t| selected.contains(t.name.as_str()))
        .map(|t| t.name.clone())
        .collect();
    tracing::debug!(tables = ?tables, "Relevant tables");
    tables
}

fn matches_table(table: &str, words: &BTreeSet<String>) -> bool {
    let table = table.to_lowercase();
    if words.contains(&singular(&table)) {
        return true;
    }
    table
        .split('_')
        .filter(|part| part.len() >= MIN_PART_LEN)
        .any(|part| words.contains(&singular(part)))
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{stem}y");
    }
    for suffix in ["sses", "shes", "ches", "xes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.len() > 1 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}
