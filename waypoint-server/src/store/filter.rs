//! Query filters shared by every backend

use serde_json::{Map, Value};

/// Case-insensitive substring search over a fixed set of text fields
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub term: String,
    pub fields: &'static [&'static str],
}

/// Conjunction of exact-match, array-membership and text-search clauses.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// `doc[field] == value`
    pub equals: Vec<(&'static str, Value)>,
    /// `doc[field]` is an array containing `value`
    pub contains: Vec<(&'static str, Value)>,
    pub search: Option<TextSearch>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.equals.push((field, value.into()));
        self
    }

    pub fn eq_opt<V: Into<Value>>(self, field: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn has(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.contains.push((field, value.into()));
        self
    }

    pub fn has_opt<V: Into<Value>>(self, field: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.has(field, v),
            None => self,
        }
    }

    /// Add a text search. No-op when `term` is absent or `fields` is empty.
    pub fn search(mut self, term: Option<&str>, fields: &'static [&'static str]) -> Self {
        if let Some(term) = term {
            if !fields.is_empty() {
                self.search = Some(TextSearch {
                    term: term.to_owned(),
                    fields,
                });
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty() && self.contains.is_empty() && self.search.is_none()
    }

    /// Reference semantics for the filter.
    pub fn matches(&self, doc: &Value) -> bool {
        let equals = self
            .equals
            .iter()
            .all(|(field, value)| doc.get(*field) == Some(value));

        let contains = self.contains.iter().all(|(field, value)| {
            doc.get(*field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value))
        });

        let search = self.search.as_ref().map_or(true, |s| {
            let needle = s.term.to_lowercase();
            s.fields.iter().any(|field| {
                doc.get(*field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        });

        equals && contains && search
    }

    /// JSON object `doc` must contain (JSONB `@>`) to satisfy the exact
    /// and membership clauses.
    pub fn containment(&self) -> Value {
        let mut object = Map::new();
        for (field, value) in &self.equals {
            object.insert((*field).to_owned(), value.clone());
        }
        for (field, value) in &self.contains {
            let entry = object
                .entry((*field).to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(value.clone());
            }
        }
        Value::Object(object)
    }
}

/// `%term%` with LIKE metacharacters escaped by `\`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
