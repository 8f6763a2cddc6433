//! Index and validator bootstrap
//!
//! Every collection gets a unique index on `id`, a filter index over its
//! enumerated fields, a text index over its searchable fields, and a
//! validator requiring its mandatory fields. All of it is idempotent and
//! runs on every startup.

use serde_json::Value;

use super::{Collection, DocumentStore, StoreError};
use crate::models::{Application, BlogPost, Country, Opportunity, Partner, Testimonial};
use self::JsonType::{Array, Boolean, String as Str};

/// JSON type a required field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Boolean,
    Number,
    Array,
}

impl JsonType {
    /// Name as reported by PostgreSQL `jsonb_typeof`
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Array => "array",
        }
    }

    pub fn check(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Array => value.is_array(),
        }
    }
}

/// Static description of one collection's indexes and validator
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub collection: Collection,
    pub required: &'static [(&'static str, JsonType)],
    pub filter_fields: &'static [&'static str],
    pub text_fields: &'static [&'static str],
}

impl CollectionSpec {
    /// Describe why `doc` fails the validator, if it does.
    pub fn violation(&self, doc: &Value) -> Option<String> {
        if !doc.is_object() {
            return Some("document must be a JSON object".to_owned());
        }
        self.required.iter().find_map(|(field, ty)| match doc.get(*field) {
            None | Some(Value::Null) => Some(format!("missing required field '{}'", field)),
            Some(v) if !ty.check(v) => Some(format!("field '{}' must be a {}", field, ty.name())),
            Some(_) => None,
        })
    }
}

/// Specs for every collection, in `Collection::ALL` order.
pub const SPECS: [CollectionSpec; 6] = [
    CollectionSpec {
        collection: Collection::Countries,
        required: &[("id", Str), ("name", Str), ("created_at", Str)],
        filter_fields: &[],
        text_fields: Country::SEARCH_FIELDS,
    },
    CollectionSpec {
        collection: Collection::Opportunities,
        required: &[
            ("id", Str),
            ("title", Str),
            ("country", Str),
            ("job_type", Str),
            ("description", Str),
            ("status", Str),
            ("featured", Boolean),
            ("created_at", Str),
        ],
        filter_fields: Opportunity::FILTER_FIELDS,
        text_fields: Opportunity::SEARCH_FIELDS,
    },
    CollectionSpec {
        collection: Collection::Applications,
        required: &[
            ("id", Str),
            ("opportunity_id", Str),
            ("full_name", Str),
            ("email", Str),
            ("phone", Str),
            ("status", Str),
            ("created_at", Str),
        ],
        filter_fields: Application::FILTER_FIELDS,
        text_fields: Application::SEARCH_FIELDS,
    },
    CollectionSpec {
        collection: Collection::Testimonials,
        required: &[("id", Str), ("name", Str), ("quote", Str), ("active", Boolean), ("created_at", Str)],
        filter_fields: Testimonial::FILTER_FIELDS,
        text_fields: &["name", "quote"],
    },
    CollectionSpec {
        collection: Collection::Partners,
        required: &[("id", Str), ("name", Str), ("active", Boolean), ("created_at", Str)],
        filter_fields: Partner::FILTER_FIELDS,
        text_fields: &["name", "description"],
    },
    CollectionSpec {
        collection: Collection::BlogPosts,
        required: &[
            ("id", Str),
            ("title", Str),
            ("slug", Str),
            ("content", Str),
            ("tags", Array),
            ("published", Boolean),
            ("created_at", Str),
        ],
        filter_fields: BlogPost::FILTER_FIELDS,
        text_fields: BlogPost::SEARCH_FIELDS,
    },
];

/// Indexes and validator for one collection.
pub fn spec_for(collection: Collection) -> &'static CollectionSpec {
    // SPECS is indexed in Collection::ALL order
    &SPECS[collection as usize]
}

/// Ensure every collection, index, and validator exists.
pub async fn ensure_all(store: &dyn DocumentStore) -> Result<(), StoreError> {
    tracing::info!(backend = store.backend(), "Bootstrapping collections...");

    for spec in &SPECS {
        store.ensure_collection(spec).await.map_err(|e| {
            tracing::error!(collection = %spec.collection, error = %e, "Bootstrap failed");
            e
        })?;
        tracing::debug!(
            collection = %spec.collection,
            required = spec.required.len(),
            filter_fields = spec.filter_fields.len(),
            text_fields = spec.text_fields.len(),
            "Collection ready"
        );
    }

    tracing::info!(collections = SPECS.len(), "Bootstrap complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn specs_follow_collection_order() {
        for collection in Collection::ALL {
            assert_eq!(spec_for(collection).collection, collection);
        }
    }

    #[test]
    fn every_spec_requires_string_id() {
        for spec in &SPECS {
            assert!(spec.required.contains(&("id", JsonType::String)));
        }
    }

    #[test]
    fn violation_reports_missing_and_mistyped_fields() {
        let spec = spec_for(Collection::Partners);
        assert_eq!(
            spec.violation(&json!({"id": "1", "active": true, "created_at": "x"})),
            Some("missing required field 'name'".to_owned())
        );
        assert_eq!(
            spec.violation(&json!({"id": "1", "name": "A", "active": "yes", "created_at": "x"})),
            Some("field 'active' must be a boolean".to_owned())
        );
        assert_eq!(
            spec.violation(&json!({"id": "1", "name": "A", "active": true, "created_at": "x"})),
            None
        );
        assert!(spec.violation(&json!([1, 2])).is_some());
    }

    #[tokio::test]
    async fn ensure_all_is_idempotent() {
        let store = MemoryStore::new();
        ensure_all(&store).await.unwrap();
        ensure_all(&store).await.unwrap();
        for collection in Collection::ALL {
            assert_eq!(store.count(collection).await.unwrap(), 0);
        }
    }
}
