//! Partner institutions and employers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError, MAX_LONG_LEN, MAX_SHORT_LEN, MAX_URL_LEN};
use super::{exact, new_id, Document};
use crate::store::{Collection, Filter};

/// Stored partner record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// e.g. "university", "employer", "language-school"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_type: Option<String>,
    /// Listed only when `true`; a stored record without the field is hidden.
    #[serde(default)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    pub const FILTER_FIELDS: &'static [&'static str] = &["active", "partner_type"];
}

impl Document for Partner {
    const COLLECTION: Collection = Collection::Partners;
    const RESOURCE: &'static str = "partner";

    fn id(&self) -> &str {
        &self.id
    }
}

/// POST /partners body
#[derive(Debug, Clone, Deserialize)]
pub struct NewPartner {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub partner_type: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl NewPartner {
    pub fn validate(self) -> Result<Partner, ValidationError> {
        Ok(Partner {
            id: new_id(),
            name: validation::required("name", &self.name, MAX_SHORT_LEN)?,
            website: validation::optional("website", self.website, MAX_URL_LEN)?,
            logo_url: validation::optional("logo_url", self.logo_url, MAX_URL_LEN)?,
            description: validation::optional("description", self.description, MAX_LONG_LEN)?,
            partner_type: validation::optional("partner_type", self.partner_type, MAX_SHORT_LEN)?,
            active: self.active.unwrap_or(true),
            created_at: Utc::now(),
        })
    }
}

/// GET /partners query. Only active partners are ever listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerQuery {
    pub partner_type: Option<String>,
}

impl PartnerQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .eq("active", true)
            .eq_opt("partner_type", exact(&self.partner_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_partner_kept_when_requested() {
        let partner = NewPartner {
            name: "Maple College".into(),
            website: None,
            logo_url: None,
            description: None,
            partner_type: Some("university".into()),
            active: Some(false),
        }
        .validate()
        .unwrap();
        assert!(!partner.active);
    }

    #[test]
    fn stored_doc_without_active_is_hidden_like_the_list_filter() {
        let doc = serde_json::json!({
            "id": "p1",
            "name": "Kiwi Works",
            "created_at": "2024-01-01T00:00:00Z"
        });
        let partner: Partner = serde_json::from_value(doc.clone()).unwrap();
        assert!(!partner.active);
        assert!(!PartnerQuery::default().to_filter().matches(&doc));
    }
}
