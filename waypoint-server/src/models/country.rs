//! Study/work destination countries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError, MAX_LONG_LEN, MAX_SHORT_LEN, MAX_URL_LEN};
use super::{new_id, search_term, Document};
use crate::store::{Collection, Filter};

/// Stored country record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
    /// ISO 3166 alpha-2 code, upper-cased
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Country {
    pub const SEARCH_FIELDS: &'static [&'static str] = &["name", "description"];
}

impl Document for Country {
    const COLLECTION: Collection = Collection::Countries;
    const RESOURCE: &'static str = "country";

    fn id(&self) -> &str {
        &self.id
    }
}

/// POST /countries body
#[derive(Debug, Clone, Deserialize)]
pub struct NewCountry {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl NewCountry {
    pub fn validate(self) -> Result<Country, ValidationError> {
        let code = validation::optional("code", self.code, 2)?;
        if let Some(code) = &code {
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ValidationError::InvalidFormat {
                    field: "code",
                    reason: "must be a two-letter country code",
                });
            }
        }

        Ok(Country {
            id: new_id(),
            name: validation::required("name", &self.name, MAX_SHORT_LEN)?,
            code: code.map(|c| c.to_ascii_uppercase()),
            description: validation::optional("description", self.description, MAX_LONG_LEN)?,
            image_url: validation::optional("image_url", self.image_url, MAX_URL_LEN)?,
            highlights: validation::string_list("highlights", self.highlights, MAX_SHORT_LEN)?,
            created_at: Utc::now(),
        })
    }
}

/// GET /countries query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryQuery {
    pub q: Option<String>,
}

impl CountryQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new().search(search_term(&self.q), Country::SEARCH_FIELDS)
    }
}
