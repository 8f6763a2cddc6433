//! Student and worker testimonials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError, MAX_LONG_LEN, MAX_SHORT_LEN, MAX_URL_LEN};
use super::{exact, new_id, Document};
use crate::store::{Collection, Filter};

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// Stored testimonial record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Listed only when `true`; a stored record without the field is hidden.
    #[serde(default)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Testimonial {
    pub const FILTER_FIELDS: &'static [&'static str] = &["active", "country"];
}

impl Document for Testimonial {
    const COLLECTION: Collection = Collection::Testimonials;
    const RESOURCE: &'static str = "testimonial";

    fn id(&self) -> &str {
        &self.id
    }
}

/// POST /testimonials body
#[derive(Debug, Clone, Deserialize)]
pub struct NewTestimonial {
    pub name: String,
    pub quote: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl NewTestimonial {
    pub fn validate(self) -> Result<Testimonial, ValidationError> {
        if let Some(rating) = self.rating {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(ValidationError::OutOfRange {
                    field: "rating",
                    min: MIN_RATING.into(),
                    max: MAX_RATING.into(),
                });
            }
        }

        Ok(Testimonial {
            id: new_id(),
            name: validation::required("name", &self.name, MAX_SHORT_LEN)?,
            quote: validation::required("quote", &self.quote, MAX_LONG_LEN)?,
            country: validation::optional("country", self.country, MAX_SHORT_LEN)?,
            role: validation::optional("role", self.role, MAX_SHORT_LEN)?,
            rating: self.rating,
            photo_url: validation::optional("photo_url", self.photo_url, MAX_URL_LEN)?,
            active: self.active.unwrap_or(true),
            created_at: Utc::now(),
        })
    }
}

/// GET /testimonials query. Only active testimonials are ever listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestimonialQuery {
    pub country: Option<String>,
}

impl TestimonialQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .eq("active", true)
            .eq_opt("country", exact(&self.country))
    }
}
