//! Candidate applications to an opportunity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError, MAX_LONG_LEN, MAX_SHORT_LEN, MAX_URL_LEN};
use super::{exact, new_id, search_term, Document};
use crate::store::{Collection, Filter};

/// Review state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// Stored application record.
///
/// `opportunity_id` is checked when the application is created and never
/// again, so it may dangle if the opportunity is later removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub opportunity_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Application {
    pub const SEARCH_FIELDS: &'static [&'static str] = &["full_name"];
    pub const FILTER_FIELDS: &'static [&'static str] = &["opportunity_id", "status"];
}

impl Document for Application {
    const COLLECTION: Collection = Collection::Applications;
    const RESOURCE: &'static str = "application";

    fn id(&self) -> &str {
        &self.id
    }
}

/// POST /applications body
#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub opportunity_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
}

impl NewApplication {
    /// New applications always start as `pending`.
    pub fn validate(self) -> Result<Application, ValidationError> {
        Ok(Application {
            id: new_id(),
            opportunity_id: validation::required("opportunity_id", &self.opportunity_id, MAX_SHORT_LEN)?,
            full_name: validation::required("full_name", &self.full_name, MAX_SHORT_LEN)?,
            email: validation::email("email", &self.email)?,
            phone: validation::phone("phone", &self.phone)?,
            nationality: validation::optional("nationality", self.nationality, MAX_SHORT_LEN)?,
            cover_letter: validation::optional("cover_letter", self.cover_letter, MAX_LONG_LEN)?,
            resume_url: validation::optional("resume_url", self.resume_url, MAX_URL_LEN)?,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

/// GET /applications query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationQuery {
    pub opportunity_id: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub q: Option<String>,
}

impl ApplicationQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .eq_opt("opportunity_id", exact(&self.opportunity_id))
            .eq_opt("status", self.status.map(|s| s.as_str()))
            .search(search_term(&self.q), Application::SEARCH_FIELDS)
    }
}
