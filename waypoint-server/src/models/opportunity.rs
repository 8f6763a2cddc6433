//! Study and work opportunities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError, MAX_LONG_LEN, MAX_SHORT_LEN};
use super::{exact, new_id, search_term, Document};
use crate::store::{Collection, Filter};

/// Kind of opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Study,
    WorkStudy,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Internship => "internship",
            Self::Study => "study",
            Self::WorkStudy => "work-study",
        }
    }
}

/// Whether an opportunity is taking applications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[default]
    Open,
    Closed,
}

impl OpportunityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Stored opportunity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub country: String,
    pub job_type: JobType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub status: OpportunityStatus,
    #[serde(default)]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Opportunity {
    pub const SEARCH_FIELDS: &'static [&'static str] = &["title", "description"];
    pub const FILTER_FIELDS: &'static [&'static str] = &["country", "job_type", "status"];
}

impl Document for Opportunity {
    const COLLECTION: Collection = Collection::Opportunities;
    const RESOURCE: &'static str = "opportunity";

    fn id(&self) -> &str {
        &self.id
    }
}

/// POST /opportunities body
#[derive(Debug, Clone, Deserialize)]
pub struct NewOpportunity {
    pub title: String,
    pub country: String,
    pub job_type: JobType,
    pub description: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub status: Option<OpportunityStatus>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl NewOpportunity {
    pub fn validate(self) -> Result<Opportunity, ValidationError> {
        Ok(Opportunity {
            id: new_id(),
            title: validation::required("title", &self.title, MAX_SHORT_LEN)?,
            country: validation::required("country", &self.country, MAX_SHORT_LEN)?,
            job_type: self.job_type,
            description: validation::required("description", &self.description, MAX_LONG_LEN)?,
            city: validation::optional("city", self.city, MAX_SHORT_LEN)?,
            salary_range: validation::optional("salary_range", self.salary_range, MAX_SHORT_LEN)?,
            requirements: validation::string_list("requirements", self.requirements, MAX_SHORT_LEN)?,
            benefits: validation::string_list("benefits", self.benefits, MAX_SHORT_LEN)?,
            status: self.status.unwrap_or_default(),
            featured: self.featured.unwrap_or(false),
            created_at: Utc::now(),
        })
    }
}

/// GET /opportunities query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityQuery {
    pub country: Option<String>,
    pub job_type: Option<JobType>,
    pub status: Option<OpportunityStatus>,
    pub featured: Option<bool>,
    pub q: Option<String>,
}

impl OpportunityQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .eq_opt("country", exact(&self.country))
            .eq_opt("job_type", self.job_type.map(|j| j.as_str()))
            .eq_opt("status", self.status.map(|s| s.as_str()))
            .eq_opt("featured", self.featured)
            .search(search_term(&self.q), Opportunity::SEARCH_FIELDS)
    }
}
