//! Typed records with validation at the boundary
//!
//! Each resource has a stored record type and a `New*` create request.
//! `New*::validate` trims and checks input, stamps the server-side id and
//! creation time, and returns the record ready to insert.

pub mod application;
pub mod blog_post;
pub mod country;
pub mod opportunity;
pub mod partner;
pub mod testimonial;
pub mod validation;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::store::Collection;

pub use application::{Application, ApplicationQuery, ApplicationStatus, NewApplication};
pub use blog_post::{BlogPost, BlogQuery, NewBlogPost};
pub use country::{Country, CountryQuery, NewCountry};
pub use opportunity::{JobType, NewOpportunity, Opportunity, OpportunityQuery, OpportunityStatus};
pub use partner::{NewPartner, Partner, PartnerQuery};
pub use testimonial::{NewTestimonial, Testimonial, TestimonialQuery};
pub use validation::ValidationError;

/// A record stored in exactly one collection, keyed by its string `id`.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection the record lives in
    const COLLECTION: Collection;
    /// Singular name used in not-found messages
    const RESOURCE: &'static str;

    fn id(&self) -> &str;
}

/// Fresh server-generated identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Treat `?q=` with only whitespace as absent.
pub(crate) fn search_term(q: &Option<String>) -> Option<&str> {
    q.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

/// Treat empty exact-match params (`?country=`) as absent.
pub(crate) fn exact(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
