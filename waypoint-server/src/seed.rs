//! Sample data for empty collections
//!
//! Fixtures go through the same `New*::validate` path as API requests, so
//! seeded records are indistinguishable from ones created over HTTP.
//! Applications are never seeded.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{
    Document, NewBlogPost, NewCountry, NewOpportunity, NewPartner, NewTestimonial, ValidationError,
};
use crate::store::{Collection, DocumentStore, Repository, StoreError};

/// Held for a whole seeding run so the emptiness check and the inserts of
/// one run never interleave with another.
static SEED_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Records inserted per collection; skipped collections report 0.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: BTreeMap<&'static str, usize>,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.inserted.values().sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid {collection} fixture: {reason}")]
    Fixture { collection: Collection, reason: String },
}

/// Insert fixtures into every seedable collection that is currently empty.
pub async fn seed_empty_collections(store: &dyn DocumentStore) -> Result<SeedReport, SeedError> {
    let _guard = SEED_LOCK.lock().await;
    let mut report = SeedReport::default();

    seed(store, &mut report, countries(), NewCountry::validate).await?;
    seed(store, &mut report, opportunities(), NewOpportunity::validate).await?;
    seed(store, &mut report, testimonials(), NewTestimonial::validate).await?;
    seed(store, &mut report, partners(), NewPartner::validate).await?;
    seed(store, &mut report, blog_posts(), NewBlogPost::validate).await?;

    tracing::info!(total = report.total(), "Seeding finished");
    Ok(report)
}

async fn seed<N, T>(
    store: &dyn DocumentStore,
    report: &mut SeedReport,
    fixtures: Value,
    build: fn(N) -> Result<T, ValidationError>,
) -> Result<(), SeedError>
where
    N: DeserializeOwned,
    T: Document,
{
    let collection = T::COLLECTION;
    let repo = Repository::<T>::new(store);

    if repo.count().await? > 0 {
        tracing::info!(%collection, "Collection not empty, skipping seed");
        report.inserted.insert(collection.name(), 0);
        return Ok(());
    }

    let fixture_error = |reason: String| SeedError::Fixture { collection, reason };
    let requests: Vec<N> =
        serde_json::from_value(fixtures).map_err(|e| fixture_error(e.to_string()))?;

    let mut inserted = 0;
    for request in requests {
        let record = build(request).map_err(|e| fixture_error(e.to_string()))?;
        repo.insert(record).await?;
        inserted += 1;
    }

    tracing::info!(%collection, inserted, "Seeded collection");
    report.inserted.insert(collection.name(), inserted);
    Ok(())
}

fn countries() -> Value {
    json!([
        {
            "name": "Australia",
            "code": "AU",
            "description": "World-class universities and post-study work rights for graduates.",
            "highlights": ["Post-study work visa", "Part-time work while studying", "Multicultural cities"]
        },
        {
            "name": "Canada",
            "code": "CA",
            "description": "Affordable tuition and a clear pathway from study to permanent residence.",
            "highlights": ["PGWP work permit", "Co-op programs", "Safe and welcoming"]
        },
        {
            "name": "United Kingdom",
            "code": "GB",
            "description": "One-year master's degrees and the Graduate Route visa.",
            "highlights": ["Graduate Route", "Historic universities"]
        },
        {
            "name": "Japan",
            "code": "JP",
            "description": "Language schools and skilled-worker programs across major cities.",
            "highlights": ["Specified Skilled Worker visa", "Scholarships for language study"]
        }
    ])
}

fn opportunities() -> Value {
    json!([
        {
            "title": "Registered Nurse",
            "country": "Australia",
            "city": "Perth",
            "job_type": "full-time",
            "description": "Hospital placement for registered nurses with employer visa sponsorship.",
            "salary_range": "AUD 75,000 - 90,000",
            "requirements": ["Nursing degree", "IELTS 7.0 overall"],
            "benefits": ["Visa sponsorship", "Relocation support"],
            "featured": true
        },
        {
            "title": "Master of Data Science",
            "country": "Canada",
            "city": "Toronto",
            "job_type": "study",
            "description": "Two-year program with a paid co-op term and post-graduation work permit eligibility.",
            "requirements": ["Bachelor's degree", "IELTS 6.5 overall"],
            "benefits": ["Co-op placement", "PGWP eligible"]
        },
        {
            "title": "Hospitality Intern",
            "country": "Japan",
            "city": "Osaka",
            "job_type": "internship",
            "description": "Six-month hotel internship with Japanese language classes included.",
            "benefits": ["Accommodation provided", "Language classes"]
        },
        {
            "title": "Business Analytics MSc with Placement",
            "country": "United Kingdom",
            "city": "Manchester",
            "job_type": "work-study",
            "description": "One-year master's followed by an industry placement year.",
            "requirements": ["Bachelor's degree"],
            "featured": true
        }
    ])
}

fn testimonials() -> Value {
    json!([
        {
            "name": "Asha Gurung",
            "quote": "From my first counselling session to landing in Sydney, every step was clear.",
            "country": "Australia",
            "role": "Master of Nursing student",
            "rating": 5
        },
        {
            "name": "Rohan Shrestha",
            "quote": "They helped me prepare my study permit file and it was approved in five weeks.",
            "country": "Canada",
            "role": "Data Science student",
            "rating": 5
        },
        {
            "name": "Mina Tamang",
            "quote": "The internship in Osaka changed my career.",
            "country": "Japan",
            "role": "Hospitality intern",
            "rating": 4
        }
    ])
}

fn partners() -> Value {
    json!([
        {
            "name": "Western Coast University",
            "website": "https://wcu.example.edu",
            "description": "Public research university in Perth.",
            "partner_type": "university"
        },
        {
            "name": "Maple Leaf College",
            "website": "https://mapleleaf.example.ca",
            "description": "Applied sciences college with co-op programs.",
            "partner_type": "college"
        },
        {
            "name": "Sakura Hospitality Group",
            "description": "Hotel group offering internships across Kansai.",
            "partner_type": "employer"
        }
    ])
}

fn blog_posts() -> Value {
    json!([
        {
            "title": "Student Visa Checklist for Australia",
            "excerpt": "Everything to gather before you lodge your subclass 500 application.",
            "content": "Start with your Confirmation of Enrolment, then financial evidence, health insurance and English test results.",
            "author": "Admissions Team",
            "tags": ["visa", "australia"],
            "published": true
        },
        {
            "title": "IELTS or PTE: Which Test Should You Take?",
            "excerpt": "A side-by-side comparison of the two most accepted English tests.",
            "content": "Both are accepted by most universities. PTE results usually arrive faster; IELTS has more test centres.",
            "author": "Test Prep Team",
            "tags": ["ielts", "pte", "language"],
            "published": true
        },
        {
            "title": "Working While Studying in Canada",
            "excerpt": "How many hours you can work and what counts toward them.",
            "content": "Draft: update once the new off-campus work rules are confirmed.",
            "tags": ["canada", "work"],
            "published": false
        }
    ])
}
