//! Blog posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError, MAX_LONG_LEN, MAX_SHORT_LEN, MAX_URL_LEN};
use super::{exact, new_id, search_term, Document};
use crate::store::{Collection, Filter};

/// Stored blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl BlogPost {
    pub const SEARCH_FIELDS: &'static [&'static str] = &["title", "excerpt", "content"];
    pub const FILTER_FIELDS: &'static [&'static str] = &["published", "tags"];
}

impl Document for BlogPost {
    const COLLECTION: Collection = Collection::BlogPosts;
    const RESOURCE: &'static str = "blog post";

    fn id(&self) -> &str {
        &self.id
    }
}

/// POST /blog body
#[derive(Debug, Clone, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl NewBlogPost {
    pub fn validate(self) -> Result<BlogPost, ValidationError> {
        let id = new_id();
        let title = validation::required("title", &self.title, MAX_SHORT_LEN)?;

        let slug = match validation::optional("slug", self.slug, MAX_SHORT_LEN)? {
            Some(given) => {
                let slug = slugify(&given);
                if slug != given {
                    return Err(ValidationError::InvalidFormat {
                        field: "slug",
                        reason: "must contain only lowercase letters, digits and single hyphens",
                    });
                }
                slug
            }
            None => match slugify(&title) {
                s if s.is_empty() => id.clone(),
                s => s,
            },
        };

        Ok(BlogPost {
            id,
            title,
            slug,
            excerpt: validation::optional("excerpt", self.excerpt, MAX_LONG_LEN)?,
            content: validation::required("content", &self.content, MAX_LONG_LEN)?,
            author: validation::optional("author", self.author, MAX_SHORT_LEN)?,
            tags: validation::string_list("tags", self.tags, MAX_SHORT_LEN)?,
            cover_image_url: validation::optional("cover_image_url", self.cover_image_url, MAX_URL_LEN)?,
            published: self.published.unwrap_or(false),
            created_at: Utc::now(),
        })
    }
}

/// Lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// GET /blog query. Drafts never appear in listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogQuery {
    pub tag: Option<String>,
    pub q: Option<String>,
}

impl BlogQuery {
    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .eq("published", true)
            .has_opt("tags", exact(&self.tag))
            .search(search_term(&self.q), BlogPost::SEARCH_FIELDS)
    }
}
