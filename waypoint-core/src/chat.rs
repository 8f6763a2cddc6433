//! Keyword-matching assistant
//!
//! Messages are lower-cased and split into alphanumeric words. Rules are
//! checked in order; the first rule with a keyword equal to any word answers.

use serde::Serialize;

/// One keyword rule
#[derive(Debug, Clone, Copy)]
struct Rule {
    topic: &'static str,
    keywords: &'static [&'static str],
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        topic: "greeting",
        keywords: &["hello", "hi", "hey", "namaste", "greetings"],
        reply: "Hello! I can help with study and work opportunities abroad. Ask me about countries, visas, scholarships, or how to apply.",
    },
    Rule {
        topic: "visa",
        keywords: &["visa", "visas", "permit", "immigration", "embassy"],
        reply: "We guide you through student and work visa applications, from document checklists to interview preparation. Processing times usually range from 4 to 12 weeks depending on the country.",
    },
    Rule {
        topic: "scholarship",
        keywords: &["scholarship", "scholarships", "funding", "grant", "grants", "bursary"],
        reply: "Many universities offer merit and need-based scholarships. Share your academic background and target country and we will shortlist options for you.",
    },
    Rule {
        topic: "language_test",
        keywords: &["ielts", "toefl", "pte", "duolingo", "english"],
        reply: "Most programs ask for IELTS, TOEFL, or PTE scores. We offer preparation guidance and can tell you the minimum band each institution expects.",
    },
    Rule {
        topic: "cost",
        keywords: &["cost", "costs", "fee", "fees", "tuition", "expense", "expenses", "budget", "price"],
        reply: "Costs depend on the country, institution, and city. Tuition plus living expenses typically starts around USD 15,000 per year; ask about a specific destination for a detailed estimate.",
    },
    Rule {
        topic: "documents",
        keywords: &["document", "documents", "passport", "transcript", "transcripts", "sop", "paperwork"],
        reply: "Typical documents: valid passport, academic transcripts, language test results, statement of purpose, recommendation letters, and proof of funds.",
    },
    Rule {
        topic: "countries",
        keywords: &["country", "countries", "destination", "destinations", "australia", "canada", "uk", "germany", "zealand", "usa"],
        reply: "Popular destinations include Australia, Canada, the UK, Germany, New Zealand, and the USA. Browse the countries section to compare them.",
    },
    Rule {
        topic: "study",
        keywords: &["study", "course", "courses", "university", "universities", "college", "degree", "masters", "bachelor"],
        reply: "We match you with universities and courses that fit your profile and budget. Tell us your field of interest and preferred intake.",
    },
    Rule {
        topic: "work",
        keywords: &["job", "jobs", "work", "career", "employment", "salary", "internship", "vacancy", "vacancies"],
        reply: "Check the opportunities section for current openings abroad. You can filter by country and job type, including internships and work-study roles.",
    },
    Rule {
        topic: "apply",
        keywords: &["apply", "application", "applications", "register", "enroll", "enrol"],
        reply: "To apply, open an opportunity and submit the application form with your contact details. Our counsellors will follow up within two working days.",
    },
    Rule {
        topic: "consultation",
        keywords: &["consult", "consultation", "consultations", "counselling", "book", "booking", "appointment", "schedule"],
        reply: "You can book a one-to-one consultation from the consultation page. Pick a date and time that suits you and a counsellor will confirm it.",
    },
    Rule {
        topic: "contact",
        keywords: &["contact", "phone", "email", "call", "office", "address"],
        reply: "You can reach our counsellors through the contact form, by email, or by visiting one of our offices during working hours.",
    },
    Rule {
        topic: "help",
        keywords: &["help", "support", "assist", "assistance"],
        reply: "I can help with destinations, visas, scholarships, language tests, costs, required documents, and the application process. What would you like to know?",
    },
];

const FALLBACK_REPLY: &str = "I'd be happy to help! Ask me about study destinations, job opportunities, visas, scholarships, costs, or how to apply.";

/// Assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// Matched rule, `None` for the fallback reply
    pub topic: Option<&'static str>,
}

/// Stateless keyword assistant
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatBot;

impl ChatBot {
    pub fn new() -> Self {
        Self
    }

    /// Answer a user message.
    pub fn reply(&self, message: &str) -> ChatReply {
        let lowered = message.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let matched = RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| words.contains(k)));

        match matched {
            Some(rule) => ChatReply {
                reply: rule.reply.to_string(),
                topic: Some(rule.topic),
            },
            None => ChatReply {
                reply: FALLBACK_REPLY.to_string(),
                topic: None,
            },
        }
    }

    /// Topics in match order.
    pub fn topics(&self) -> impl Iterator<Item = &'static str> {
        RULES.iter().map(|r| r.topic)
    }
}
