//! crates/podcast_muse_core/src/topics.rs
//!
//! Offline topic suggestions grouped by category.

use crate::domain::TopicSuggestion;

struct TopicSeed {
    title: &'static str,
    description: &'static str,
    target_audience: &'static str,
    estimated_length: &'static str,
    keywords: &'static [&'static str],
}

struct Category {
    name: &'static str,
    topics: &'static [TopicSeed],
}

const CATALOGUE: &[Category] = &[
    Category {
        name: "finance",
        topics: &[
            TopicSeed {
                title: "Investing for Beginners",
                description: "The basics of investing, financial planning and wealth-building strategies for people with no finance background.",
                target_audience: "Working adults aged 25-40 who want to start investing",
                estimated_length: "15-20 min",
                keywords: &["investing", "mutual funds", "stocks", "personal finance", "retirement plan"],
            },
            TopicSeed {
                title: "Managing Everyday Debt",
                description: "Techniques for handling credit card, car and home loans, with a plan for paying debt down efficiently.",
                target_audience: "Working people who want to get their debt under control",
                estimated_length: "12-15 min",
                keywords: &["debt management", "credit cards", "loans", "financial planning", "saving"],
            },
            TopicSeed {
                title: "Crypto 101: Cryptocurrency for Newcomers",
                description: "Bitcoin, Ethereum and other cryptocurrencies explained, with the risks and opportunities of investing in them.",
                target_audience: "Crypto-curious listeners with no background",
                estimated_length: "20-25 min",
                keywords: &["Bitcoin", "Ethereum", "Blockchain", "crypto investing", "DeFi"],
            },
        ],
    },
    Category {
        name: "self development",
        topics: &[
            TopicSeed {
                title: "Building Effective Communication Skills",
                description: "Public speaking, negotiation and relationship-building techniques for career success.",
                target_audience: "Professionals, business owners and students",
                estimated_length: "15-18 min",
                keywords: &["communication", "speaking", "presenting", "confidence", "networking"],
            },
            TopicSeed {
                title: "The Psychology of Success: Winning Habits",
                description: "The habits of successful people: time management, goal setting and a growth mindset.",
                target_audience: "Anyone working on personal growth",
                estimated_length: "18-22 min",
                keywords: &["mindset", "habits", "goal setting", "success", "personal growth"],
            },
            TopicSeed {
                title: "Work-Life Balance",
                description: "Strategies for managing time, reducing stress and balancing work, personal life and mental health.",
                target_audience: "Burnt-out professionals looking for balance",
                estimated_length: "12-15 min",
                keywords: &["work-life balance", "time management", "stress", "work", "mental health"],
            },
        ],
    },
    Category {
        name: "youth finance",
        topics: &[
            TopicSeed {
                title: "First Paycheck: Money Management for New Graduates",
                description: "Budgeting, saving, first investments and avoiding debt for people starting their first job.",
                target_audience: "Recent graduates and new employees",
                estimated_length: "10-12 min",
                keywords: &["first salary", "saving", "first investments", "gen z finance", "financial future"],
            },
            TopicSeed {
                title: "Digital Side Hustles",
                description: "Ideas for extra income in the digital age, from online selling and tutoring to small businesses.",
                target_audience: "Young people who want a second income",
                estimated_length: "15-20 min",
                keywords: &["side hustle", "extra income", "online", "small business", "freelance"],
            },
            TopicSeed {
                title: "Preparing to Buy Your First Home",
                description: "Getting financially ready to buy a home: saving the down payment and planning the mortgage.",
                target_audience: "Young people planning to buy a home",
                estimated_length: "18-22 min",
                keywords: &["buying a home", "mortgage", "down payment", "financial planning", "real estate"],
            },
        ],
    },
];

/// How many topics are offered when no category matches.
const FALLBACK_COUNT: usize = 3;

impl TopicSeed {
    fn to_domain(&self) -> TopicSuggestion {
        TopicSuggestion {
            title: self.title.to_string(),
            description: self.description.to_string(),
            target_audience: self.target_audience.to_string(),
            estimated_length: self.estimated_length.to_string(),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

pub fn categories() -> Vec<&'static str> {
    CATALOGUE.iter().map(|c| c.name).collect()
}

/// Suggests topics for `keyword`.
///
/// A category matches when its name contains the keyword or the keyword
/// contains the name (case-insensitive). With no match the first few topics of
/// the catalogue are offered instead. A blank keyword yields nothing.
pub fn suggest(keyword: &str) -> Vec<TopicSuggestion> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return Vec::new();
    }

    let found: Vec<TopicSuggestion> = CATALOGUE
        .iter()
        .filter(|c| c.name.contains(&keyword) || keyword.contains(c.name))
        .flat_map(|c| c.topics.iter().map(TopicSeed::to_domain))
        .collect();

    if !found.is_empty() {
        return found;
    }

    CATALOGUE
        .iter()
        .flat_map(|c| c.topics.iter())
        .take(FALLBACK_COUNT)
        .map(TopicSeed::to_domain)
        .collect()
}
