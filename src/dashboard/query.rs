use regex::Regex;
use std::sync::OnceLock;

/// What a line typed into the search box asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Single(String),
    Compare { left: String, right: String },
}

fn versus() -> &'static Regex {
    static VERSUS: OnceLock<Regex> = OnceLock::new();
    VERSUS.get_or_init(|| {
        // Non-greedy left side so "A vs B vs C" splits at the first separator.
        Regex::new(r"(?i)(.+?)\s+vs\.?\s+(.+)").expect("versus pattern is valid")
    })
}

/// `None` for blank input.
pub fn parse_query(input: &str) -> Option<Query> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(caps) = versus().captures(input) {
        let left = caps[1].trim();
        let right = caps[2].trim();
        if !left.is_empty() && !right.is_empty() {
            return Some(Query::Compare {
                left: left.to_string(),
                right: right.to_string(),
            });
        }
    }

    Some(Query::Single(input.to_string()))
}
