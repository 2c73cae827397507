//! Name, tag and version matching against a cache

use crate::error::SurResult;
use crate::spec::Specification;
use regex::{Regex, RegexBuilder};

/// What to look for in a cache
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Sublet name, pattern or tag
    pub text: String,
    /// Only accept this exact version string
    pub version: Option<String>,
    /// Treat `text` as a case-insensitive pattern
    pub regex: bool,
    /// Also match `text` against tags
    pub tags: bool,
}

impl Query {
    /// Exact name lookup
    pub fn name(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_tags(mut self, tags: bool) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }
}

/// A compiled query
#[derive(Debug)]
pub struct Matcher {
    name: String,
    pattern: Option<Regex>,
    tag: Option<String>,
    version: Option<String>,
}

impl Matcher {
    /// Compile a query; fails only on an invalid pattern
    pub fn new(query: &Query) -> SurResult<Self> {
        let pattern = if query.regex {
            Some(
                RegexBuilder::new(&query.text)
                    .case_insensitive(true)
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            name: query.text.to_lowercase(),
            pattern,
            tag: query.tags.then(|| capitalize(&query.text)),
            version: query.version.clone(),
        })
    }

    /// Whether a single specification matches
    pub fn matches(&self, spec: &Specification) -> bool {
        let name = spec.name.to_lowercase();

        let hit = name == self.name
            || self.pattern.as_ref().is_some_and(|re| re.is_match(&name))
            || self
                .tag
                .as_ref()
                .is_some_and(|tag| spec.tags.iter().any(|t| t == tag));

        hit && self.version.as_ref().is_none_or(|v| &spec.version == v)
    }

    /// All matching specifications, in cache order
    pub fn search(&self, specs: &[Specification]) -> Vec<Specification> {
        specs.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

/// Compile `query` and search `specs` in one step
pub fn search(query: &Query, specs: &[Specification]) -> SurResult<Vec<Specification>> {
    Ok(Matcher::new(query)?.search(specs))
}

/// First character upper case, the rest lower case
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
