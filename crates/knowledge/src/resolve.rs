//! Candidate key resolution: turn model-suggested keys into source URLs.

use crate::catalog::Catalog;
use crate::fuzzy;
use serde::Serialize;
use std::collections::HashSet;

/// How a single candidate key was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Resolution {
    /// Candidate is a catalog key
    Exact { candidate: String },
    /// Candidate matched a catalog key approximately
    Fuzzy {
        candidate: String,
        matched: String,
        score: u8,
    },
    /// No catalog key scored above the floor
    Miss {
        candidate: String,
        best_score: u8,
    },
}

impl Resolution {
    /// Catalog key whose URLs were used, if any.
    pub fn resolved_key(&self) -> Option<&str> {
        match self {
            Self::Exact { candidate } => Some(candidate.as_str()),
            Self::Fuzzy { matched, .. } => Some(matched.as_str()),
            Self::Miss { .. } => None,
        }
    }
}

/// Resolver output: ordered, deduplicated URLs plus per-candidate outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedUrls {
    pub urls: Vec<String>,
    pub resolutions: Vec<Resolution>,
}

/// Maps candidate keys onto catalog URLs.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    reference_url: String,
    fuzzy_floor: u8,
}

impl KeyResolver {
    /// `fuzzy_floor`: best fuzzy scores at or below this value are misses.
    pub fn new(reference_url: impl Into<String>, fuzzy_floor: u8) -> Self {
        Self {
            reference_url: reference_url.into(),
            fuzzy_floor,
        }
    }

    /// Resolve each candidate against the catalog and append the reference URL.
    ///
    /// Never fails and never returns an empty URL list.
    pub fn resolve(&self, candidates: &[String], catalog: &Catalog) -> ResolvedUrls {
        let mut urls = Vec::new();
        let mut seen = HashSet::new();
        let mut resolutions = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let resolution = self.resolve_one(candidate, catalog);

            if let Some(urls_for_key) = resolution.resolved_key().and_then(|k| catalog.urls_for(k)) {
                for url in urls_for_key {
                    if seen.insert(url.as_str()) {
                        urls.push(url.clone());
                    }
                }
            }

            resolutions.push(resolution);
        }

        if seen.insert(self.reference_url.as_str()) {
            urls.push(self.reference_url.clone());
        }

        ResolvedUrls { urls, resolutions }
    }

    fn resolve_one(&self, candidate: &str, catalog: &Catalog) -> Resolution {
        if catalog.urls_for(candidate).is_some() {
            return Resolution::Exact {
                candidate: candidate.to_string(),
            };
        }

        match fuzzy::best_match(candidate, catalog.keys().iter().map(String::as_str)) {
            Some((matched, score)) if score > self.fuzzy_floor => {
                tracing::info!(candidate, matched, score, "Fuzzy-matched candidate key");
                Resolution::Fuzzy {
                    candidate: candidate.to_string(),
                    matched: matched.to_string(),
                    score,
                }
            }
            best => {
                let best_score = best.map(|(_, score)| score).unwrap_or(0);
                tracing::info!(candidate, best_score, "No catalog key matches candidate, skipping");
                Resolution::Miss {
                    candidate: candidate.to_string(),
                    best_score,
                }
            }
        }
    }
}
