use std::net::SocketAddr;

use anyhow::Context;

use crate::query::{ParseOptions, DEFAULT_MAX_CLAUSES, MAX_SUGGESTIONS};

/// Runtime configuration read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub max_clauses: usize,
    pub max_suggestions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_clauses: DEFAULT_MAX_CLAUSES,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = match lookup("QUERY_ENGINE_ADDR") {
            Some(v) => v
                .parse()
                .with_context(|| format!("QUERY_ENGINE_ADDR is not a socket address: {v}"))?,
            None => defaults.bind_addr,
        };
        let max_clauses = match lookup("SEARCH_MAX_QUERY_CLAUSES") {
            Some(v) => v
                .parse()
                .with_context(|| format!("SEARCH_MAX_QUERY_CLAUSES is not a number: {v}"))?,
            None => defaults.max_clauses,
        };
        let max_suggestions = match lookup("SEARCH_MAX_SUGGESTIONS") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("SEARCH_MAX_SUGGESTIONS is not a number: {v}"))?
                .clamp(1, MAX_SUGGESTIONS),
            None => defaults.max_suggestions,
        };

        Ok(Self {
            bind_addr,
            max_clauses,
            max_suggestions,
        })
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_clauses: Some(self.max_clauses),
        }
    }
}
