//! Validation for the inputs that select which directory pages to read.

use crate::error::AgentScrapeError;

pub const MAX_CITY_LENGTH: usize = 100;
pub const MAX_PAGES_LIMIT: u32 = 500;
/// Longest allowed pause between pages, in seconds.
pub const MAX_DELAY_SECS: f64 = 300.0;

pub const VALID_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "AS", "GU", "MP", "PR", "VI",
];

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, AgentScrapeError> {
    if input.len() > max_len {
        return Err(AgentScrapeError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(AgentScrapeError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Turn a city name into the URL slug the directory uses: lowercase, runs of
/// spaces become a single `-`. Only ASCII letters, digits and `-` survive.
pub fn validate_city(input: &str) -> Result<String, AgentScrapeError> {
    let sanitized = sanitize_text(input, MAX_CITY_LENGTH)?;
    let slug = sanitized
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(AgentScrapeError::InvalidInput(format!(
            "city '{}' contains unsupported character '{}'. Use the slug form, e.g. 'vancouver' \
             or 'san-diego' (not 'Vancouver, WA')",
            input, bad
        )));
    }
    Ok(slug)
}

/// Validate a US state code: uppercase, check against known states + territories.
pub fn validate_state(input: &str) -> Result<String, AgentScrapeError> {
    let upper = input.trim().to_uppercase();
    if VALID_STATES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(AgentScrapeError::InvalidInput(format!(
            "unknown state code '{}'. Valid codes: AL, AK, AZ, ... DC, PR, VI (50 states + DC + territories)",
            input
        )))
    }
}

/// Validate the page budget for one run (must be 1..=MAX_PAGES_LIMIT).
pub fn validate_max_pages(max_pages: u32) -> Result<u32, AgentScrapeError> {
    if !(1..=MAX_PAGES_LIMIT).contains(&max_pages) {
        return Err(AgentScrapeError::InvalidInput(format!(
            "max_pages must be between 1 and {}",
            MAX_PAGES_LIMIT
        )));
    }
    Ok(max_pages)
}

/// Validate the inter-page delay bounds in seconds: finite, within
/// `0..=MAX_DELAY_SECS`, and `min <= max`.
pub fn validate_delay_range(min: f64, max: f64) -> Result<(f64, f64), AgentScrapeError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
        return Err(AgentScrapeError::InvalidInput(
            "delays must be finite, non-negative numbers of seconds".to_string(),
        ));
    }
    if max > MAX_DELAY_SECS {
        return Err(AgentScrapeError::InvalidInput(format!(
            "delays must not exceed {} seconds",
            MAX_DELAY_SECS
        )));
    }
    if min > max {
        return Err(AgentScrapeError::InvalidInput(format!(
            "delay_min ({}) must not exceed delay_max ({})",
            min, max
        )));
    }
    Ok((min, max))
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
