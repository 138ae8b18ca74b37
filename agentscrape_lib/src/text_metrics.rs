//! Visible-text metric extraction, used to supplement the structured path.
//!
//! For each target name, every text node spelling that name is located and
//! its enclosing containers are searched, innermost first, for either a
//! decorated detail item (`<li class="...detail-item"><span class="bold">12</span> Sold</li>`)
//! or a plain `Sold: 12` / `For sale: 3` label. The ascent is bounded.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::metrics::MAX_PLAUSIBLE_COUNT;
use crate::types::AgentMetrics;

/// How many containers above a matched name are searched.
pub const MAX_ANCESTOR_DEPTH: usize = 8;

static DETAIL_ITEM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="detail-item"], [data-testid*="detail-item"]"#)
        .expect("invalid selector: detail item")
});

static EMPHASIS_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"strong, b, em, [class*="bold"], [class*="price"]"#)
        .expect("invalid selector: emphasis")
});

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d[\d,]*)").expect("invalid regex: leading number"));

static SOLD_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsold\s*:\s*(\d[\d,]*)").expect("invalid regex: sold label"));

static FOR_SALE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+sale\s*:\s*(\d[\d,]*)").expect("invalid regex: for sale label")
});

/// Collapses whitespace runs, trims, and lowercases.
pub fn normalize_visible_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Metrics per normalized target name, read from the page's visible text.
pub fn text_metrics_by_name(
    document: &Html,
    targets: &HashSet<String>,
) -> HashMap<String, AgentMetrics> {
    text_metrics_with_depth(document, targets, MAX_ANCESTOR_DEPTH)
}

/// [`text_metrics_by_name`] with an explicit ancestor bound.
pub fn text_metrics_with_depth(
    document: &Html,
    targets: &HashSet<String>,
    max_depth: usize,
) -> HashMap<String, AgentMetrics> {
    let mut found: HashMap<String, AgentMetrics> = HashMap::new();
    if targets.is_empty() {
        return found;
    }

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if is_hidden_container(parent) {
            continue;
        }
        let normalized = normalize_visible_text(&text.text);
        if !targets.contains(&normalized) {
            continue;
        }
        let metrics = metrics_near(parent, max_depth);
        if !metrics.is_empty() {
            found.entry(normalized).or_default().merge_max(metrics);
        }
    }

    found
}

fn is_hidden_container(element: ElementRef) -> bool {
    matches!(
        element.value().name(),
        "script" | "style" | "noscript" | "template" | "title"
    )
}

/// `start` followed by its element ancestors, at most `max_depth` in total.
pub fn bounded_containers(
    start: ElementRef<'_>,
    max_depth: usize,
) -> impl Iterator<Item = ElementRef<'_>> {
    std::iter::once(start)
        .chain(start.ancestors().filter_map(ElementRef::wrap))
        .take(max_depth)
}

/// Searches outward from `start`, stopping at the first container that
/// yields a labelled count.
fn metrics_near(start: ElementRef, max_depth: usize) -> AgentMetrics {
    for container in bounded_containers(start, max_depth) {
        if let Some(metrics) = detail_item_metrics(container) {
            return metrics;
        }
        if let Some(metrics) = labelled_text_metrics(container) {
            return metrics;
        }
    }
    AgentMetrics::default()
}

fn detail_item_metrics(container: ElementRef) -> Option<AgentMetrics> {
    let mut best = AgentMetrics::default();
    let mut matched = false;

    for item in container.select(&DETAIL_ITEM_SELECTOR) {
        let label = normalize_visible_text(&flatten_text(item));
        let is_for_sale = label.contains("for sale");
        let is_sold = label.contains("sold") && !label.contains("unsold");
        if !is_for_sale && !is_sold {
            continue;
        }
        let Some(count) = item
            .select(&EMPHASIS_SELECTOR)
            .find_map(|value| leading_count(&flatten_text(value)))
        else {
            continue;
        };
        matched = true;
        let count = plausible(count);
        if is_for_sale {
            best.merge_max(AgentMetrics::new(None, count));
        } else {
            best.merge_max(AgentMetrics::new(count, None));
        }
    }

    matched.then_some(best)
}

fn labelled_text_metrics(container: ElementRef) -> Option<AgentMetrics> {
    let text = flatten_text(container);
    let sold = labelled_counts(&SOLD_LABEL, &text);
    let for_sale = labelled_counts(&FOR_SALE_LABEL, &text);
    if sold.is_none() && for_sale.is_none() {
        return None;
    }
    Some(AgentMetrics::new(
        sold.and_then(plausible),
        for_sale.and_then(plausible),
    ))
}

/// Largest count captured by `pattern`, or `None` when it never matches.
fn labelled_counts(pattern: &Regex, text: &str) -> Option<u64> {
    pattern
        .captures_iter(text)
        .filter_map(|cap| parse_count(&cap[1]))
        .max()
}

fn flatten_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn leading_count(text: &str) -> Option<u64> {
    let cap = LEADING_NUMBER.captures(text)?;
    parse_count(&cap[1])
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.replace(',', "").parse().ok()
}

fn plausible(count: u64) -> Option<u64> {
    (count <= MAX_PLAUSIBLE_COUNT).then_some(count)
}
