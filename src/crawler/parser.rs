//! HTML parser for listing pages
//!
//! This module extracts from one listing page:
//! - Article records (title, date, absolute URL)
//! - The link to the next listing page, if pagination continues
//!
//! Parsing never fails. Missing structure degrades to empty results at the
//! smallest scope: a broken entry is skipped, a page without the expected
//! container yields no records.

use crate::article::Article;
use crate::config::ListingLayout;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Everything the crawl engine needs from one listing page
#[derive(Debug, Clone, Default)]
pub struct ParsedListing {
    /// Records in page order
    pub articles: Vec<Article>,

    /// Absolute URL of the next listing page
    pub next_page: Option<Url>,
}

/// Parses a listing page once and extracts both records and pagination
///
/// # Example
///
/// ```
/// use tidewatch::config::ListingLayout;
/// use tidewatch::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<div class="cc-list-content"><ul>
///     <li><a href="/news/1.shtml" title="Hydrogen">Hydrogen</a><span>2024-05-06</span></li>
/// </ul></div>"#;
/// let base_url = Url::parse("https://news.example.com/zq").unwrap();
/// let listing = parse_listing(html, &base_url, &ListingLayout::default());
/// assert_eq!(listing.articles[0].url, "https://news.example.com/news/1.shtml");
/// assert!(listing.next_page.is_none());
/// ```
pub fn parse_listing(html: &str, base_url: &Url, layout: &ListingLayout) -> ParsedListing {
    let document = Html::parse_document(html);
    ParsedListing {
        articles: extract_records(&document, base_url, layout),
        next_page: extract_next_page(&document, base_url, layout),
    }
}

/// Extracts article records from a listing page
pub fn parse_records(html: &str, base_url: &Url, layout: &ListingLayout) -> Vec<Article> {
    let document = Html::parse_document(html);
    extract_records(&document, base_url, layout)
}

/// Extracts the next listing page URL, if pagination continues
pub fn parse_next_page(html: &str, base_url: &Url, layout: &ListingLayout) -> Option<Url> {
    let document = Html::parse_document(html);
    extract_next_page(&document, base_url, layout)
}

fn extract_records(document: &Html, base_url: &Url, layout: &ListingLayout) -> Vec<Article> {
    let Some(selectors) = RecordSelectors::new(layout) else {
        return Vec::new();
    };

    let Some(container) = document.select(&selectors.container).next() else {
        tracing::warn!("Could not find listing container '{}'", layout.container);
        return Vec::new();
    };

    let Some(list) = container.select(&selectors.list).next() else {
        tracing::warn!(
            "Could not find list '{}' within '{}'",
            layout.list,
            layout.container
        );
        return Vec::new();
    };

    let items: Vec<ElementRef> = list.select(&selectors.item).collect();
    tracing::info!("Found {} article items on page", items.len());

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| extract_record(item, index, base_url, &selectors))
        .collect()
}

/// Builds one record from a list entry, or skips it with a warning
fn extract_record(
    item: ElementRef,
    index: usize,
    base_url: &Url,
    selectors: &RecordSelectors,
) -> Option<Article> {
    let Some(link) = item.select(&selectors.link).next() else {
        tracing::warn!("No link found in item {}", index + 1);
        return None;
    };

    let title = link
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| element_text(link));

    let href = link.value().attr("href").map(str::trim).unwrap_or("");
    if href.is_empty() {
        tracing::warn!("No href found in item {}", index + 1);
        return None;
    }

    let Some(url) = resolve_href(href, base_url) else {
        tracing::warn!("Unresolvable href '{}' in item {}", href, index + 1);
        return None;
    };

    if title.is_empty() {
        tracing::warn!("Incomplete data for item {}: empty title ({})", index + 1, url);
        return None;
    }

    let date = item
        .select(&selectors.date)
        .next()
        .map(element_text)
        .unwrap_or_default();

    tracing::debug!("Parsed article: {} ({})", title, date);
    Some(Article::new(title, date, url.to_string()))
}

fn extract_next_page(document: &Html, base_url: &Url, layout: &ListingLayout) -> Option<Url> {
    let pagination_selector = Selector::parse(&layout.pagination).ok()?;
    let link_selector = Selector::parse("a").ok()?;

    let pagination = document.select(&pagination_selector).next()?;

    let next_link = pagination
        .select(&link_selector)
        .find(|a| element_text(*a) == layout.next_label.trim())?;

    let element = next_link.value();
    if element.classes().any(|c| c == layout.disabled_class) || element.attr("disabled").is_some() {
        tracing::debug!("Next page control is disabled");
        return None;
    }

    let href = element.attr("href")?.trim();
    if is_placeholder_href(href) {
        return None;
    }

    resolve_href(href, base_url)
}

/// Returns true for hrefs that do not navigate anywhere
fn is_placeholder_href(href: &str) -> bool {
    href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:")
}

/// Resolves an href against the page URL, keeping only http(s) targets
fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let resolved = base_url.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Visible text of an element with whitespace runs collapsed
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compiled selectors for record extraction
struct RecordSelectors {
    container: Selector,
    list: Selector,
    item: Selector,
    link: Selector,
    date: Selector,
}

impl RecordSelectors {
    fn new(layout: &ListingLayout) -> Option<Self> {
        let parse = |selector: &str| match Selector::parse(selector) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::error!("Invalid selector '{}': {:?}", selector, e);
                None
            }
        };

        Some(Self {
            container: parse(layout.container.as_str())?,
            list: parse(layout.list.as_str())?,
            item: parse(layout.item.as_str())?,
            link: parse(layout.link.as_str())?,
            date: parse(layout.date.as_str())?,
        })
    }
}
