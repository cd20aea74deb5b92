use scraper::{ElementRef, Html, Selector};

use crate::models::{NO_TITLE, PriceOrigin, RawEntry, WatchDefinition};
use crate::plugins::trackers::PriceTracker;
use crate::utils::error::{AppError, Result};
use crate::utils::links::resolve_link;

/// Attributes checked, in order, on the link element.
const LINK_ATTRIBUTES: [&str; 2] = ["href", "data-href"];

/// What the extractor needs from a structural query engine.
pub trait ElementHandle: Sized {
    type Query;

    /// First descendant matching `query`, in document order.
    fn find_first(&self, query: &Self::Query) -> Option<Self>;

    /// All text below the element, trimmed.
    fn text_content(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;
}

impl<'a> ElementHandle for ElementRef<'a> {
    type Query = Selector;

    fn find_first(&self, query: &Selector) -> Option<Self> {
        self.select(query).next()
    }

    fn text_content(&self) -> String {
        self.text().collect::<String>().trim().to_string()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }
}

/// A watch's selectors, compiled for one query engine.
#[derive(Debug, Clone)]
pub struct WatchSelectors<Q> {
    pub item: Q,
    pub title: Option<Q>,
    pub price: Option<Q>,
    pub link: Option<Q>,
}

impl WatchSelectors<Selector> {
    pub fn compile(watch: &WatchDefinition) -> Result<Self> {
        Ok(Self {
            item: parse_selector(&watch.item_selector)?,
            title: parse_optional(watch.title_selector.as_deref())?,
            price: parse_optional(watch.price_selector.as_deref())?,
            link: parse_optional(watch.link_selector.as_deref())?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

// Blank selectors are treated as not configured.
fn parse_optional(selector: Option<&str>) -> Result<Option<Selector>> {
    match selector.map(str::trim) {
        Some(s) if !s.is_empty() => parse_selector(s).map(Some),
        _ => Ok(None),
    }
}

/// Build one entry from one item element.
pub fn entry_from_item<E: ElementHandle>(
    item: &E,
    selectors: &WatchSelectors<E::Query>,
    page_url: &str,
    prices: &PriceTracker,
) -> RawEntry {
    let title = match &selectors.title {
        Some(query) => item.find_first(query).map(|el| el.text_content()),
        None => Some(item.text_content()),
    }
    .filter(|t| !t.is_empty())
    .unwrap_or_else(|| NO_TITLE.to_string());

    let selector_text = selectors
        .price
        .as_ref()
        .and_then(|query| item.find_first(query))
        .map(|el| el.text_content());

    let (price_text, price_origin) = if prices.normalize(selector_text.as_deref()).is_some() {
        (selector_text, PriceOrigin::Selector)
    } else if let Some(scanned) = prices.scan_text(&item.text_content()) {
        (Some(scanned), PriceOrigin::TextScan)
    } else {
        (selector_text.filter(|t| !t.is_empty()), PriceOrigin::Missing)
    };

    let href = selectors
        .link
        .as_ref()
        .and_then(|query| item.find_first(query))
        .and_then(|el| {
            LINK_ATTRIBUTES
                .iter()
                .filter_map(|name| el.attribute(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        });

    let link = match href {
        Some(href) => resolve_link(page_url, &href),
        None => page_url.to_string(),
    };

    RawEntry {
        title,
        price_text,
        price_origin,
        link,
    }
}

/// A parsed listing page bound to one watch's selectors.
pub struct ListingPage<'p> {
    document: Html,
    selectors: WatchSelectors<Selector>,
    page_url: &'p str,
    prices: &'p PriceTracker,
}

impl<'p> ListingPage<'p> {
    pub fn parse(markup: &str, watch: &'p WatchDefinition, prices: &'p PriceTracker) -> Result<Self> {
        let selectors = WatchSelectors::compile(watch)?;
        Ok(Self {
            document: Html::parse_document(markup),
            selectors,
            page_url: &watch.url,
            prices,
        })
    }

    /// Entries in document order. Every call starts a fresh pass.
    pub fn entries(&self) -> impl Iterator<Item = RawEntry> + '_ {
        self.document
            .select(&self.selectors.item)
            .map(move |item| entry_from_item(&item, &self.selectors, self.page_url, self.prices))
    }
}

/// Parse `markup` and collect its entries.
pub fn extract_entries(
    markup: &str,
    watch: &WatchDefinition,
    prices: &PriceTracker,
) -> Result<Vec<RawEntry>> {
    let page = ListingPage::parse(markup, watch, prices)?;
    Ok(page.entries().collect())
}
