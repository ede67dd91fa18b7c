use anyhow::Result;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Extracted text never exceeds this many characters.
pub const MAX_PAGE_TEXT_CHARS: usize = 8000;

/// Element texts this short or shorter are dropped as navigation noise.
const MIN_FRAGMENT_CHARS: usize = 10;

const TEXT_ELEMENTS: &str = "p, h1, h2, h3, h4, h5, h6, li, td, th";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Title, description and content fragments, one per line.
    pub text: String,
}

/// Fetch a page and extract the text the classifier sees.
pub async fn extract_page_text(client: &Client, url: &Url) -> Result<ExtractedPage> {
    let response = client.get(url.as_str()).send().await?.error_for_status()?;
    let body = response.text().await?;
    Ok(extract_from_html(url.as_str(), &body))
}

pub fn extract_from_html(url: &str, html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = first_match(&document, "title")
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let description = first_match(&document, r#"meta[name="description"]"#)
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let mut lines: Vec<String> = title.iter().chain(description.iter()).cloned().collect();
    if let Ok(selector) = Selector::parse(TEXT_ELEMENTS) {
        lines.extend(
            document
                .select(&selector)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|text| text.chars().count() > MIN_FRAGMENT_CHARS),
        );
    }

    let text = lines.join("\n").chars().take(MAX_PAGE_TEXT_CHARS).collect();

    ExtractedPage {
        url: url.to_string(),
        title,
        description,
        text,
    }
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<scraper::ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}
