// src/crawl/fetcher.rs
// =============================================================================
// Page fetching: the session interface the crawler drives, plus an HTTP
// implementation of it.
//
// A PageFetcher opens one PageSession per crawl. The session turns a URL
// into the page's visible text and the targets of its links. The crawler
// owns the session exclusively and closes it when the crawl ends.
//
// The HTTP implementation:
// - GETs the page with reqwest (following redirects)
// - refuses non-2xx responses and non-HTML content
// - parses the HTML with scraper, collecting body text line by line (block
//   elements break lines, script/style are skipped) and every <a href>,
//   resolved against the final page URL
// =============================================================================

use anyhow::Result;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

use crate::error::GuardianError;

// What a session hands back for one URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedPage {
    pub text: String,
    pub links: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    type Session: PageSession;

    // Acquires the session used for the whole crawl. Failing here is fatal.
    async fn open(&self) -> Result<Self::Session>;
}

#[allow(async_fn_in_trait)]
pub trait PageSession {
    async fn load(&mut self, url: &str) -> Result<LoadedPage, GuardianError>;

    async fn close(self);
}

// Elements whose text never shows up on screen
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

// Elements that start a new line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary",
    "table", "td", "th", "tr", "ul",
];

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        HttpFetcher {
            timeout,
            user_agent: format!("spell-guardian/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PageFetcher for HttpFetcher {
    type Session = HttpSession;

    async fn open(&self) -> Result<HttpSession> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        log::debug!("Opened HTTP session");
        Ok(HttpSession { client })
    }
}

#[derive(Debug)]
pub struct HttpSession {
    client: Client,
}

impl PageSession for HttpSession {
    async fn load(&mut self, url: &str) -> Result<LoadedPage, GuardianError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GuardianError::page_load(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardianError::page_load(url, format!("HTTP {}", status.as_u16())));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type.contains("html") {
                return Err(GuardianError::page_load(
                    url,
                    format!("unsupported content type {}", content_type),
                ));
            }
        }

        // Relative links resolve against where we ended up, not where we started
        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| GuardianError::page_load(url, e))?;

        Ok(parse_page(&html, &final_url))
    }

    async fn close(self) {
        log::debug!("Closed HTTP session");
    }
}

// Extracts visible text and absolute link targets from an HTML document.
//
// Parameters:
//   html: the HTML content to parse
//   base: the URL of the page (for resolving relative links)
pub fn parse_page(html: &str, base: &Url) -> LoadedPage {
    let document = Html::parse_document(html);

    LoadedPage {
        text: visible_text(&document),
        links: extract_links(&document, base),
    }
}

// The text under <body> as a reader sees it: inline markup runs together,
// block elements and <br> start new lines, whitespace inside a line is
// collapsed and blank lines are dropped. Hidden elements contribute nothing.
fn visible_text(document: &Html) -> String {
    // Constant selector, known to be valid
    let body = Selector::parse("body").unwrap();

    let mut raw = String::new();
    for root in document.select(&body) {
        collect_text(root, &mut raw);
    }

    raw.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source line breaks are layout, not content
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            continue;
        }

        let child = match ElementRef::wrap(child) {
            Some(child) => child,
            None => continue,
        };

        let name = child.value().name();
        if HIDDEN_ELEMENTS.iter().any(|hidden| *hidden == name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }

        let block = BLOCK_ELEMENTS.iter().any(|block| *block == name);
        if block {
            out.push('\n');
        }
        collect_text(child, out);
        if block {
            out.push('\n');
        }
    }
}

fn extract_links(document: &Html, base: &Url) -> Vec<String> {
    // Constant selector, known to be valid
    let anchors = Selector::parse("a[href]").unwrap();

    document
        .select(&anchors)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect()
}

// Resolves a link (possibly relative) to an absolute http(s) URL
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.test/ru/").unwrap()
    }

    #[test]
    fn test_resolve_absolute_link() {
        let result = resolve_link(&base(), "https://other.test");
        assert_eq!(result, Some("https://other.test/".to_string()));
    }

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(
            resolve_link(&base(), "b"),
            Some("https://example.test/ru/b".to_string())
        );
        assert_eq!(
            resolve_link(&base(), "/en"),
            Some("https://example.test/en".to_string())
        );
    }

    #[test]
    fn test_skip_special_links() {
        assert_eq!(resolve_link(&base(), "#section"), None);
        assert_eq!(resolve_link(&base(), "mailto:test@example.test"), None);
        assert_eq!(resolve_link(&base(), "tel:+7000"), None);
        assert_eq!(resolve_link(&base(), "javascript:void(0)"), None);
        assert_eq!(resolve_link(&base(), "ftp://example.test/file"), None);
        assert_eq!(resolve_link(&base(), "   "), None);
    }

    #[test]
    fn test_visible_text_skips_hidden_elements() {
        let html = r#"
            <html>
              <head><title>Не видно</title></head>
              <body>
                <h1>Заголовок</h1>
                <script>var hidden = "скрипт";</script>
                <style>.x { color: red }</style>
                <p>Тест <b>ошибка</b></p>
                <noscript>Включите JavaScript</noscript>
              </body>
            </html>
        "#;

        let page = parse_page(html, &base());
        assert_eq!(page.text, "Заголовок\nТест ошибка");
    }

    #[test]
    fn test_inline_markup_does_not_split_words() {
        let page = parse_page("<body><p>Ком<b>пания</b> работает</p></body>", &base());
        assert_eq!(page.text, "Компания работает");
    }

    #[test]
    fn test_blocks_and_breaks_start_new_lines() {
        let html = "<body><div>Первая\n   строка<br>вторая</div><ul><li>один</li><li>два</li></ul></body>";
        let page = parse_page(html, &base());
        assert_eq!(page.text, "Первая строка\nвторая\nодин\nдва");
    }

    #[test]
    fn test_links_are_resolved_in_order() {
        let html = r#"
            <a href="/ru/a">A</a>
            <a href="b">B</a>
            <a href="https://example.test/en">EN</a>
            <a href="mailto:x@example.test">Mail</a>
            <a>no href</a>
        "#;

        let page = parse_page(html, &base());
        assert_eq!(
            page.links,
            vec![
                "https://example.test/ru/a",
                "https://example.test/ru/b",
                "https://example.test/en",
            ]
        );
    }
}
