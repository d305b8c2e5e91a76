// src/fetch/mod.rs
//! Certificate scraping, polymorphic over transport: a plain HTTP GET for
//! public profiles ([`HttpSource`]) or a headless browser session with a
//! login step for private ones ([`BrowserSource`]).

mod browser;
mod http;

pub use browser::BrowserSource;
pub use http::HttpSource;

use crate::types::Certificate;
use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

pub const PROFILE_BASE_URL: &str = "https://www.dio.me/users";
pub const SIGN_IN_URL: &str = "https://www.dio.me/sign-in";

/// Host fragment that marks an anchor as a certificate link.
pub const CERTIFICATE_HOST: &str = "hermes.dio.me";
pub const CERTIFICATE_LINK_SELECTOR: &str = r#"a[href*="hermes.dio.me"]"#;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[async_trait]
pub trait CertificateSource {
    /// Fetch the deduplicated certificate list for a profile.
    ///
    /// Transport problems on the profile page itself degrade to an empty
    /// list; only failures that invalidate the whole run (a failed login)
    /// surface as errors.
    async fn fetch(&self, username: &str) -> Result<Vec<Certificate>>;
}

pub(crate) fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// Scan rendered profile markup for certificate links.
///
/// Keeps the first occurrence of each URL. The title is the anchor's own
/// text; anchors that only wrap an image fall back to the nearest ancestor
/// element's text. Anchors with no usable title are skipped.
pub fn extract_certificates(html: &str, date: &str) -> Vec<Certificate> {
    let Ok(selector) = Selector::parse(CERTIFICATE_LINK_SELECTOR) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut certificates = Vec::new();

    for anchor in document.select(&selector) {
        let Some(url) = anchor.value().attr("href") else {
            continue;
        };

        let mut title = clean_text(&anchor.text().collect::<Vec<_>>().join(" "));
        if title.is_empty() {
            if let Some(parent) = anchor.ancestors().filter_map(ElementRef::wrap).next() {
                title = clean_text(&parent.text().collect::<Vec<_>>().join(" "));
            }
        }

        if title.is_empty() {
            continue;
        }
        if !seen.insert(url.to_string()) {
            continue;
        }

        certificates.push(Certificate {
            title,
            url: url.to_string(),
            date: date.to_string(),
        });
    }

    certificates
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
