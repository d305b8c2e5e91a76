// src/fetch/browser.rs
//! Authenticated fetch through a headless Chrome session.
//!
//! DIO renders profiles client-side and hides private ones behind a login,
//! so this transport drives a real browser: sign in, then scrape the same
//! markup the HTTP transport would see. The sign-in form has changed
//! selectors before, hence the ordered fallback lists below.

use super::{
    extract_certificates, today, CertificateSource, PROFILE_BASE_URL, SIGN_IN_URL, USER_AGENT,
};
use crate::config::Credentials;
use crate::types::Certificate;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::{OsStr, OsString};
use std::time::Duration;
use tracing::{info, warn};

const EMAIL_SELECTORS: &[&str] = &["#email", r#"input[name="email"]"#, r#"input[type="email"]"#];
const PASSWORD_SELECTORS: &[&str] = &[
    "#password",
    r#"input[name="password"]"#,
    r#"input[type="password"]"#,
];
/// Button captions that identify the submit control when it carries no
/// usable type or class.
const SUBMIT_TEXT_HINTS: &[&str] = &["Entrar", "Login"];

/// Any of these showing up means we are looking at a logged-in page.
const LOGGED_IN_MARKER: &str =
    r#"[data-testid="user-menu"], .user-menu, [class*="avatar"], [class*="profile"]"#;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);
const LOGIN_SETTLE: Duration = Duration::from_secs(5);
const PAGE_SETTLE: Duration = Duration::from_secs(5);
const SCROLL_SETTLE: Duration = Duration::from_secs(2);

/// Authenticated fetcher: logs in with the given credentials, then scrapes
/// the profile from the same browser session.
pub struct BrowserSource {
    credentials: Credentials,
}

impl BrowserSource {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CertificateSource for BrowserSource {
    async fn fetch(&self, username: &str) -> Result<Vec<Certificate>> {
        let credentials = self.credentials.clone();
        let username = username.to_string();

        // headless_chrome is a blocking API; keep it off the runtime threads.
        tokio::task::spawn_blocking(move || fetch_with_login(&credentials, &username))
            .await
            .context("Browser task panicked")?
    }
}

fn fetch_with_login(credentials: &Credentials, username: &str) -> Result<Vec<Certificate>> {
    // The browser process is torn down when `browser` drops, on every
    // return path below.
    let browser = launch_browser()?;
    let tab = browser.new_tab().context("Failed to open a browser tab")?;

    login(&tab, credentials)?;
    Ok(scrape_profile(&tab, username))
}

fn launch_browser() -> Result<Browser> {
    info!("Launching headless Chrome");

    let user_agent = OsString::from(format!("--user-agent={}", USER_AGENT));
    let args: Vec<&OsStr> = vec![
        OsStr::new("--no-sandbox"),
        OsStr::new("--disable-dev-shm-usage"),
        OsStr::new("--disable-gpu"),
        user_agent.as_os_str(),
    ];

    Browser::new(LaunchOptions {
        headless: true,
        window_size: Some((1920, 1080)),
        args,
        ..Default::default()
    })
    .context("Failed to launch headless Chrome. Is Chrome/Chromium installed?")
}

/// Sign in and verify we actually left the login page.
///
/// Field lookups try each selector in order; the first hit wins. Any field
/// that cannot be located at all, or a post-submit state still on the
/// sign-in page, fails the whole run.
fn login(tab: &Tab, credentials: &Credentials) -> Result<()> {
    info!("Logging in to DIO as {}", mask_email(&credentials.email));

    tab.navigate_to(SIGN_IN_URL)
        .context("Failed to open the sign-in page")?;
    tab.wait_until_navigated()
        .context("Sign-in page did not load")?;

    let email_field = find_first(tab, EMAIL_SELECTORS, "email field")?;
    email_field
        .type_into(&credentials.email)
        .context("Failed to fill the email field")?;

    let password_field = find_first(tab, PASSWORD_SELECTORS, "password field")?;
    password_field
        .type_into(&credentials.password)
        .context("Failed to fill the password field")?;

    let submit = find_submit_button(tab)?;
    submit.click().context("Failed to submit the login form")?;

    std::thread::sleep(LOGIN_SETTLE);

    if tab.find_element(LOGGED_IN_MARKER).is_ok() {
        info!("Login succeeded");
        return Ok(());
    }
    if tab.get_url().contains("sign-in") {
        anyhow::bail!("Login failed: still on the sign-in page. Check DIO_EMAIL/DIO_PASSWORD");
    }

    // No marker, but we were redirected away from the login page.
    info!("Login succeeded");
    Ok(())
}

/// Try an ordered list of selectors; the first waits for dynamic content,
/// the fallbacks are immediate lookups.
fn find_first<'a>(tab: &'a Tab, selectors: &[&str], what: &str) -> Result<Element<'a>> {
    if let Some((first, rest)) = selectors.split_first() {
        if let Ok(element) = tab.wait_for_element_with_custom_timeout(first, LOOKUP_TIMEOUT) {
            return Ok(element);
        }
        for selector in rest {
            if let Ok(element) = tab.find_element(selector) {
                return Ok(element);
            }
        }
    }
    anyhow::bail!("Could not locate the {} on the sign-in page", what)
}

/// The submit control has three tiers: a typed submit button, any button
/// whose caption looks like a login action, and the primary-button class.
fn find_submit_button<'a>(tab: &'a Tab) -> Result<Element<'a>> {
    if let Ok(element) = tab.wait_for_element_with_custom_timeout(r#"button[type="submit"]"#, LOOKUP_TIMEOUT) {
        return Ok(element);
    }
    if let Ok(buttons) = tab.find_elements("button") {
        for button in buttons {
            if let Ok(text) = button.get_inner_text() {
                if is_submit_caption(&text) {
                    return Ok(button);
                }
            }
        }
    }
    if let Ok(element) = tab.find_element("button.btn-primary") {
        return Ok(element);
    }
    anyhow::bail!("Could not locate the submit button on the sign-in page")
}

fn is_submit_caption(text: &str) -> bool {
    SUBMIT_TEXT_HINTS.iter().any(|hint| text.contains(hint))
}

/// Render the profile and extract certificates. Failures here degrade to an
/// empty list; the session is already authenticated and the run can still
/// produce a valid (empty) snapshot.
fn scrape_profile(tab: &Tab, username: &str) -> Vec<Certificate> {
    let url = format!("{}/{}", PROFILE_BASE_URL, username);
    info!("Fetching DIO profile: {}", url);

    match render_profile(tab, &url) {
        Ok(html) => {
            let certificates = extract_certificates(&html, &today());
            info!("Found {} certificates on the profile", certificates.len());
            certificates
        }
        Err(e) => {
            warn!("Profile scrape failed, continuing with no certificates: {:#}", e);
            Vec::new()
        }
    }
}

fn render_profile(tab: &Tab, url: &str) -> Result<String> {
    tab.navigate_to(url).context("Failed to open the profile page")?;
    tab.wait_until_navigated().context("Profile page did not load")?;
    std::thread::sleep(PAGE_SETTLE);

    // Profiles lazy-load the certificate list; scroll to force it in.
    for _ in 0..2 {
        tab.evaluate("window.scrollTo(0, document.body.scrollHeight);", false)
            .context("Failed to scroll the profile page")?;
        std::thread::sleep(SCROLL_SETTLE);
    }

    tab.get_content().context("Failed to read the rendered profile")
}

fn mask_email(email: &str) -> String {
    let prefix: String = email.chars().take(3).collect();
    format!("{}***", prefix)
}
