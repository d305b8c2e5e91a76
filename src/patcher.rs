// src/patcher.rs
//! Textual patching of the static resume HTML.
//!
//! Both edits are byte-preserving splices into the original document text:
//! everything outside the patched spans keeps its exact formatting. The
//! resume itself is the durable state — a certificate link already present
//! contributes nothing, so applying the same data file twice is a no-op.

use crate::fetch::CERTIFICATE_LINK_SELECTOR;
use crate::skills::detect_skills;
use crate::types::{Certificate, RunResult};
use anyhow::{Context, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

/// Heading text that marks the certificate section.
const SECTION_HEADING: &str = "Digital Innovation One";
const HEADING_PATTERN: &str = r#"<h5[^>]*class="[^"]*w3-opacity[^"]*"[^>]*>"#;

pub struct PatchOutcome {
    pub html: String,
    pub updated_skills: Vec<String>,
    pub added_certificates: usize,
}

impl PatchOutcome {
    pub fn changed(&self) -> bool {
        self.added_certificates > 0 || !self.updated_skills.is_empty()
    }
}

/// Apply a fetched snapshot to the resume text.
///
/// Only certificates whose URL is not already in the document count: they
/// are appended to the certificate list, and their titles drive the
/// progress-bar increments. Each affected skill advances by
/// `count × increment`, capped at 100.
pub fn patch_resume(html: &str, data: &RunResult, skill_increment: u32) -> Result<PatchOutcome> {
    let existing = existing_certificate_urls(html);
    let new_certificates: Vec<&Certificate> = data
        .certificates
        .iter()
        .filter(|cert| !existing.contains(&cert.url))
        .collect();

    let counts = detect_skills(new_certificates.iter().map(|c| c.title.as_str()));

    let (html, updated_skills) = update_skill_bars(html, &counts, skill_increment)?;
    let (html, added_certificates) = append_certificates(&html, &new_certificates);

    Ok(PatchOutcome {
        html,
        updated_skills,
        added_certificates,
    })
}

fn existing_certificate_urls(html: &str) -> HashSet<String> {
    let mut urls = HashSet::new();
    let Ok(selector) = Selector::parse(CERTIFICATE_LINK_SELECTOR) else {
        return urls;
    };

    let document = Html::parse_document(html);
    for anchor in document.select(&selector) {
        if let Some(href) = anchor.value().attr("href") {
            urls.insert(href.to_string());
        }
    }
    urls
}

/// Regex for one skill's label followed by its W3.CSS progress bar. The
/// percentage appears twice (width style and inner text) and both spans are
/// rewritten together so they never drift apart.
fn skill_bar_regex(label: &str) -> Result<Regex> {
    let pattern = format!(
        r#"(<p>{}</p>\s*<div class="w3-light-grey w3-round-xlarge w3-small">\s*<div class="w3-container w3-center w3-round-xlarge w3-red" style="width:)(\d+)(%;?">)(\d+)(%;?</div>)"#,
        regex::escape(label)
    );
    Regex::new(&pattern).with_context(|| format!("Invalid progress-bar pattern for '{}'", label))
}

fn update_skill_bars(
    html: &str,
    counts: &BTreeMap<String, u32>,
    increment: u32,
) -> Result<(String, Vec<String>)> {
    let mut html = html.to_string();
    let mut updated = Vec::new();

    for (skill, count) in counts {
        let regex = skill_bar_regex(skill)?;

        let patch = {
            let Some(caps) = regex.captures(&html) else {
                warn!("Skill '{}' not found in the resume, skipping", skill);
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let current: u32 = match caps[2].parse() {
                Ok(value) => value,
                Err(_) => continue,
            };

            // `skill_increment` is user-edited config; don't trust it not
            // to overflow.
            let new = current
                .saturating_add(count.saturating_mul(increment))
                .min(100);
            if new > current {
                let replacement =
                    format!("{}{}{}{}{}", &caps[1], new, &caps[3], new, &caps[5]);
                Some((whole.start(), whole.end(), current, new, replacement))
            } else {
                None
            }
        };

        if let Some((start, end, current, new, replacement)) = patch {
            html.replace_range(start..end, &replacement);
            updated.push(format!("{} ({}% -> {}%)", skill, current, new));
        }
    }

    if !updated.is_empty() {
        info!("Skills updated: {}", updated.join(", "));
    }

    Ok((html, updated))
}

fn append_certificates(html: &str, certificates: &[&Certificate]) -> (String, usize) {
    if certificates.is_empty() {
        return (html.to_string(), 0);
    }

    let Some(list_end) = find_certificate_list_end(html) else {
        return (html.to_string(), 0);
    };

    // Match the indentation of the closing </ul> when it sits on its own
    // line; otherwise splice the items in without any formatting.
    let line_start = html[..list_end].rfind('\n').map(|i| i + 1).unwrap_or(list_end);
    let closing_prefix = &html[line_start..list_end];
    let on_own_line = closing_prefix.chars().all(|c| c == ' ' || c == '\t');

    let (insert_at, item_prefix, item_suffix) = if on_own_line {
        (line_start, format!("{}  ", closing_prefix), "\n")
    } else {
        (list_end, String::new(), "")
    };

    let mut block = String::new();
    for cert in certificates {
        let title = if cert.title.contains("Curso:") {
            cert.title.clone()
        } else {
            format!("Curso: {}", cert.title)
        };

        block.push_str(&format!(
            "{}<li><a href=\"{}\" target=\"_blank\">{}</a></li>{}",
            item_prefix,
            html_escape::encode_double_quoted_attribute(&cert.url),
            html_escape::encode_text(&title),
            item_suffix
        ));
    }

    info!("Appending {} new certificates", certificates.len());

    let mut patched = String::with_capacity(html.len() + block.len());
    patched.push_str(&html[..insert_at]);
    patched.push_str(&block);
    patched.push_str(&html[insert_at..]);
    (patched, certificates.len())
}

/// Byte offset of the `</ul>` closing the certificate list: the first list
/// between the section heading and the next section heading. A section
/// without a list of its own must not leak into a later section's list.
fn find_certificate_list_end(html: &str) -> Option<usize> {
    let Ok(heading_regex) = Regex::new(HEADING_PATTERN) else {
        return None;
    };

    for heading in heading_regex.find_iter(html) {
        let after = &html[heading.end()..];
        let Some(heading_close) = after.find("</h5>") else {
            continue;
        };
        if !after[..heading_close].contains(SECTION_HEADING) {
            continue;
        }

        let section_start = heading.end() + heading_close;
        let section_end = heading_regex
            .find_at(html, heading.end())
            .map(|next| next.start())
            .unwrap_or(html.len())
            .max(section_start);

        let section = &html[section_start..section_end];
        let Some(list_open) = section.find("<ul") else {
            warn!("Certificate list not found in the DIO section");
            return None;
        };
        let Some(list_close) = section[list_open..].find("</ul>") else {
            warn!("Certificate list is not closed in the DIO section");
            return None;
        };

        return Some(section_start + list_open + list_close);
    }

    warn!("DIO section not found in the resume");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resume() -> String {
        r#"<!DOCTYPE html>
<html>
<body>
  <div class="w3-container">
    <p>Python / Programação Orientada a Objetos</p>
    <div class="w3-light-grey w3-round-xlarge w3-small">
      <div class="w3-container w3-center w3-round-xlarge w3-red" style="width:40%">40%</div>
    </div>
    <p>Java</p>
    <div class="w3-light-grey w3-round-xlarge w3-small">
      <div class="w3-container w3-center w3-round-xlarge w3-red" style="width:98%">98%</div>
    </div>
  </div>
  <div class="w3-container">
    <h5 class="w3-opacity"><b>Cursos - Digital Innovation One</b></h5>
    <ul>
      <li><a href="https://hermes.dio.me/certificates/OLD.pdf" target="_blank">Curso: Antigo</a></li>
    </ul>
  </div>
</body>
</html>
"#
        .to_string()
    }

    fn cert(title: &str, url: &str) -> Certificate {
        Certificate {
            title: title.to_string(),
            url: url.to_string(),
            date: "2026-08-23".to_string(),
        }
    }

    fn run_result(certs: Vec<Certificate>) -> RunResult {
        let skills = detect_skills(certs.iter().map(|c| c.title.as_str()));
        RunResult {
            certificates: certs,
            skills,
            last_update: "2026-08-23 10:00:00".to_string(),
        }
    }

    #[test]
    fn skill_bar_advances_in_both_positions() {
        let data = run_result(vec![cert(
            "Curso de Python Básico",
            "https://hermes.dio.me/certificates/NEW1.pdf",
        )]);

        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(outcome.changed());
        assert!(outcome.html.contains(r#"style="width:45%">45%</div>"#));
        assert!(!outcome.html.contains(r#"style="width:40%""#));
    }

    #[test]
    fn skill_bar_is_capped_at_100() {
        let data = run_result(vec![cert(
            "Fundamentos de Java Spring",
            "https://hermes.dio.me/certificates/NEW2.pdf",
        )]);

        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(outcome.html.contains(r#"style="width:100%">100%</div>"#));
    }

    #[test]
    fn skill_at_100_stays_at_100() {
        let html = sample_resume().replace("98%", "100%");
        let data = run_result(vec![cert(
            "Fundamentos de Java Spring",
            "https://hermes.dio.me/certificates/NEW2.pdf",
        )]);

        let outcome = patch_resume(&html, &data, 5).unwrap();
        assert!(outcome.html.contains(r#"style="width:100%">100%</div>"#));
        // The certificate is still appended even though the bar is full.
        assert_eq!(outcome.added_certificates, 1);
        assert!(outcome.updated_skills.is_empty());
    }

    #[test]
    fn count_multiplies_the_increment() {
        let data = run_result(vec![
            cert("Python I", "https://hermes.dio.me/certificates/P1.pdf"),
            cert("Python II", "https://hermes.dio.me/certificates/P2.pdf"),
        ]);

        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(outcome.html.contains(r#"style="width:50%">50%</div>"#));
    }

    #[test]
    fn skill_without_a_bar_is_skipped() {
        let data = run_result(vec![cert(
            "Curso de SQL e Banco de Dados",
            "https://hermes.dio.me/certificates/DB.pdf",
        )]);

        // "Banco de dados" has no bar in the sample; the certificate still
        // lands in the list.
        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(outcome.updated_skills.is_empty());
        assert_eq!(outcome.added_certificates, 1);
    }

    #[test]
    fn new_certificate_is_appended_with_curso_prefix() {
        let data = run_result(vec![cert(
            "Git e GitHub na prática",
            "https://hermes.dio.me/certificates/GIT.pdf",
        )]);

        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert_eq!(outcome.added_certificates, 1);
        assert!(outcome.html.contains(
            r#"<li><a href="https://hermes.dio.me/certificates/GIT.pdf" target="_blank">Curso: Git e GitHub na prática</a></li>"#
        ));
    }

    #[test]
    fn existing_curso_prefix_is_not_doubled() {
        let data = run_result(vec![cert(
            "Curso: Git Essencial",
            "https://hermes.dio.me/certificates/GIT2.pdf",
        )]);

        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(outcome.html.contains(">Curso: Git Essencial</a>"));
        assert!(!outcome.html.contains("Curso: Curso:"));
    }

    #[test]
    fn present_url_is_not_reappended_and_does_not_bump_skills() {
        let data = run_result(vec![cert(
            "Curso de Python Básico",
            "https://hermes.dio.me/certificates/OLD.pdf",
        )]);

        let html = sample_resume();
        let outcome = patch_resume(&html, &data, 5).unwrap();
        assert!(!outcome.changed());
        assert_eq!(outcome.html, html);
    }

    #[test]
    fn patching_twice_is_a_no_op_the_second_time() {
        let data = run_result(vec![
            cert("Curso de Python Básico", "https://hermes.dio.me/certificates/A.pdf"),
            cert("Curso de SQL", "https://hermes.dio.me/certificates/B.pdf"),
        ]);

        let first = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(first.changed());

        let second = patch_resume(&first.html, &data, 5).unwrap();
        assert!(!second.changed());
        assert_eq!(second.html, first.html);
    }

    #[test]
    fn huge_increment_saturates_at_the_cap() {
        let data = run_result(vec![
            cert("Java básico", "https://hermes.dio.me/certificates/J1.pdf"),
            cert("Java avançado", "https://hermes.dio.me/certificates/J2.pdf"),
        ]);

        let outcome = patch_resume(&sample_resume(), &data, u32::MAX).unwrap();
        assert!(outcome.html.contains(r#"style="width:100%">100%</div>"#));
        assert!(!outcome.html.contains("width:98%"));
    }

    #[test]
    fn section_without_a_list_does_not_borrow_a_later_one() {
        let html = r#"<html><body>
  <div class="w3-container">
    <h5 class="w3-opacity"><b>Cursos - Digital Innovation One</b></h5>
    <p>Nenhum curso ainda.</p>
  </div>
  <div class="w3-container">
    <h5 class="w3-opacity"><b>Outros Links</b></h5>
    <ul>
      <li><a href="https://example.com/blog" target="_blank">Blog</a></li>
    </ul>
  </div>
</body></html>
"#;
        let data = run_result(vec![cert(
            "Curso de Python",
            "https://hermes.dio.me/certificates/LOST.pdf",
        )]);

        let outcome = patch_resume(html, &data, 5).unwrap();
        assert_eq!(outcome.added_certificates, 0);
        assert!(!outcome.html.contains("LOST.pdf"));
    }

    #[test]
    fn missing_section_appends_nothing() {
        let html = r#"<html><body><p>No certificates here</p></body></html>"#;
        let data = run_result(vec![cert(
            "Curso de Python",
            "https://hermes.dio.me/certificates/X.pdf",
        )]);

        let outcome = patch_resume(html, &data, 5).unwrap();
        assert_eq!(outcome.added_certificates, 0);
    }

    #[test]
    fn title_markup_is_escaped() {
        let data = run_result(vec![cert(
            "Curso de HTML <b>& CSS</b>",
            "https://hermes.dio.me/certificates/ESC.pdf",
        )]);

        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(outcome.html.contains("&lt;b&gt;&amp; CSS&lt;/b&gt;"));
    }

    #[test]
    fn appended_items_follow_list_indentation() {
        let data = run_result(vec![cert(
            "Curso de Python",
            "https://hermes.dio.me/certificates/IND.pdf",
        )]);

        let outcome = patch_resume(&sample_resume(), &data, 5).unwrap();
        assert!(outcome
            .html
            .contains("      <li><a href=\"https://hermes.dio.me/certificates/IND.pdf\""));
    }
}
