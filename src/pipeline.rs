// src/pipeline.rs
//! The two batch jobs behind the CLI: fetch a profile snapshot into the
//! data file, and apply a snapshot to the resume HTML.

use crate::fetch::CertificateSource;
use crate::patcher::patch_resume;
use crate::skills::detect_skills;
use crate::store::Store;
use crate::types::RunResult;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Scrape the profile, detect skills, and replace the data file with the
/// fresh snapshot. An unreachable or empty profile still writes a valid
/// empty snapshot; only config and login problems abort.
pub async fn run_fetch(source: &dyn CertificateSource, store: &dyn Store) -> Result<()> {
    let mut config = store.load_config()?;
    config.validate()?;

    let certificates = source.fetch(&config.dio_username).await?;
    if certificates.is_empty() {
        info!("No certificates found; writing an empty snapshot");
    }

    let skills = detect_skills(certificates.iter().map(|c| c.title.as_str()));
    if !skills.is_empty() {
        let summary: Vec<String> = skills.iter().map(|(k, v)| format!("{} ({})", k, v)).collect();
        info!("Skills detected: {}", summary.join(", "));
    }

    let now = now_timestamp();
    store.save_data(&RunResult {
        certificates,
        skills,
        last_update: now.clone(),
    })?;
    info!("Snapshot saved");

    config.last_update = Some(now);
    store.save_config(&config)?;

    Ok(())
}

/// Patch the resume HTML from the stored snapshot. Writes the file back
/// only when something actually changed.
pub fn run_update(store: &dyn Store, resume_path: &Path) -> Result<()> {
    let data = store.load_data()?;
    let config = store.load_config()?;

    if data.is_empty() {
        info!("Nothing new to apply");
        return Ok(());
    }

    let html = fs::read_to_string(resume_path)
        .with_context(|| format!("Failed to read resume file: {}", resume_path.display()))?;

    let outcome = patch_resume(&html, &data, config.skill_increment)?;

    if outcome.changed() {
        fs::write(resume_path, &outcome.html)
            .with_context(|| format!("Failed to write resume file: {}", resume_path.display()))?;
        info!(
            "Resume updated: {} certificates added, {} skills advanced",
            outcome.added_certificates,
            outcome.updated_skills.len()
        );
    } else {
        info!("Resume already up to date");
    }

    Ok(())
}
