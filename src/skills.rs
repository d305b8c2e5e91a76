// src/skills.rs
use std::collections::BTreeMap;

/// Skill taxonomy: resume skill label and the keyword fragments that map a
/// certificate title to it. Labels must match the `<p>` text in the resume.
pub const SKILL_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Python / Programação Orientada a Objetos",
        &["python", "poo", "programação orientada", "objetos"],
    ),
    ("HTML / CSS", &["html", "css", "web", "frontend", "front-end"]),
    (
        "Banco de dados",
        &["sql", "banco", "database", "mysql", "postgres", "oracle", "mongodb"],
    ),
    ("Java", &["java", "spring", "cloud native", "jvm"]),
    (
        "JavaScript",
        &["javascript", "js", "node", "react", "angular", "vue"],
    ),
    (
        "Git/GitHub",
        &["git", "github", "versionamento", "controle de versão"],
    ),
];

/// Count how many titles match each skill.
///
/// Matching is a case-insensitive substring check. A title counts at most
/// once per skill no matter how many of that skill's keywords it hits, but
/// may count toward several different skills.
pub fn detect_skills<'a>(titles: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, u32> {
    let mut detected = BTreeMap::new();

    for title in titles {
        let lower = title.to_lowercase();
        for (skill, keywords) in SKILL_TAXONOMY {
            if keywords.iter().any(|keyword| lower.contains(keyword)) {
                *detected.entry((*skill).to_string()).or_insert(0) += 1;
            }
        }
    }

    detected
}
