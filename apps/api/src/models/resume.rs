//! Canonical resume model and the normalization boundary.
//!
//! The rewrite service returns loosely-typed JSON (`RawResume`): scalars may be
//! missing, `education` arrives as either an object or an array, and experience
//! entries carry either a `bullets` array or a single `description` string.
//! `normalize` is the single place that resolves those shapes into the
//! `CanonicalResume` consumed by the renderer — if the upstream contract drifts,
//! this module is the only one that changes.

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder used when the upstream payload carries no usable name.
pub const NAME_PLACEHOLDER: &str = "Name Not Found";

/// Default end date for experience entries still in progress.
pub const PRESENT: &str = "Present";

// ────────────────────────────────────────────────────────────────────────────
// Raw upstream shapes
// ────────────────────────────────────────────────────────────────────────────

/// A field that may legally arrive as a single value or as an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Accepts explicit `null` where a sequence is expected. Models emit
/// `"education": null` and friends despite being told to omit missing
/// fields, and the request must not fail over it.
fn default_on_null<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// The rewrite service's payload as received, before normalization.
/// Unknown extra fields are ignored for forward compatibility.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResume {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub experience: Vec<RawExperience>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub education: OneOrMany<RawEducation>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExperience {
    pub position: Option<String>,
    pub company: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub bullets: Vec<String>,
    /// Legacy shape: a single free-text description instead of bullets.
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEducation {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical shapes
// ────────────────────────────────────────────────────────────────────────────

/// The single structured representation used between normalization and
/// rendering. Constructed once per request, consumed exactly once by the
/// renderer, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResume {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub position: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub year: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Maps the loosely-typed upstream payload into the canonical shape.
///
/// Pure and total: missing data is defaulted or omitted, never an error.
/// Idempotent over already-canonical data.
pub fn normalize(raw: RawResume) -> CanonicalResume {
    let name = clean_opt(raw.name).unwrap_or_else(|| NAME_PLACEHOLDER.to_string());

    let experience = raw
        .experience
        .into_iter()
        .filter_map(normalize_experience)
        .collect();

    let education = raw
        .education
        .into_vec()
        .into_iter()
        .filter_map(normalize_education)
        .collect();

    CanonicalResume {
        name,
        email: clean_opt(raw.email),
        phone: clean_opt(raw.phone),
        location: clean_opt(raw.location),
        linkedin: clean_opt(raw.linkedin),
        summary: clean_opt(raw.summary),
        experience,
        skills: clean_seq(raw.skills),
        education,
        certifications: clean_seq(raw.certifications),
    }
}

/// An emitted experience entry always has at least one bullet: a lone
/// `description` is wrapped as a one-element sequence, and entries with
/// neither bullets nor description are dropped.
fn normalize_experience(raw: RawExperience) -> Option<ExperienceEntry> {
    let mut bullets = clean_seq(raw.bullets);
    if bullets.is_empty() {
        bullets = clean_opt(raw.description).into_iter().collect();
    }
    if bullets.is_empty() {
        return None;
    }

    Some(ExperienceEntry {
        position: clean_opt(raw.position).unwrap_or_default(),
        company: clean_opt(raw.company).unwrap_or_default(),
        start_date: clean_opt(raw.start_date).unwrap_or_default(),
        end_date: clean_opt(raw.end_date).unwrap_or_else(|| PRESENT.to_string()),
        bullets,
    })
}

fn normalize_education(raw: RawEducation) -> Option<EducationEntry> {
    let degree = clean_opt(raw.degree).unwrap_or_default();
    let institution = clean_opt(raw.institution).unwrap_or_default();
    let year = clean_opt(raw.year).unwrap_or_default();
    if degree.is_empty() && institution.is_empty() && year.is_empty() {
        return None;
    }
    Some(EducationEntry {
        degree,
        institution,
        year,
    })
}

/// Trims whitespace and strips control characters. The renderer never sees
/// control bytes in any field.
fn clean(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

fn clean_opt(s: Option<String>) -> Option<String> {
    s.map(|s| clean(&s)).filter(|s| !s.is_empty())
}

fn clean_seq(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| clean(&s))
        .filter(|s| !s.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
