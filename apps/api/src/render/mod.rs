//! Deterministic PDF layout for a canonical resume record.
//!
//! Sections render top-to-bottom in a fixed order, separated by horizontal
//! rules; a section with no backing data is omitted entirely rather than
//! rendered empty. Vertical overflow flows onto additional pages through the
//! paginated canvas. Missing data is never an error here — the only failure
//! mode this module defines is an I/O failure while materializing output.

use thiserror::Error;

use crate::models::resume::{CanonicalResume, EducationEntry, ExperienceEntry};
use crate::render::canvas::{Align, PageCanvas, TextRun, CONTENT_WIDTH};
use crate::render::metrics::{metrics, Font};

pub mod canvas;
pub mod metrics;

// Ink palette, darkest to lightest.
const INK: (f32, f32, f32) = (0.102, 0.102, 0.180);
const BODY: (f32, f32, f32) = (0.200, 0.200, 0.200);
const SOFT: (f32, f32, f32) = (0.267, 0.267, 0.267);
const MUTED: (f32, f32, f32) = (0.333, 0.333, 0.333);
const FAINT: (f32, f32, f32) = (0.533, 0.533, 0.533);
const RULE: (f32, f32, f32) = (0.800, 0.800, 0.800);

const BULLET_PREFIX: &str = "\u{2022} ";
const BULLET_INDENT: f32 = 10.0;
const CONTACT_SEPARATOR: &str = "  \u{00B7}  ";
const SKILL_SEPARATOR: &str = "   \u{00B7}   ";
const DATE_DASH: &str = " \u{2013} ";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O failure while materializing output: {0}")]
    Io(#[from] std::io::Error),
}

/// Lays out the record into finished PDF bytes.
pub fn render(record: &CanonicalResume) -> Vec<u8> {
    let mut canvas = PageCanvas::new();

    canvas.text_line(&record.name, Font::Bold, 22.0, INK, Align::Center);
    canvas.space(4.0);

    let contact: Vec<&str> = [
        record.email.as_deref(),
        record.phone.as_deref(),
        record.location.as_deref(),
        record.linkedin.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !contact.is_empty() {
        canvas.text_line(
            &contact.join(CONTACT_SEPARATOR),
            Font::Regular,
            9.0,
            MUTED,
            Align::Center,
        );
    }
    canvas.hrule(RULE);

    if let Some(summary) = &record.summary {
        section_heading(&mut canvas, "Professional Summary");
        canvas.paragraph(summary, Font::Regular, 10.0, BODY, 0.0, None);
        canvas.hrule(RULE);
    }

    if !record.experience.is_empty() {
        section_heading(&mut canvas, "Career History");
        for entry in &record.experience {
            experience_entry(&mut canvas, entry);
        }
        canvas.hrule(RULE);
    }

    if !record.skills.is_empty() {
        section_heading(&mut canvas, "Skills");
        canvas.paragraph(
            &record.skills.join(SKILL_SEPARATOR),
            Font::Regular,
            10.0,
            BODY,
            0.0,
            None,
        );
        canvas.hrule(RULE);
    }

    if !record.education.is_empty() {
        section_heading(&mut canvas, "Education");
        for entry in &record.education {
            education_entry(&mut canvas, entry);
        }
    }

    if !record.certifications.is_empty() {
        canvas.hrule(RULE);
        section_heading(&mut canvas, "Certifications");
        for cert in &record.certifications {
            canvas.paragraph(
                cert,
                Font::Regular,
                10.0,
                BODY,
                BULLET_INDENT,
                Some(BULLET_PREFIX),
            );
        }
    }

    canvas.finish()
}

fn section_heading(canvas: &mut PageCanvas, title: &str) {
    canvas.text_line(&title.to_uppercase(), Font::Bold, 12.0, INK, Align::Left);
    canvas.space(4.0);
}

fn experience_entry(canvas: &mut PageCanvas, entry: &ExperienceEntry) {
    // Title line: emphasized position, separator, company.
    let company_part;
    let mut runs: Vec<TextRun<'_>> = Vec::new();
    if !entry.position.is_empty() {
        runs.push(TextRun {
            text: &entry.position,
            font: Font::Bold,
            size: 11.0,
            color: INK,
        });
    }
    if !entry.company.is_empty() {
        company_part = if runs.is_empty() {
            entry.company.clone()
        } else {
            format!("{CONTACT_SEPARATOR}{}", entry.company)
        };
        runs.push(TextRun {
            text: &company_part,
            font: Font::Regular,
            size: 11.0,
            color: SOFT,
        });
    }
    if !runs.is_empty() {
        let width: f32 = runs
            .iter()
            .map(|r| metrics(r.font).measure_str(r.text, r.size))
            .sum();
        if width <= CONTENT_WIDTH {
            canvas.draw_runs(&runs, Align::Left, 0.0);
        } else {
            // A title too wide for one line stacks as wrapped paragraphs
            // instead of running past the margin.
            if !entry.position.is_empty() {
                canvas.paragraph(&entry.position, Font::Bold, 11.0, INK, 0.0, None);
            }
            if !entry.company.is_empty() {
                canvas.paragraph(&entry.company, Font::Regular, 11.0, SOFT, 0.0, None);
            }
        }
    }

    canvas.text_line(
        &format!("{}{DATE_DASH}{}", entry.start_date, entry.end_date),
        Font::Oblique,
        9.0,
        FAINT,
        Align::Right,
    );
    canvas.space(3.0);

    for bullet in &entry.bullets {
        canvas.paragraph(
            bullet,
            Font::Regular,
            10.0,
            BODY,
            BULLET_INDENT,
            Some(BULLET_PREFIX),
        );
    }
    canvas.space(8.0);
}

fn education_entry(canvas: &mut PageCanvas, entry: &EducationEntry) {
    if !entry.degree.is_empty() {
        canvas.text_line(&entry.degree, Font::Bold, 11.0, INK, Align::Left);
    }
    if !entry.institution.is_empty() {
        canvas.text_line(&entry.institution, Font::Regular, 10.0, SOFT, Align::Left);
    }
    if !entry.year.is_empty() {
        canvas.text_line(&entry.year, Font::Oblique, 9.0, FAINT, Align::Left);
    }
    canvas.space(6.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_only(name: &str) -> CanonicalResume {
        CanonicalResume {
            name: name.to_string(),
            ..CanonicalResume::default()
        }
    }

    fn full_record() -> CanonicalResume {
        CanonicalResume {
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: Some("+44 20 0000 0000".to_string()),
            location: Some("London".to_string()),
            linkedin: Some("linkedin.com/in/ada".to_string()),
            summary: Some(
                "Analyst and programmer with a record of firsts. \
                 Translated and extended foundational work on the Analytical Engine."
                    .to_string(),
            ),
            experience: vec![ExperienceEntry {
                position: "Sales Manager".to_string(),
                company: "Acme Corp".to_string(),
                start_date: "2019".to_string(),
                end_date: "Present".to_string(),
                bullets: vec![
                    "Managed a team of 8 across two regions".to_string(),
                    "Increased sales by 20% year over year".to_string(),
                ],
            }],
            skills: vec!["Negotiation".to_string(), "Forecasting".to_string()],
            education: vec![EducationEntry {
                degree: "BSc Mathematics".to_string(),
                institution: "University of London".to_string(),
                year: "1832".to_string(),
            }],
            certifications: vec!["Royal Society fellow".to_string()],
        }
    }

    fn extracted_text(record: &CanonicalResume) -> String {
        let bytes = render(record);
        assert!(!bytes.is_empty());
        pdf_extract::extract_text_from_mem(&bytes).expect("rendered PDF should re-extract")
    }

    #[test]
    fn test_name_only_record_renders_name_and_nothing_else() {
        let text = extracted_text(&name_only("Ada Lovelace"));
        assert!(text.contains("Ada Lovelace"));
        for heading in [
            "PROFESSIONAL SUMMARY",
            "CAREER HISTORY",
            "SKILLS",
            "EDUCATION",
            "CERTIFICATIONS",
        ] {
            assert!(!text.contains(heading), "unexpected section: {heading}");
        }
    }

    #[test]
    fn test_full_record_renders_all_sections() {
        let text = extracted_text(&full_record());
        for expected in [
            "Ada Lovelace",
            "ada@example.com",
            "PROFESSIONAL SUMMARY",
            "CAREER HISTORY",
            "Sales Manager",
            "Acme Corp",
            "Present",
            "SKILLS",
            "Negotiation",
            "EDUCATION",
            "BSc Mathematics",
            "CERTIFICATIONS",
            "Royal Society fellow",
        ] {
            assert!(text.contains(expected), "missing: {expected}");
        }
    }

    #[test]
    fn test_quantified_bullet_survives_layout() {
        let text = extracted_text(&full_record());
        assert!(text.contains("20%"));
    }

    #[test]
    fn test_empty_contact_fields_are_omitted() {
        let mut record = full_record();
        record.phone = None;
        record.linkedin = None;
        let text = extracted_text(&record);
        assert!(text.contains("ada@example.com"));
        assert!(!text.contains("linkedin.com/in/ada"));
    }

    #[test]
    fn test_long_record_flows_onto_additional_pages_without_loss() {
        let mut record = full_record();
        record.experience[0].bullets = (0..120)
            .map(|i| format!("Delivered initiative number {i} with measurable impact"))
            .collect();
        let text = extracted_text(&record);
        assert!(text.contains("initiative number 0"));
        assert!(text.contains("initiative number 119"));
        // Certifications follow the long section and must still be present.
        assert!(text.contains("Royal Society fellow"));
    }

    #[test]
    fn test_accented_name_survives_round_trip() {
        let text = extracted_text(&name_only("Jos\u{e9} Mu\u{f1}oz"));
        assert!(text.contains("Jos\u{e9} Mu\u{f1}oz"), "got: {text}");
    }

    #[test]
    fn test_overlong_title_wraps_instead_of_overflowing() {
        let mut record = full_record();
        record.experience[0].position = "Regional Director of Strategic Partnerships "
            .repeat(120)
            .trim()
            .to_string();
        let bytes = render(&record);
        // Wrapped, the title spans dozens of lines and forces a second page;
        // drawn as one unwrapped line it would stay on the first.
        let pages = bytes
            .windows(b"/Contents".len())
            .filter(|w| *w == b"/Contents")
            .count();
        assert!(pages >= 2, "expected multiple pages, got {pages}");
        let text = pdf_extract::extract_text_from_mem(&bytes).unwrap();
        assert!(text.contains("Acme Corp"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let record = full_record();
        assert_eq!(render(&record), render(&record));
    }
}
