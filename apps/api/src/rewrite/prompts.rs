// Prompt constants for the rewrite service.
//
// The schema below is the wire contract with the generative service. It is
// versioned alongside the renderer: a field added here must be handled in
// `models::resume::normalize` and laid out in `render` in the same change.

/// The JSON shape the model must produce. Mirrors `models::resume::RawResume`.
pub const RESUME_JSON_SCHEMA: &str = r#"{
  "name": "string",
  "email": "string",
  "phone": "string",
  "location": "string",
  "linkedin": "string (optional)",
  "summary": "string (2-4 impactful sentences)",
  "experience": [
    {
      "position": "string",
      "company": "string",
      "startDate": "string",
      "endDate": "string",
      "bullets": ["string", "string"]
    }
  ],
  "skills": ["string"],
  "education": [
    {
      "degree": "string",
      "institution": "string",
      "year": "string"
    }
  ],
  "certifications": ["string (optional)"]
}"#;

/// System instruction template. Replace `{schema}` before sending.
const REWRITE_SYSTEM_TEMPLATE: &str = r#"You are an expert resume writer and career coach.

Analyse the resume text and return ONLY a JSON object that strictly matches this schema:
{schema}

Rules:
- Rewrite the summary to be punchy and results-oriented (2-4 sentences).
- Convert experience descriptions into 3-5 concise bullet points each (store as the "bullets" array).
- Quantify achievements wherever the source material contains any numbers, dates, or metrics.
- Extract all skills as a flat array of short strings.
- If the education field contains multiple degrees, return them as an array.
- Preserve all contact details exactly as found.
- If a field is missing from the source, omit it from the JSON rather than guessing.
- Do NOT include any text outside the JSON object. Do NOT use markdown code fences."#;

/// Builds the full system instruction with the schema embedded.
pub fn rewrite_system() -> String {
    REWRITE_SYSTEM_TEMPLATE.replace("{schema}", RESUME_JSON_SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_system_embeds_schema() {
        let system = rewrite_system();
        assert!(system.contains(r#""startDate": "string""#));
        assert!(!system.contains("{schema}"));
    }
}
