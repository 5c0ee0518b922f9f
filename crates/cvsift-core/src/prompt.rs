//! The fixed extraction prompt and per-file user message.

/// Ceiling on the number of CV characters embedded in a request.
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// System prompt instructing the model to return strict JSON with the 13
/// personal-data fields. The key list must stay in sync with
/// [`CvRecord`](crate::CvRecord).
pub const EXTRACTION_PROMPT: &str = r#"You are an expert CV/Resume parser. Analyze the provided CV content and extract the following personal information:

Name
Email
Phone/Mobile Number
Location/Address (City, Country)
LinkedIn Profile URL
GitHub Profile URL (if available)
Professional Summary/Objective (first line or brief summary)
Current/Most Recent Job Title
Current/Most Recent Company
Years of Experience (total)
Education (Highest Degree)
University/Institution Name

Return the information as a JSON object with these exact keys:
{
    "name": "",
    "email": "",
    "phone": "",
    "location": "",
    "linkedin": "",
    "github": "",
    "professional_summary": "",
    "current_job_title": "",
    "current_company": "",
    "years_experience": "",
    "education": "",
    "institution": ""
}

If any field is not found or not clearly mentioned, use null for that field.
Return ONLY the JSON object, no other text."#;

/// The user message carrying one CV. `text` must already be truncated to the
/// configured ceiling by the caller.
pub fn build_user_message(filename: &str, text: &str) -> String {
    format!("CV Filename: {filename}\n\nCV Content:\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_embeds_filename_and_text() {
        let msg = build_user_message("cv.pdf", "Jane Doe");
        assert!(msg.starts_with("CV Filename: cv.pdf\n"));
        assert!(msg.ends_with("CV Content:\nJane Doe"));
    }

    #[test]
    fn prompt_names_every_record_key() {
        for key in [
            "name",
            "email",
            "phone",
            "location",
            "linkedin",
            "github",
            "professional_summary",
            "current_job_title",
            "current_company",
            "years_experience",
            "education",
            "institution",
        ] {
            assert!(
                EXTRACTION_PROMPT.contains(&format!("\"{key}\"")),
                "prompt is missing key {key}"
            );
        }
    }
}
