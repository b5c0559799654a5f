// Shared prompt fragments. Each service that calls the model keeps its own
// prompts.rs next to it; only cross-cutting pieces live here.

/// Closing instruction for every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str =
    "IMPORTANT: Return ONLY the JSON object, no additional text or markdown formatting.";

/// Persona line shared by the assessment and analysis prompts.
pub const RECRUITER_PERSONA: &str = "You are an expert technical recruiter";

/// Fills `{name}` placeholders in one pass. Substituted text is never rescanned,
/// and braces that do not name a known placeholder are copied as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let value = tail.find('}').and_then(|end| {
            let name = &tail[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end + 1))
        });
        match value {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
