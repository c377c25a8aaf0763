//! Pulling answers out of free-form model output.

use recast_core::Verdict;

/// Contents of the first `<tag>...</tag>` block, spanning lines if needed.
pub fn extract_tagged<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text.find(&open)? + open.len();
    let len = text[start..].find(&close)?;
    Some(&text[start..start + len])
}

/// Map a `yes`/`no` answer to a verdict. Case, surrounding quotes and
/// trailing punctuation are ignored; anything else is `None`.
pub fn parse_yes_no(answer: &str) -> Option<Verdict> {
    let word = answer
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase();
    match word.as_str() {
        "yes" => Some(Verdict::Correct),
        "no" => Some(Verdict::Incorrect),
        _ => None,
    }
}

/// Parse the JSON inside an analysis block.
///
/// Models sometimes wrap it in a Markdown code fence, or emit several objects
/// separated by commas instead of an array; both are accepted.
pub fn parse_json_block(block: &str) -> Result<serde_json::Value, serde_json::Error> {
    let body = strip_code_fence(block.trim());
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(e) if body.starts_with('{') => {
            serde_json::from_str(&format!("[{body}]")).map_err(|_| e)
        }
        Err(e) => Err(e),
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
