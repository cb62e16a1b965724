use regex::Regex;
use tracing::warn;

/// Fallback patterns, tried in order. Unlabeled short numeric forms come
/// first: most providers send a bare code, and the length guard below
/// rejects accidental short matches (status codes, list numbers).
const FALLBACK_PATTERNS: &[&str] = &[
    r"\b\d{6}\b",
    r"\b\d{4}\b",
    r"\b\d{8}\b",
    r"(?i)code[:\s]*(\d+)",
    r"(?i)otp[:\s]*(\d+)",
    r"(?i)kode[:\s]*(\d+)",
    r"(?i)pin[:\s]*(\d+)",
];

const MIN_CODE_LEN: usize = 4;

/// Best-effort verification-code extraction from free-form message text.
/// Pure function of its inputs. The custom pattern wins when it matches;
/// an invalid custom pattern is logged and skipped, not fatal.
pub fn extract_code(content: &str, custom_pattern: Option<&str>) -> Option<String> {
    if let Some(pattern) = custom_pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                if let Some(found) = re.find(content) {
                    let digits: String = found
                        .as_str()
                        .chars()
                        .filter(|c| c.is_ascii_digit())
                        .collect();
                    if digits.is_empty() {
                        return Some(found.as_str().to_string());
                    }
                    return Some(digits);
                }
            }
            Err(e) => {
                warn!(pattern, "invalid custom verification pattern, using fallbacks: {}", e);
            }
        }
    }

    for pattern in FALLBACK_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(captures) = re.captures(content) {
                let code = match captures.get(1) {
                    Some(group) => group.as_str().to_string(),
                    None => captures
                        .get(0)
                        .map(|m| m.as_str().chars().filter(|c| c.is_ascii_digit()).collect())
                        .unwrap_or_default(),
                };
                if code.len() >= MIN_CODE_LEN {
                    return Some(code);
                }
            }
        }
    }

    None
}
