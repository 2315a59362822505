//! Best-effort normalization of model output into a single JSON array.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)```[ \t]*(?:json)?").expect("CODE_FENCE_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningStep {
    StrippedCodeFences,
    StrippedBrackets,
    TrimmedWhitespace,
    WrappedInArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleaningFailure {
    EmptyInput,
    /// Nothing but fences, brackets or whitespace remained.
    NoPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleaningResult {
    /// Input was already a bare array.
    Unchanged(String),
    /// Input needed one or more repairs.
    Repaired {
        json: String,
        steps: Vec<CleaningStep>,
    },
    Failed(CleaningFailure),
}

impl CleaningResult {
    pub fn json(&self) -> Option<&str> {
        match self {
            CleaningResult::Unchanged(json) => Some(json),
            CleaningResult::Repaired { json, .. } => Some(json),
            CleaningResult::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CleaningResult::Failed(_))
    }
}

/// Strips Markdown fences and stray outer brackets, then wraps the payload in
/// exactly one top-level `[` `]` pair.
///
/// Input that already is a single top-level array of non-array elements is
/// returned as is, whatever its inner spacing.
pub fn clean_response(raw: &str) -> CleaningResult {
    if raw.trim().is_empty() {
        return CleaningResult::Failed(CleaningFailure::EmptyInput);
    }

    let mut steps = Vec::new();

    let unfenced = CODE_FENCE_REGEX.replace_all(raw, "");
    if unfenced.len() != raw.len() {
        steps.push(CleaningStep::StrippedCodeFences);
    }

    let trimmed = unfenced.trim();
    if trimmed.len() != unfenced.len() {
        steps.push(CleaningStep::TrimmedWhitespace);
    }

    if let Some(inner) = single_array_body(trimmed) {
        if inner.trim().is_empty() {
            return CleaningResult::Failed(CleaningFailure::NoPayload);
        }
        if !inner.trim_start().starts_with('[') {
            return if steps.is_empty() {
                CleaningResult::Unchanged(raw.to_string())
            } else {
                CleaningResult::Repaired {
                    json: trimmed.to_string(),
                    steps,
                }
            };
        }
    }

    let without_leading = trimmed.trim_start_matches(|c: char| c == '[' || c.is_whitespace());
    let inner = without_leading.trim_end_matches(|c: char| c == ']' || c.is_whitespace());
    if inner.is_empty() {
        return CleaningResult::Failed(CleaningFailure::NoPayload);
    }

    let prefix = &trimmed[..trimmed.len() - without_leading.len()];
    let suffix = &without_leading[inner.len()..];
    let leading = prefix.chars().filter(|&c| c == '[').count();
    let trailing = suffix.chars().filter(|&c| c == ']').count();

    // One pair is put back, so only brackets beyond it count as stripped.
    if leading > 1 || trailing > 1 {
        steps.push(CleaningStep::StrippedBrackets);
    }
    if leading == 0 || trailing == 0 {
        steps.push(CleaningStep::WrappedInArray);
    }

    let json = format!("[{}]", inner);
    if json == raw {
        return CleaningResult::Unchanged(json);
    }
    let inner_whitespace = prefix.chars().chain(suffix.chars()).any(char::is_whitespace);
    if steps.is_empty() || (inner_whitespace && !steps.contains(&CleaningStep::TrimmedWhitespace)) {
        steps.push(CleaningStep::TrimmedWhitespace);
    }
    CleaningResult::Repaired { json, steps }
}

/// The text between the brackets when `text` is exactly one balanced
/// top-level array. Brackets inside JSON strings are ignored.
fn single_array_body(text: &str) -> Option<&str> {
    if !text.starts_with('[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (i == text.len() - 1).then(|| &text[1..i]);
                }
            }
            _ => {}
        }
    }
    None
}
