//! Turns cleaned model output into validated [`Question`]s.
//!
//! Each element is read leniently: field names are matched case-insensitively
//! and a bad element is skipped without discarding its siblings.

use serde_json::{Map, Value};

use crate::models::domain::question::{Question, MAX_OPTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionCountPolicy {
    /// Fewer options than requested are kept as long as there are at least two.
    AcceptFewer,
    /// Anything other than the requested count (after capping) is malformed.
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub num_options: usize,
    /// Options beyond this many are dropped. Never above `MAX_OPTIONS`.
    pub max_options: usize,
    pub point_value: u32,
    pub option_count_policy: OptionCountPolicy,
}

#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub questions: Vec<Question>,
    pub skipped: usize,
}

/// Parses a cleaned JSON array. A top-level parse failure yields no questions.
pub fn parse_questions(json: &str, options: &ParseOptions) -> ParseOutcome {
    let elements: Vec<Value> = match serde_json::from_str(json) {
        Ok(elements) => elements,
        Err(e) => {
            log::warn!("Model output is not a JSON array: {}", e);
            return ParseOutcome::default();
        }
    };

    let mut outcome = ParseOutcome::default();
    for (index, element) in elements.iter().enumerate() {
        match parse_element(element, options) {
            Ok(question) => outcome.questions.push(question),
            Err(reason) => {
                log::warn!("Skipping question element {}: {}", index, reason);
                outcome.skipped += 1;
            }
        }
    }
    outcome
}

fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn parse_element(element: &Value, options: &ParseOptions) -> Result<Question, String> {
    let object = element
        .as_object()
        .ok_or_else(|| "element is not an object".to_string())?;

    let text = field(object, "Text")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing Text".to_string())?;

    let mut choices: Vec<String> = field(object, "Options")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing Options".to_string())?
        .iter()
        .map(|option| match option {
            Value::String(s) => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err("option is not a string".to_string()),
        })
        .collect::<Result<_, _>>()?;

    let max_options = options.max_options.min(MAX_OPTIONS);
    choices.truncate(max_options);

    let expected = options.num_options.min(max_options);
    if options.option_count_policy == OptionCountPolicy::Exact && choices.len() != expected {
        return Err(format!(
            "expected {} options, got {}",
            expected,
            choices.len()
        ));
    }

    let index = field(object, "CorrectAnswerIndex")
        .and_then(|value| match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .ok_or_else(|| "missing or invalid CorrectAnswerIndex".to_string())?;

    let correct_option_number = index
        .checked_add(1)
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| format!("CorrectAnswerIndex {} is out of range", index))?;

    Question::new(text, choices, correct_option_number, options.point_value)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(num_options: usize) -> ParseOptions {
        ParseOptions {
            num_options,
            max_options: MAX_OPTIONS,
            point_value: 1000,
            option_count_policy: OptionCountPolicy::AcceptFewer,
        }
    }

    #[test]
    fn parses_well_formed_questions() {
        let json = r#"[
            {"Text": "Capital of France?", "Options": ["Paris", "Rome", "Berlin", "Madrid"], "CorrectAnswerIndex": 0},
            {"Text": "2 + 2?", "Options": ["3", "4", "5", "6"], "CorrectAnswerIndex": 1}
        ]"#;

        let outcome = parse_questions(json, &options(4));
        assert_eq!(outcome.questions.len(), 2);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.questions[0].correct_option_number, 1);
        assert_eq!(outcome.questions[1].correct_option_number, 2);
        assert_eq!(outcome.questions[1].correct_option(), Some("4"));
        assert_eq!(outcome.questions[0].point_value, 1000);
    }

    #[test]
    fn field_names_are_case_insensitive() {
        let json = r#"[{"text": "Q", "OPTIONS": ["a", "b"], "correctanswerindex": 1}]"#;
        let outcome = parse_questions(json, &options(2));
        assert_eq!(outcome.questions.len(), 1);
        assert_eq!(outcome.questions[0].correct_option_number, 2);
    }

    #[test]
    fn malformed_elements_do_not_abort_the_rest() {
        let json = r#"[
            {"Text": "No options"},
            "not an object",
            {"Text": "Bad index", "Options": ["a", "b"], "CorrectAnswerIndex": 7},
            {"Text": "Good", "Options": ["a", "b", "c"], "CorrectAnswerIndex": "2"}
        ]"#;

        let outcome = parse_questions(json, &options(3));
        assert_eq!(outcome.questions.len(), 1);
        assert_eq!(outcome.skipped, 3);
        assert_eq!(outcome.questions[0].text, "Good");
        assert_eq!(outcome.questions[0].correct_option_number, 3);
    }

    #[test]
    fn huge_correct_index_skips_only_that_element() {
        let json = r#"[
            {"Text": "Overflow", "Options": ["a", "b"], "CorrectAnswerIndex": 18446744073709551615},
            {"Text": "Overflow string", "Options": ["a", "b"], "CorrectAnswerIndex": "18446744073709551615"},
            {"Text": "Good", "Options": ["a", "b"], "CorrectAnswerIndex": 1}
        ]"#;

        let outcome = parse_questions(json, &options(2));
        assert_eq!(outcome.questions.len(), 1);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.questions[0].text, "Good");
    }

    #[test]
    fn configured_max_options_caps_parsed_options() {
        let json = r#"[{"Text": "Q", "Options": ["a","b","c","d","e"], "CorrectAnswerIndex": 1}]"#;
        let capped = ParseOptions {
            max_options: 4,
            ..options(4)
        };

        let outcome = parse_questions(json, &capped);
        assert_eq!(outcome.questions[0].options.len(), 4);

        // A larger setting still cannot exceed the domain limit.
        let oversized = ParseOptions {
            max_options: 9,
            ..options(5)
        };
        let json = r#"[{"Text": "Q", "Options": ["a","b","c","d","e","f"], "CorrectAnswerIndex": 0}]"#;
        assert_eq!(parse_questions(json, &oversized).questions[0].options.len(), 5);
    }

    #[test]
    fn invalid_json_yields_no_questions() {
        let outcome = parse_questions("[{\"Text\": ", &options(4));
        assert!(outcome.questions.is_empty());

        let outcome = parse_questions(r#"{"Text": "object, not array"}"#, &options(4));
        assert!(outcome.questions.is_empty());
    }

    #[test]
    fn truncates_options_beyond_five() {
        let json = r#"[{"Text": "Q", "Options": ["a","b","c","d","e","f","g"], "CorrectAnswerIndex": 4}]"#;
        let outcome = parse_questions(json, &options(5));
        assert_eq!(outcome.questions[0].options.len(), 5);
        assert_eq!(outcome.questions[0].correct_option(), Some("e"));

        // The correct answer was cut off with the extra options.
        let json = r#"[{"Text": "Q", "Options": ["a","b","c","d","e","f"], "CorrectAnswerIndex": 5}]"#;
        assert!(parse_questions(json, &options(5)).questions.is_empty());
    }

    #[test]
    fn fewer_options_than_requested_depends_on_policy() {
        let json = r#"[{"Text": "Q", "Options": ["a", "b", "c"], "CorrectAnswerIndex": 0}]"#;

        assert_eq!(parse_questions(json, &options(4)).questions.len(), 1);

        let strict = ParseOptions {
            option_count_policy: OptionCountPolicy::Exact,
            ..options(4)
        };
        let outcome = parse_questions(json, &strict);
        assert!(outcome.questions.is_empty());
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn single_option_is_always_rejected() {
        let json = r#"[{"Text": "Q", "Options": ["only"], "CorrectAnswerIndex": 0}]"#;
        assert!(parse_questions(json, &options(2)).questions.is_empty());
    }
}
