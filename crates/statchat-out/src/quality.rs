//! Response-shape gate.
//!
//! Every answer must start with a capital letter and end with terminal
//! punctuation, name every resolved subject verbatim, and carry no query
//! text. `enforce` repairs the first two; all four are reported as checks.

use statchat_core::ShapeCheck;

/// Fragments that only appear in generated queries
const QUERY_MARKERS: &[&str] = &["MATCH (", "$playerName", "RETURN ", "md."];

fn check(name: &str, passed: bool, message: String) -> ShapeCheck {
    ShapeCheck {
        name: name.to_string(),
        passed,
        message,
    }
}

fn starts_capitalised(answer: &str) -> bool {
    answer
        .chars()
        .find(|c| c.is_alphanumeric())
        .is_some_and(|c| !c.is_lowercase())
}

fn ends_punctuated(answer: &str) -> bool {
    answer
        .trim_end()
        .trim_end_matches(['"', '\'', ')'])
        .ends_with(['.', '!', '?'])
}

/// Capitalise the first letter and add a full stop if needed.
pub fn enforce(answer: &str) -> String {
    let trimmed = answer.trim();
    let mut chars = trimmed.chars();
    let mut fixed = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    if !fixed.is_empty() && !ends_punctuated(&fixed) {
        fixed.push('.');
    }
    fixed
}

/// Run every shape check against a final answer.
pub fn check_answer(answer: &str, subjects: &[String]) -> Vec<ShapeCheck> {
    let mut checks = vec![
        check(
            "leading_capital",
            starts_capitalised(answer),
            "answer starts with a capital letter".to_string(),
        ),
        check(
            "terminal_punctuation",
            ends_punctuated(answer),
            "answer ends with terminal punctuation".to_string(),
        ),
    ];

    let missing: Vec<&str> = subjects
        .iter()
        .filter(|s| !answer.contains(s.as_str()))
        .map(|s| s.as_str())
        .collect();
    checks.push(check(
        "subjects_named",
        missing.is_empty(),
        if missing.is_empty() {
            format!("{} subject(s) named", subjects.len())
        } else {
            format!("missing subject(s): {}", missing.join(", "))
        },
    ));

    let leaked = QUERY_MARKERS.iter().find(|m| answer.contains(*m));
    checks.push(check(
        "no_query_text",
        leaked.is_none(),
        match leaked {
            Some(marker) => format!("answer contains query fragment '{}'", marker),
            None => "no query text in answer".to_string(),
        },
    ));
    checks
}

pub fn all_passed(checks: &[ShapeCheck]) -> bool {
    checks.iter().all(|c| c.passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforce() {
        assert_eq!(enforce("luke Bangs has scored 3 goals"), "Luke Bangs has scored 3 goals.");
        assert_eq!(enforce("Already fine?"), "Already fine?");
        assert_eq!(enforce("Try \"Who scored?\""), "Try \"Who scored?\"");
        assert_eq!(enforce("   "), "");
    }

    #[test]
    fn test_checks() {
        let subjects = vec!["Luke Bangs".to_string(), "Oli Goddard".to_string()];
        let checks = check_answer("Luke Bangs has scored 3 goals.", &subjects);
        assert!(!all_passed(&checks));
        let failed: Vec<_> = checks.iter().filter(|c| !c.passed).map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec!["subjects_named"]);

        let checks = check_answer("The top player by goals is Luke Bangs (25).", &[]);
        assert!(all_passed(&checks));

        let checks = check_answer("MATCH (p:Player) failed", &[]);
        assert!(checks.iter().any(|c| c.name == "no_query_text" && !c.passed));
    }
}
