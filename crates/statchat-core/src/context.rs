//! Question context: the caller-supplied input for one chatbot call.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionContext {
    /// Raw free-text question as typed by the user
    pub question: String,
    /// Default subject used when the question omits a name or says "I"/"my"
    #[serde(default)]
    pub user_context: String,
}

impl QuestionContext {
    pub fn new(question: impl Into<String>, user_context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            user_context: user_context.into(),
        }
    }

    /// The default subject, if the caller supplied a non-blank one.
    pub fn default_subject(&self) -> Option<&str> {
        let trimmed = self.user_context.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_user_context_is_none() {
        assert_eq!(QuestionContext::new("q", "   ").default_subject(), None);
        assert_eq!(
            QuestionContext::new("q", " Luke Bangs ").default_subject(),
            Some("Luke Bangs")
        );
    }

    #[test]
    fn test_camel_case_wire_format() {
        let ctx: QuestionContext =
            serde_json::from_str(r#"{"question":"How many goals?","userContext":"Luke Bangs"}"#)
                .unwrap();
        assert_eq!(ctx.user_context, "Luke Bangs");

        let missing: QuestionContext = serde_json::from_str(r#"{"question":"hi"}"#).unwrap();
        assert!(missing.user_context.is_empty());
    }
}
