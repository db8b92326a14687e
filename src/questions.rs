use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of question kinds a survey can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    ShortText,
    LongText,
    SingleChoice,
    MultipleChoice,
    Rating,
    Nps,
}

impl QuestionType {
    pub const ALL: [QuestionType; 6] = [
        QuestionType::ShortText,
        QuestionType::LongText,
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::Rating,
        QuestionType::Nps,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::ShortText => "short-text",
            QuestionType::LongText => "long-text",
            QuestionType::SingleChoice => "single-choice",
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::Rating => "rating",
            QuestionType::Nps => "nps",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Choice questions carry a non-empty option list.
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }

    /// Score questions take a numeric answer inside a bounded range.
    pub fn is_score(self) -> bool {
        matches!(self, QuestionType::Rating | QuestionType::Nps)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question embedded in a survey or template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

/// A question as submitted by a survey author, before it has been checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("At least one question is required")]
    NoQuestions,
    #[error("Each question must have an id, type, and question text")]
    MissingFields,
    #[error("Invalid question type. Must be one of: short-text, long-text, single-choice, multiple-choice, rating, nps")]
    UnknownType(String),
    #[error("Question type {0} requires options")]
    MissingOptions(QuestionType),
    #[error("Duplicate question id: {0}")]
    DuplicateId(String),
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check an author's question list and turn it into typed questions.
/// Fails on the first offending question.
pub fn check_questions(drafts: Vec<QuestionDraft>) -> Result<Vec<Question>, DefinitionError> {
    if drafts.is_empty() {
        return Err(DefinitionError::NoQuestions);
    }

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let (Some(id), Some(kind), Some(text)) = (
            non_blank(draft.id),
            non_blank(draft.kind),
            non_blank(draft.question),
        ) else {
            return Err(DefinitionError::MissingFields);
        };

        let kind = QuestionType::parse(&kind).ok_or(DefinitionError::UnknownType(kind))?;

        let options = draft.options.unwrap_or_default();
        if kind.is_choice() && options.is_empty() {
            return Err(DefinitionError::MissingOptions(kind));
        }

        if kind.is_choice() {
            let mut seen_options = HashSet::new();
            if let Some(dup) = options.iter().find(|o| !seen_options.insert(o.as_str())) {
                return Err(DefinitionError::DuplicateOption(dup.clone()));
            }
        }

        if !seen.insert(id.clone()) {
            return Err(DefinitionError::DuplicateId(id));
        }

        questions.push(Question {
            id,
            kind,
            question: text,
            options: if kind.is_choice() { options } else { Vec::new() },
            required: draft.required,
        });
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: &str, kind: &str, options: &[&str]) -> QuestionDraft {
        QuestionDraft {
            id: Some(id.to_string()),
            kind: Some(kind.to_string()),
            question: Some(format!("Question {id}")),
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            required: false,
        }
    }

    #[test]
    fn question_types_use_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&QuestionType::MultipleChoice).unwrap();
        assert_eq!(json, "\"multiple-choice\"");

        for kind in QuestionType::ALL {
            assert_eq!(QuestionType::parse(kind.as_str()), Some(kind));
            let encoded = serde_json::to_value(kind).unwrap();
            assert_eq!(encoded, serde_json::Value::String(kind.to_string()));
        }
        assert_eq!(QuestionType::parse("dropdown"), None);
    }

    #[test]
    fn empty_question_list_is_rejected() {
        assert_eq!(check_questions(vec![]), Err(DefinitionError::NoQuestions));
    }

    #[test]
    fn choice_questions_need_options() {
        let err = check_questions(vec![draft("q1", "single-choice", &[])]).unwrap_err();
        assert_eq!(err, DefinitionError::MissingOptions(QuestionType::SingleChoice));
        assert_eq!(err.to_string(), "Question type single-choice requires options");
    }

    #[test]
    fn choice_options_must_be_unique() {
        let err = check_questions(vec![draft("q1", "multiple-choice", &["a", "b", "a"])])
            .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateOption("a".to_string()));
        assert_eq!(err.to_string(), "Duplicate option: a");
    }

    #[test]
    fn score_and_text_questions_drop_options() {
        let questions = check_questions(vec![
            draft("q1", "rating", &["1", "2"]),
            draft("q2", "short-text", &[]),
        ])
        .unwrap();

        assert_eq!(questions[0].kind, QuestionType::Rating);
        assert!(questions[0].options.is_empty());
        assert_eq!(questions[1].kind, QuestionType::ShortText);
    }

    #[test]
    fn unknown_type_and_missing_text_are_rejected() {
        let err = check_questions(vec![draft("q1", "slider", &[])]).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownType(ref t) if t == "slider"));

        let mut blank = draft("q1", "nps", &[]);
        blank.question = Some("   ".to_string());
        assert_eq!(
            check_questions(vec![blank]),
            Err(DefinitionError::MissingFields)
        );
    }

    #[test]
    fn question_ids_must_be_unique() {
        let err = check_questions(vec![
            draft("q1", "short-text", &[]),
            draft("q1", "long-text", &[]),
        ])
        .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateId("q1".to_string()));
    }
}
