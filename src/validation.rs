//! Answer validation for survey submissions.
//!
//! Every submission endpoint runs the survey's questions, in declared order,
//! through [`validate_submission`]. The first failing question refuses the
//! whole submission.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::questions::{Question, QuestionType};

/// Accepted answers keyed by question id. Only non-empty answers appear.
pub type Answers = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// How rejection messages are worded. Each submission endpoint has kept its
/// own phrasing and clients match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wording {
    SurveyScoped,
    General,
}

/// Bounds and wording applied by one submission endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmissionRules {
    pub rating: ScoreRange,
    pub nps: ScoreRange,
    pub wording: Wording,
}

impl SubmissionRules {
    /// `POST /surveys/{id}/responses` and `POST /surveys/{id}/public`.
    pub const SURVEY_SCOPED: SubmissionRules = SubmissionRules {
        rating: ScoreRange::new(1.0, 5.0),
        nps: ScoreRange::new(0.0, 10.0),
        wording: Wording::SurveyScoped,
    };

    /// `POST /responses`. Ratings start at 0 here.
    pub const GENERAL: SubmissionRules = SubmissionRules {
        rating: ScoreRange::new(0.0, 5.0),
        nps: ScoreRange::new(0.0, 10.0),
        wording: Wording::General,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Missing,
    InvalidChoice,
    InvalidRating,
    InvalidNps,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AnswerRejection {
    pub question_id: String,
    pub kind: RejectionKind,
    pub message: String,
}

impl AnswerRejection {
    fn new(question: &Question, kind: RejectionKind, wording: Wording) -> Self {
        let text = &question.question;
        let message = match (wording, kind) {
            (Wording::SurveyScoped, RejectionKind::Missing) => {
                format!("Answer required for question: {text}")
            }
            (Wording::SurveyScoped, RejectionKind::InvalidChoice) => {
                format!("Invalid answer for question: {text}")
            }
            (Wording::SurveyScoped, RejectionKind::InvalidRating) => {
                format!("Invalid rating for question: {text}")
            }
            (Wording::SurveyScoped, RejectionKind::InvalidNps) => {
                format!("Invalid NPS score for question: {text}")
            }
            (Wording::General, RejectionKind::Missing) => {
                format!("Question \"{text}\" is required")
            }
            (Wording::General, RejectionKind::InvalidChoice) => {
                format!("Invalid answer for question \"{text}\"")
            }
            (Wording::General, RejectionKind::InvalidRating | RejectionKind::InvalidNps) => {
                format!("Invalid rating for question \"{text}\"")
            }
        };

        Self {
            question_id: question.id.clone(),
            kind,
            message,
        }
    }
}

/// `null`, `""` and `[]` count as no answer at all.
pub fn is_empty_answer(answer: &Value) -> bool {
    match answer {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

type AnswerCheck = fn(&Question, &Value, &SubmissionRules) -> Result<(), RejectionKind>;

fn accept_any(_: &Question, _: &Value, _: &SubmissionRules) -> Result<(), RejectionKind> {
    Ok(())
}

fn check_single_choice(
    question: &Question,
    answer: &Value,
    _: &SubmissionRules,
) -> Result<(), RejectionKind> {
    match answer {
        Value::String(s) if question.options.contains(s) => Ok(()),
        _ => Err(RejectionKind::InvalidChoice),
    }
}

fn check_multiple_choice(
    question: &Question,
    answer: &Value,
    _: &SubmissionRules,
) -> Result<(), RejectionKind> {
    let Value::Array(items) = answer else {
        return Err(RejectionKind::InvalidChoice);
    };
    let all_known = items
        .iter()
        .all(|item| matches!(item, Value::String(s) if question.options.contains(s)));
    if all_known {
        Ok(())
    } else {
        Err(RejectionKind::InvalidChoice)
    }
}

fn check_rating(_: &Question, answer: &Value, rules: &SubmissionRules) -> Result<(), RejectionKind> {
    match answer.as_f64() {
        Some(score) if rules.rating.contains(score) => Ok(()),
        _ => Err(RejectionKind::InvalidRating),
    }
}

fn check_nps(_: &Question, answer: &Value, rules: &SubmissionRules) -> Result<(), RejectionKind> {
    match answer.as_f64() {
        Some(score) if rules.nps.contains(score) => Ok(()),
        _ => Err(RejectionKind::InvalidNps),
    }
}

fn answer_check(kind: QuestionType) -> AnswerCheck {
    match kind {
        QuestionType::ShortText | QuestionType::LongText => accept_any,
        QuestionType::SingleChoice => check_single_choice,
        QuestionType::MultipleChoice => check_multiple_choice,
        QuestionType::Rating => check_rating,
        QuestionType::Nps => check_nps,
    }
}

/// Decide one answer. `Ok(None)` means the question was skipped and gets no
/// entry in the accepted answer set.
pub fn validate_answer(
    question: &Question,
    answer: Option<&Value>,
    rules: &SubmissionRules,
) -> Result<Option<Value>, AnswerRejection> {
    let answer = answer.filter(|a| !is_empty_answer(a));

    let Some(answer) = answer else {
        if question.required {
            return Err(AnswerRejection::new(
                question,
                RejectionKind::Missing,
                rules.wording,
            ));
        }
        return Ok(None);
    };

    answer_check(question.kind)(question, answer, rules)
        .map_err(|kind| AnswerRejection::new(question, kind, rules.wording))?;

    Ok(Some(answer.clone()))
}

/// Validate a whole submission against the survey's questions.
/// Answers keyed by unknown question ids are dropped.
pub fn validate_submission(
    questions: &[Question],
    answers: &Map<String, Value>,
    rules: &SubmissionRules,
) -> Result<Answers, AnswerRejection> {
    let mut accepted = Answers::new();
    for question in questions {
        if let Some(answer) = validate_answer(question, answers.get(&question.id), rules)? {
            accepted.insert(question.id.clone(), answer);
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn question(id: &str, kind: QuestionType, options: &[&str], required: bool) -> Question {
        Question {
            id: id.to_string(),
            kind,
            question: format!("Question {id}"),
            options: options.iter().map(|o| o.to_string()).collect(),
            required,
        }
    }

    fn answers(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn required_question_rejects_every_empty_shape() {
        let q = question("q1", QuestionType::ShortText, &[], true);
        let rules = SubmissionRules::SURVEY_SCOPED;

        for empty in [None, Some(json!(null)), Some(json!("")), Some(json!([]))] {
            let err = validate_answer(&q, empty.as_ref(), &rules).unwrap_err();
            assert_eq!(err.kind, RejectionKind::Missing);
            assert_eq!(err.to_string(), "Answer required for question: Question q1");
        }
    }

    #[test]
    fn optional_empty_answer_produces_no_entry() {
        let q = question("q1", QuestionType::MultipleChoice, &["a"], false);
        let rules = SubmissionRules::SURVEY_SCOPED;
        assert_eq!(validate_answer(&q, Some(&json!([])), &rules), Ok(None));
        assert_eq!(validate_answer(&q, None, &rules), Ok(None));
    }

    #[test]
    fn single_choice_requires_exact_option_match() {
        let q = question("q1", QuestionType::SingleChoice, &["Yes", "No"], false);
        let rules = SubmissionRules::SURVEY_SCOPED;

        assert_eq!(
            validate_answer(&q, Some(&json!("Yes")), &rules),
            Ok(Some(json!("Yes")))
        );
        for bad in [json!("yes"), json!("Maybe"), json!(["Yes"]), json!(1)] {
            let err = validate_answer(&q, Some(&bad), &rules).unwrap_err();
            assert_eq!(err.kind, RejectionKind::InvalidChoice);
        }
    }

    #[test]
    fn multiple_choice_requires_every_element_to_be_an_option() {
        let q = question("q1", QuestionType::MultipleChoice, &["a", "b", "c"], true);
        let rules = SubmissionRules::SURVEY_SCOPED;

        assert!(validate_answer(&q, Some(&json!(["a", "c"])), &rules).is_ok());
        for bad in [json!(["a", "d"]), json!("a"), json!([1])] {
            let err = validate_answer(&q, Some(&bad), &rules).unwrap_err();
            assert_eq!(err.kind, RejectionKind::InvalidChoice);
        }
    }

    #[test]
    fn survey_scoped_rating_range_is_one_to_five() {
        let q = question("q1", QuestionType::Rating, &[], false);
        let rules = SubmissionRules::SURVEY_SCOPED;

        for ok in [json!(1), json!(3.5), json!(5)] {
            assert!(validate_answer(&q, Some(&ok), &rules).is_ok(), "{ok}");
        }
        for bad in [json!(0), json!(6), json!("3"), json!(true)] {
            let err = validate_answer(&q, Some(&bad), &rules).unwrap_err();
            assert_eq!(err.kind, RejectionKind::InvalidRating, "{bad}");
            assert_eq!(err.message, "Invalid rating for question: Question q1");
        }
    }

    #[test]
    fn general_rating_range_is_zero_to_five() {
        let q = question("q1", QuestionType::Rating, &[], true);
        let rules = SubmissionRules::GENERAL;

        assert_eq!(validate_answer(&q, Some(&json!(0)), &rules), Ok(Some(json!(0))));
        assert!(validate_answer(&q, Some(&json!(5)), &rules).is_ok());

        let err = validate_answer(&q, Some(&json!(5.5)), &rules).unwrap_err();
        assert_eq!(err.message, "Invalid rating for question \"Question q1\"");
    }

    #[test]
    fn nps_range_is_zero_to_ten_on_both_endpoints() {
        let q = question("q1", QuestionType::Nps, &[], true);

        for rules in [SubmissionRules::SURVEY_SCOPED, SubmissionRules::GENERAL] {
            assert!(validate_answer(&q, Some(&json!(0)), &rules).is_ok());
            assert!(validate_answer(&q, Some(&json!(10)), &rules).is_ok());
            assert!(validate_answer(&q, Some(&json!(11)), &rules).is_err());
            assert!(validate_answer(&q, Some(&json!(-1)), &rules).is_err());
        }

        let err = validate_answer(&q, Some(&json!(11)), &SubmissionRules::SURVEY_SCOPED)
            .unwrap_err();
        assert_eq!(err.message, "Invalid NPS score for question: Question q1");
    }

    #[test]
    fn submission_stops_at_first_failing_question() {
        let questions = vec![
            question("q1", QuestionType::Nps, &[], false),
            question("q2", QuestionType::SingleChoice, &["x"], true),
            question("q3", QuestionType::ShortText, &[], true),
        ];
        let submitted = answers(json!({ "q1": 42, "q3": "" }));

        let err =
            validate_submission(&questions, &submitted, &SubmissionRules::SURVEY_SCOPED)
                .unwrap_err();
        assert_eq!(err.question_id, "q1");
        assert_eq!(err.kind, RejectionKind::InvalidNps);
    }

    #[test]
    fn accepted_submission_keeps_only_known_non_empty_answers() {
        let questions = vec![
            question("q1", QuestionType::SingleChoice, &["Yes", "No"], true),
            question("q2", QuestionType::LongText, &[], false),
            question("q3", QuestionType::Rating, &[], false),
        ];
        let submitted = answers(json!({
            "q1": "No",
            "q2": "",
            "q3": 4,
            "stray": "ignored"
        }));

        let accepted =
            validate_submission(&questions, &submitted, &SubmissionRules::SURVEY_SCOPED)
                .unwrap();
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted["q1"], json!("No"));
        assert_eq!(accepted["q3"], json!(4));
    }
}
