use std::borrow::Cow;

use chrono::SecondsFormat;
use serde_json::Value;

use crate::db::ResponseWithRespondent;
use crate::questions::Question;

const FIXED_HEADERS: [&str; 4] = [
    "Response ID",
    "Completed At",
    "Respondent Email",
    "Respondent Name",
];

/// Render responses as CSV, one row per response in the order given and one
/// column per question after the fixed columns.
pub fn responses_csv(questions: &[Question], responses: &[ResponseWithRespondent]) -> String {
    let mut lines = Vec::with_capacity(responses.len() + 1);

    let header: Vec<Cow<'_, str>> = FIXED_HEADERS
        .iter()
        .map(|h| Cow::Borrowed(*h))
        .chain(questions.iter().map(|q| escape(&q.question)))
        .collect();
    lines.push(header.join(","));

    for response in responses {
        let mut row = vec![
            escape(&response.id).into_owned(),
            response
                .completed_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            escape(response.respondent_email.as_deref().unwrap_or_default()).into_owned(),
            escape(response.respondent_name.as_deref().unwrap_or_default()).into_owned(),
        ];
        for question in questions {
            let cell = response
                .answers
                .get(&question.id)
                .map(answer_cell)
                .unwrap_or_default();
            row.push(escape(&cell).into_owned());
        }
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn answer_cell(answer: &Value) -> String {
    match answer {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(answer_cell).collect::<Vec<_>>().join("; "),
        other => other.to_string(),
    }
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::questions::QuestionType;

    fn question(id: &str, text: &str, kind: QuestionType) -> Question {
        Question {
            id: id.to_string(),
            kind,
            question: text.to_string(),
            options: vec![],
            required: false,
        }
    }

    fn response(id: &str, email: Option<&str>, answers: Value) -> ResponseWithRespondent {
        ResponseWithRespondent {
            id: id.to_string(),
            survey_id: "s1".to_string(),
            respondent_id: "r1".to_string(),
            respondent_email: email.map(str::to_string),
            respondent_name: None,
            answers: serde_json::from_value(answers).unwrap(),
            completed_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn header_only_when_there_are_no_responses() {
        let questions = vec![question("q1", "How was it?", QuestionType::ShortText)];
        assert_eq!(
            responses_csv(&questions, &[]),
            "Response ID,Completed At,Respondent Email,Respondent Name,How was it?"
        );
    }

    #[test]
    fn rows_follow_question_order_and_join_multiple_choice() {
        let questions = vec![
            question("q1", "Pick some", QuestionType::MultipleChoice),
            question("q2", "Score", QuestionType::Rating),
            question("q3", "Notes", QuestionType::LongText),
        ];
        let responses = vec![response(
            "r-1",
            Some("ada@example.com"),
            json!({ "q2": 4, "q1": ["a", "b"] }),
        )];

        let csv = responses_csv(&questions, &responses);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "r-1,2026-03-01T09:30:00.000Z,ada@example.com,,a; b,4,"
        );
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        let questions = vec![question("q1", "Likes, dislikes", QuestionType::ShortText)];
        let responses = vec![response(
            "r-1",
            None,
            json!({ "q1": "said \"hi\", left" }),
        )];

        let csv = responses_csv(&questions, &responses);
        assert!(csv.starts_with(
            "Response ID,Completed At,Respondent Email,Respondent Name,\"Likes, dislikes\"\n"
        ));
        assert!(csv.ends_with(",,,\"said \"\"hi\"\", left\""));
    }
}
