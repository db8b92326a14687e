//! Read-time rollups over a survey's stored responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::questions::{Question, QuestionType};
use crate::validation::{is_empty_answer, Answers};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnalytics {
    pub survey_id: String,
    pub total_responses: i64,
    pub completion_rate: u8,
    pub question_analytics: Vec<QuestionAnalytics>,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalytics {
    pub question_id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub total_responses: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_distribution: Option<OptionDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Per-option counts, serialized as a JSON object in declared option order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionDistribution(Vec<(String, i64)>);

impl OptionDistribution {
    pub fn get(&self, option: &str) -> Option<i64> {
        self.0
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, count)| *count)
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn total(&self) -> i64 {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

impl Serialize for OptionDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, count)| (name, count)))
    }
}

/// Responses completed on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub date: String,
    pub count: i64,
}

/// What the aggregation needs from a stored response.
pub struct ResponseView<'a> {
    pub answers: &'a Answers,
    pub completed_at: DateTime<Utc>,
}

pub fn aggregate(
    survey_id: &str,
    questions: &[Question],
    responses: &[ResponseView<'_>],
) -> SurveyAnalytics {
    let total_responses = responses.len() as i64;

    SurveyAnalytics {
        survey_id: survey_id.to_string(),
        total_responses,
        // TODO: track started-but-abandoned submissions so this can become a real ratio
        completion_rate: if total_responses > 0 { 100 } else { 0 },
        question_analytics: questions
            .iter()
            .map(|q| question_analytics(q, responses))
            .collect(),
        timeline: timeline(responses),
    }
}

fn question_analytics(question: &Question, responses: &[ResponseView<'_>]) -> QuestionAnalytics {
    let answers: Vec<&Value> = responses
        .iter()
        .filter_map(|r| r.answers.get(&question.id))
        .filter(|a| !is_empty_answer(a))
        .collect();

    let mut analytics = QuestionAnalytics {
        question_id: question.id.clone(),
        question: question.question.clone(),
        kind: question.kind,
        total_responses: answers.len() as i64,
        option_distribution: None,
        average: None,
        min: None,
        max: None,
    };

    match question.kind {
        QuestionType::SingleChoice | QuestionType::MultipleChoice => {
            analytics.option_distribution = Some(option_distribution(question, &answers));
        }
        QuestionType::Rating | QuestionType::Nps => {
            let scores: Vec<f64> = answers.iter().filter_map(|a| a.as_f64()).collect();
            if !scores.is_empty() {
                let sum: f64 = scores.iter().sum();
                analytics.average = Some(sum / scores.len() as f64);
                analytics.min = scores.iter().copied().reduce(f64::min);
                analytics.max = scores.iter().copied().reduce(f64::max);
            }
        }
        QuestionType::ShortText | QuestionType::LongText => {}
    }

    analytics
}

/// Every declared option appears, including ones nobody picked.
fn option_distribution(question: &Question, answers: &[&Value]) -> OptionDistribution {
    let mut counts: Vec<(String, i64)> = Vec::with_capacity(question.options.len());
    for option in &question.options {
        if !counts.iter().any(|(name, _)| name == option) {
            counts.push((option.clone(), 0));
        }
    }

    for answer in answers {
        match (question.kind, answer) {
            (QuestionType::SingleChoice, Value::String(choice)) => {
                if let Some((_, count)) = counts.iter_mut().find(|(name, _)| name == choice) {
                    *count += 1;
                }
            }
            (QuestionType::MultipleChoice, Value::Array(choices)) => {
                for (option, count) in counts.iter_mut() {
                    if choices.iter().any(|c| c.as_str() == Some(option.as_str())) {
                        *count += 1;
                    }
                }
            }
            _ => {}
        }
    }

    OptionDistribution(counts)
}

fn timeline(responses: &[ResponseView<'_>]) -> Vec<TimelineEntry> {
    let mut days: BTreeMap<String, i64> = BTreeMap::new();
    for response in responses {
        let day = response.completed_at.format("%Y-%m-%d").to_string();
        *days.entry(day).or_default() += 1;
    }

    days.into_iter()
        .map(|(date, count)| TimelineEntry { date, count })
        .collect()
}
