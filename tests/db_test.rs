mod common;

use std::collections::HashSet;

use common::create_test_db;
use serde_json::{json, Map};
use survey_desk::db::{
    Db, NewResponse, NewTemplate, RecordOutcome, RespondentInfo, SurveyDraft, SurveyFilter,
    SurveyStatus, TemplateKind,
};
use survey_desk::questions::{Question, QuestionType};
use survey_desk::utils::Page;
use survey_desk::validation::Answers;

fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".to_string(),
            kind: QuestionType::SingleChoice,
            question: "Would you buy again?".to_string(),
            options: vec!["Yes".to_string(), "No".to_string()],
            required: true,
        },
        Question {
            id: "q2".to_string(),
            kind: QuestionType::Nps,
            question: "How likely are you to recommend us?".to_string(),
            options: vec![],
            required: false,
        },
    ]
}

fn draft(title: &str) -> SurveyDraft {
    SurveyDraft {
        title: title.to_string(),
        description: Some("Post checkout".to_string()),
        questions: sample_questions(),
    }
}

fn first_page() -> Page {
    Page { page: 1, limit: 10 }
}

async fn create_owner(db: &Db, email: &str) -> i64 {
    db.create_user(email, "password123", "Owner").await.unwrap().id
}

async fn active_survey(db: &Db, user_id: i64) -> String {
    let survey = db.create_survey(user_id, draft("Checkout")).await.unwrap();
    db.set_survey_status(&survey.id, user_id, SurveyStatus::Active)
        .await
        .unwrap()
        .unwrap();
    survey.id
}

fn response(survey_id: &str, email: Option<&str>) -> NewResponse {
    let mut answers = Answers::new();
    answers.insert("q1".to_string(), json!("Yes"));
    NewResponse {
        survey_id: survey_id.to_string(),
        respondent: RespondentInfo {
            email: email.map(str::to_string),
            name: None,
            metadata: Map::new(),
        },
        answers,
        ip_address: Some("10.0.0.1".to_string()),
        user_agent: None,
    }
}

fn recorded(outcome: RecordOutcome) -> (String, String) {
    match outcome {
        RecordOutcome::Recorded {
            response_id,
            respondent_id,
        } => (response_id, respondent_id),
        RecordOutcome::SurveyNotActive => panic!("survey should be active"),
    }
}

#[tokio::test]
async fn test_db_connection() {
    let db = create_test_db().await;
    assert!(db.migration_applied("V1").await.unwrap());
    assert!(db.migration_applied("V2").await.unwrap());
    assert!(!db.migration_applied("V3").await.unwrap());
}

#[tokio::test]
async fn test_user_password_verification() {
    let db = create_test_db().await;
    create_owner(&db, "owner@example.com").await;

    assert!(db.email_exists("owner@example.com").await.unwrap());
    assert!(db
        .verify_user_password("owner@example.com", "password123")
        .await
        .unwrap());
    assert!(!db
        .verify_user_password("owner@example.com", "wrong")
        .await
        .unwrap());
    assert!(!db
        .verify_user_password("nobody@example.com", "password123")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_survey_crud() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;

    let survey = db.create_survey(user_id, draft("Checkout")).await.unwrap();
    assert_eq!(survey.status, SurveyStatus::Draft);
    assert_eq!(survey.responses_count, 0);
    assert_eq!(survey.questions, sample_questions());
    assert!(survey.published_at.is_none());

    let updated = db
        .update_survey(&survey.id, user_id, draft("Checkout v2"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Checkout v2");

    let published = db
        .set_survey_status(&survey.id, user_id, SurveyStatus::Active)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.status, SurveyStatus::Active);
    assert!(published.published_at.is_some());

    // Active surveys are frozen
    let frozen = db
        .update_survey(&survey.id, user_id, draft("Checkout v3"))
        .await
        .unwrap();
    assert!(frozen.is_none());

    assert!(db.delete_survey(&survey.id, user_id).await.unwrap());
    assert!(db.find_survey(&survey.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_surveys_are_scoped_to_their_owner() {
    let db = create_test_db().await;
    let owner = create_owner(&db, "owner@example.com").await;
    let other = create_owner(&db, "other@example.com").await;

    let survey = db.create_survey(owner, draft("Mine")).await.unwrap();

    assert!(db.find_owned_survey(&survey.id, other).await.unwrap().is_none());
    assert!(db
        .set_survey_status(&survey.id, other, SurveyStatus::Active)
        .await
        .unwrap()
        .is_none());
    assert!(!db.delete_survey(&survey.id, other).await.unwrap());

    let (surveys, total) = db
        .surveys(other, &SurveyFilter::default(), first_page())
        .await
        .unwrap();
    assert!(surveys.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_survey_list_filters_and_paginates() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;

    for i in 0..5 {
        db.create_survey(user_id, draft(&format!("Survey {i}")))
            .await
            .unwrap();
    }
    let feedback = db.create_survey(user_id, draft("Feedback round")).await.unwrap();
    db.set_survey_status(&feedback.id, user_id, SurveyStatus::Active)
        .await
        .unwrap();

    let (page, total) = db
        .surveys(user_id, &SurveyFilter::default(), Page { page: 2, limit: 4 })
        .await
        .unwrap();
    assert_eq!(total, 6);
    assert_eq!(page.len(), 2);

    let active = SurveyFilter {
        status: Some(SurveyStatus::Active.to_string()),
        search: None,
    };
    let (surveys, total) = db.surveys(user_id, &active, first_page()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(surveys[0].id, feedback.id);

    let unknown = SurveyFilter {
        status: Some("archived".to_string()),
        search: None,
    };
    let (surveys, total) = db.surveys(user_id, &unknown, first_page()).await.unwrap();
    assert_eq!(total, 0);
    assert!(surveys.is_empty());

    let search = SurveyFilter {
        status: None,
        search: Some("FEEDBACK".to_string()),
    };
    let (surveys, _) = db.surveys(user_id, &search, first_page()).await.unwrap();
    assert_eq!(surveys.len(), 1);
    assert_eq!(surveys[0].title, "Feedback round");
}

#[tokio::test]
async fn test_record_response_bumps_counter_and_stores_answers() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;
    let survey_id = active_survey(&db, user_id).await;

    let (response_id, _) = recorded(
        db.record_response(response(&survey_id, Some("ada@example.com")))
            .await
            .unwrap(),
    );

    let survey = db.find_survey(&survey_id).await.unwrap().unwrap();
    assert_eq!(survey.responses_count, 1);

    let stored = db.responses_for_survey(&survey_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, response_id);
    assert_eq!(stored[0].answers["q1"], json!("Yes"));
    assert_eq!(stored[0].ip_address.as_deref(), Some("10.0.0.1"));
}

#[tokio::test]
async fn test_record_response_refuses_inactive_survey() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;
    let survey = db.create_survey(user_id, draft("Draft")).await.unwrap();

    let outcome = db
        .record_response(response(&survey.id, Some("ada@example.com")))
        .await
        .unwrap();
    assert_eq!(outcome, RecordOutcome::SurveyNotActive);

    // Rolled back: no respondent and no response left behind
    assert_eq!(db.count_responses(&survey.id).await.unwrap(), 0);
    let (respondents, _) = db.respondents(user_id, None, first_page()).await.unwrap();
    assert!(respondents.is_empty());
    let survey = db.find_survey(&survey.id).await.unwrap().unwrap();
    assert_eq!(survey.responses_count, 0);
}

#[tokio::test]
async fn test_respondent_upsert_dedupes_by_normalized_email() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;
    let survey_id = active_survey(&db, user_id).await;

    let (_, first) = recorded(
        db.record_response(response(&survey_id, Some("ada@example.com")))
            .await
            .unwrap(),
    );

    let mut again = response(&survey_id, Some("  ADA@example.com "));
    again.respondent.name = Some("Ada".to_string());
    again
        .respondent
        .metadata
        .insert("source".to_string(), json!("newsletter"));
    let (_, second) = recorded(db.record_response(again).await.unwrap());

    assert_eq!(first, second);

    let (respondents, total) = db.respondents(user_id, None, first_page()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(respondents[0].surveys, 2);
    assert_eq!(respondents[0].name.as_deref(), Some("Ada"));
    assert_eq!(respondents[0].email.as_deref(), Some("ada@example.com"));
    assert_eq!(respondents[0].metadata["source"], json!("newsletter"));
}

#[tokio::test]
async fn test_anonymous_respondents_stay_distinct() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;
    let survey_id = active_survey(&db, user_id).await;

    let (_, first) = recorded(db.record_response(response(&survey_id, None)).await.unwrap());
    let (_, second) = recorded(db.record_response(response(&survey_id, None)).await.unwrap());

    assert_ne!(first, second);
    let (_, total) = db.respondents(user_id, None, first_page()).await.unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_concurrent_submissions_do_not_lose_updates() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;
    let survey_id = active_survey(&db, user_id).await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let db = db.clone();
        let survey_id = survey_id.clone();
        // Half of them share an email
        let email = if i % 2 == 0 {
            "shared@example.com".to_string()
        } else {
            format!("user{i}@example.com")
        };
        handles.push(tokio::spawn(async move {
            db.record_response(response(&survey_id, Some(&email))).await
        }));
    }

    let mut respondent_ids = HashSet::new();
    for handle in handles {
        let (_, respondent_id) = recorded(handle.await.unwrap().unwrap());
        respondent_ids.insert(respondent_id);
    }

    let survey = db.find_survey(&survey_id).await.unwrap().unwrap();
    assert_eq!(survey.responses_count, 50);
    assert_eq!(db.count_responses(&survey_id).await.unwrap(), 50);
    assert_eq!(respondent_ids.len(), 26);
}

#[tokio::test]
async fn test_respondents_only_include_callers_surveys() {
    let db = create_test_db().await;
    let owner = create_owner(&db, "owner@example.com").await;
    let other = create_owner(&db, "other@example.com").await;
    let mine = active_survey(&db, owner).await;
    let theirs = active_survey(&db, other).await;

    db.record_response(response(&mine, Some("ada@example.com")))
        .await
        .unwrap();
    db.record_response(response(&theirs, Some("bob@example.com")))
        .await
        .unwrap();
    db.record_response(response(&theirs, Some("ada@example.com")))
        .await
        .unwrap();

    let (respondents, total) = db.respondents(owner, None, first_page()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(respondents[0].email.as_deref(), Some("ada@example.com"));
    assert_eq!(respondents[0].surveys, 1);

    let (found, _) = db.respondents(other, Some("BOB"), first_page()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email.as_deref(), Some("bob@example.com"));
}

#[tokio::test]
async fn test_response_listing_orders() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;
    let survey_id = active_survey(&db, user_id).await;

    let mut ids = Vec::new();
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        let (id, _) = recorded(
            db.record_response(response(&survey_id, Some(email)))
                .await
                .unwrap(),
        );
        ids.push(id);
    }

    let (newest_first, total) = db
        .responses_page(&survey_id, Page { page: 1, limit: 2 })
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(newest_first[0].id, ids[2]);
    assert_eq!(newest_first[0].respondent_email.as_deref(), Some("c@example.com"));
    assert_eq!(newest_first.len(), 2);

    let oldest_first = db.responses_for_export(&survey_id).await.unwrap();
    let exported: Vec<_> = oldest_first.iter().map(|r| r.id.clone()).collect();
    assert_eq!(exported, ids);
}

#[tokio::test]
async fn test_template_lifecycle() {
    let db = create_test_db().await;
    let user_id = create_owner(&db, "owner@example.com").await;

    let template = || NewTemplate {
        id: "post-purchase-nps".to_string(),
        title: "Post-purchase NPS".to_string(),
        description: "Ask buyers to rate us".to_string(),
        kind: TemplateKind::PostPurchase,
        questions: sample_questions(),
        features: vec!["NPS".to_string()],
        time: "2 min".to_string(),
    };

    let created = db.create_template(user_id, template()).await.unwrap().unwrap();
    assert_eq!(created.usage_count, 0);
    assert_eq!(created.kind, TemplateKind::PostPurchase);

    assert!(db.create_template(user_id, template()).await.unwrap().is_none());

    let used = db.use_template("post-purchase-nps").await.unwrap().unwrap();
    assert_eq!(used.usage_count, 1);
    assert!(db.use_template("missing").await.unwrap().is_none());

    let templates = db.templates().await.unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].features, vec!["NPS".to_string()]);
}
