mod common;

use axum::http::StatusCode;
use std::collections::BTreeSet;
use std::sync::Arc;

use common::ALICE;
use quizplay_api::services::random_play_service::OffsetPicker;

/// Always serves the first remaining quiz.
struct FirstRemaining;

impl OffsetPicker for FirstRemaining {
    fn pick(&self, _count: u64) -> u64 {
        0
    }
}

fn cookie_header(session: &str) -> String {
    format!("play_session={}", session)
}

#[tokio::test]
async fn test_first_play_issues_session_cookie() {
    let app = common::create_test_app().await;
    common::create_quiz(&app.router, ALICE, "2+2", "4").await;

    let response = common::get(&app.router, "/api/v1/quizzes/randomplay").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["finished"], false);
    assert_eq!(response.json["score"], 0);
    assert_eq!(response.json["quiz"]["question"], "2+2");
    assert!(response.json["quiz"].get("answer").is_none());

    let session = response.cookie("play_session").expect("play_session cookie");
    assert!(!session.is_empty());
    let raw_cookie = response
        .headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("play_session="))
        .unwrap()
        .to_string();
    assert!(raw_cookie.contains("HttpOnly"));
    assert!(raw_cookie.contains("SameSite=Lax"));

    let again = common::get_with_cookie(
        &app.router,
        "/api/v1/quizzes/randomplay",
        Some(&cookie_header(&session)),
    )
    .await;
    assert!(again.cookie("play_session").is_none());
}

#[tokio::test]
async fn test_playing_through_every_quiz() {
    let app = common::create_test_app().await;
    let mut answers = std::collections::HashMap::new();
    for n in 1..=4 {
        let id = common::create_quiz(&app.router, ALICE, &format!("{}+{}", n, n), &(n * 2).to_string()).await;
        answers.insert(id, (n * 2).to_string());
    }

    let first = common::get(&app.router, "/api/v1/quizzes/randomplay").await;
    let session = first.cookie("play_session").unwrap();
    let cookie = cookie_header(&session);

    let mut served = BTreeSet::new();
    let mut current = first;
    loop {
        if current.json["finished"] == true {
            break;
        }
        let id = current.json["quiz"]["id"].as_str().unwrap().to_string();
        assert!(served.insert(id.clone()), "quiz {} served twice", id);

        let check = common::get_with_cookie(
            &app.router,
            &format!("/api/v1/quizzes/randomcheck/{}?answer={}", id, answers[&id]),
            Some(&cookie),
        )
        .await;
        assert_eq!(check.status, StatusCode::OK);
        assert_eq!(check.json["result"], true);
        assert_eq!(check.json["score"], served.len());

        current = common::get_with_cookie(&app.router, "/api/v1/quizzes/randomplay", Some(&cookie)).await;
    }

    assert_eq!(served.len(), 4);
    assert_eq!(current.json["score"], 4);
    assert!(current.json.get("quiz").is_none());
    assert_eq!(app.store.play_session_count().await, 0);
}

#[tokio::test]
async fn test_wrong_answer_resets_score() {
    let app = common::create_test_app_with_picker(Arc::new(FirstRemaining)).await;
    let q1 = common::create_quiz(&app.router, ALICE, "2+2", "4").await;
    let q2 = common::create_quiz(&app.router, ALICE, "3+3", "6").await;

    let first = common::get(&app.router, "/api/v1/quizzes/randomplay").await;
    assert_eq!(first.json["quiz"]["id"], q1.as_str());
    let cookie = cookie_header(&first.cookie("play_session").unwrap());

    let correct = common::get_with_cookie(
        &app.router,
        &format!("/api/v1/quizzes/randomcheck/{}?answer=%204%20", q1),
        Some(&cookie),
    )
    .await;
    assert_eq!(correct.json["result"], true);
    assert_eq!(correct.json["score"], 1);

    let next = common::get_with_cookie(&app.router, "/api/v1/quizzes/randomplay", Some(&cookie)).await;
    assert_eq!(next.json["quiz"]["id"], q2.as_str());
    assert_eq!(next.json["score"], 1);

    let wrong = common::get_with_cookie(
        &app.router,
        &format!("/api/v1/quizzes/randomcheck/{}?answer=five", q2),
        Some(&cookie),
    )
    .await;
    assert_eq!(wrong.json["result"], false);
    assert_eq!(wrong.json["answer"], "five");
    assert_eq!(wrong.json["score"], 0);

    let restarted = common::get_with_cookie(&app.router, "/api/v1/quizzes/randomplay", Some(&cookie)).await;
    assert_eq!(restarted.json["quiz"]["id"], q1.as_str());
    assert_eq!(restarted.json["score"], 0);
}

#[tokio::test]
async fn test_resubmitting_correct_answer_keeps_score() {
    let app = common::create_test_app().await;
    let q1 = common::create_quiz(&app.router, ALICE, "2+2", "4").await;
    common::create_quiz(&app.router, ALICE, "3+3", "6").await;

    let first = common::get(&app.router, "/api/v1/quizzes/randomplay").await;
    let cookie = cookie_header(&first.cookie("play_session").unwrap());

    for _ in 0..2 {
        let check = common::get_with_cookie(
            &app.router,
            &format!("/api/v1/quizzes/randomcheck/{}?answer=4", q1),
            Some(&cookie),
        )
        .await;
        assert_eq!(check.json["result"], true);
        assert_eq!(check.json["score"], 1);
    }
}

#[tokio::test]
async fn test_single_quiz_finishes_with_score_one() {
    let app = common::create_test_app().await;
    let q1 = common::create_quiz(&app.router, ALICE, "Only question", "Yes").await;

    let first = common::get(&app.router, "/api/v1/quizzes/randomplay").await;
    let cookie = cookie_header(&first.cookie("play_session").unwrap());

    common::get_with_cookie(
        &app.router,
        &format!("/api/v1/quizzes/randomcheck/{}?answer=yes", q1),
        Some(&cookie),
    )
    .await;

    let done = common::get_with_cookie(&app.router, "/api/v1/quizzes/randomplay", Some(&cookie)).await;
    assert_eq!(done.json["finished"], true);
    assert_eq!(done.json["score"], 1);

    let fresh = common::get_with_cookie(&app.router, "/api/v1/quizzes/randomplay", Some(&cookie)).await;
    assert_eq!(fresh.json["finished"], false);
    assert_eq!(fresh.json["score"], 0);
}

#[tokio::test]
async fn test_empty_store_finishes_immediately() {
    let app = common::create_test_app().await;
    let response = common::get(&app.router, "/api/v1/quizzes/randomplay").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["finished"], true);
    assert_eq!(response.json["score"], 0);
}

#[tokio::test]
async fn test_random_check_unknown_quiz() {
    let app = common::create_test_app().await;
    let response = common::get(&app.router, "/api/v1/quizzes/randomcheck/65f0000000000000000000ff?answer=x").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
