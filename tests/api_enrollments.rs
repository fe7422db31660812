//! End-to-end tests for the enrollment endpoints, including concurrent
//! seat claims against a nearly-full course.

mod common;

use actix_web::test as actix_test;
use futures::future::join_all;
use serde_json::json;

use common::{body_json, create_course, delete_authed, get, get_authed, post_json_authed};
use enrollment_api::server::build_app;

#[actix_web::test]
async fn student_enrolls_and_sees_the_course_in_their_list() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let admin = common::admin_token(&fixture.http_state);
    let course_id = create_course(&app, &admin, "Cryptography", 10).await;
    let student = common::student_token(&app, "alan.turing@example.com").await;

    let enrolled = actix_test::call_service(
        &app,
        post_json_authed("/api/enrollments", &student, &json!({ "courseId": course_id })),
    )
    .await;
    assert!(enrolled.status().is_success());
    let seat = body_json(enrolled).await;
    assert_eq!(seat["courseId"], json!(course_id));

    let mine = actix_test::call_service(&app, get_authed("/api/enrollments/me", &student)).await;
    assert!(mine.status().is_success());
    let mine = body_json(mine).await;
    let entries = mine.as_array().expect("enrollment list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["courseName"], "Cryptography");
    assert_eq!(entries[0]["id"], seat["id"]);

    // The count is visible on the public catalog too.
    let course = actix_test::call_service(&app, get(&format!("/api/courses/{course_id}"))).await;
    assert_eq!(body_json(course).await["currentEnrollments"], 1);
}

#[actix_web::test]
async fn duplicate_enrollment_is_rejected() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let admin = common::admin_token(&fixture.http_state);
    let course_id = create_course(&app, &admin, "Logic", 10).await;
    let student = common::student_token(&app, "kurt.godel@example.com").await;

    let payload = json!({ "courseId": course_id });
    let first =
        actix_test::call_service(&app, post_json_authed("/api/enrollments", &student, &payload))
            .await;
    assert!(first.status().is_success());

    let second =
        actix_test::call_service(&app, post_json_authed("/api/enrollments", &student, &payload))
            .await;
    assert_eq!(second.status().as_u16(), 400);
    let body = body_json(second).await;
    assert_eq!(body["message"], "You are already enrolled in this course.");
    assert_eq!(body["details"]["code"], "duplicate_enrollment");
}

#[actix_web::test]
async fn full_course_turns_students_away() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let admin = common::admin_token(&fixture.http_state);
    let course_id = create_course(&app, &admin, "Seminar", 1).await;

    let seated = common::student_token(&app, "first.comer@example.com").await;
    let first = actix_test::call_service(
        &app,
        post_json_authed("/api/enrollments", &seated, &json!({ "courseId": course_id })),
    )
    .await;
    assert!(first.status().is_success());

    let turned_away = common::student_token(&app, "late.comer@example.com").await;
    let second = actix_test::call_service(
        &app,
        post_json_authed(
            "/api/enrollments",
            &turned_away,
            &json!({ "courseId": course_id }),
        ),
    )
    .await;
    assert_eq!(second.status().as_u16(), 400);
    let body = body_json(second).await;
    assert_eq!(body["message"], "This course is full. Capacity: 1 students.");
    assert_eq!(body["details"]["code"], "course_full");
}

#[actix_web::test]
async fn malformed_enroll_payload_uses_the_error_envelope() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let student = common::student_token(&app, "field.dropper@example.com").await;

    let response =
        actix_test::call_service(&app, post_json_authed("/api/enrollments", &student, &json!({})))
            .await;
    assert_eq!(response.status().as_u16(), 400);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .expect("content type")
        .to_owned();
    assert!(content_type.starts_with("application/json"));
    let body = body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert!(body["message"].as_str().expect("message").contains("courseId"));
}

#[actix_web::test]
async fn enrolling_into_a_missing_course_is_not_found() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let student = common::student_token(&app, "lost.student@example.com").await;

    let response = actix_test::call_service(
        &app,
        post_json_authed(
            "/api/enrollments",
            &student,
            &json!({ "courseId": "7f1c9a52-1234-4cde-9f00-aaaaaaaaaaaa" }),
        ),
    )
    .await;
    assert_eq!(response.status().as_u16(), 404);
    let body = body_json(response).await;
    assert_eq!(body["message"], "This course is no longer available.");
}

#[actix_web::test]
async fn deregistration_is_scoped_to_the_owner() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let admin = common::admin_token(&fixture.http_state);
    let course_id = create_course(&app, &admin, "Ethics", 10).await;

    let owner = common::student_token(&app, "the.owner@example.com").await;
    let enrolled = actix_test::call_service(
        &app,
        post_json_authed("/api/enrollments", &owner, &json!({ "courseId": course_id })),
    )
    .await;
    assert!(enrolled.status().is_success());
    let enrollment_id = body_json(enrolled).await["id"]
        .as_str()
        .expect("enrollment id")
        .to_owned();
    let uri = format!("/api/enrollments/{enrollment_id}");

    // Another student's enrollment is indistinguishable from a missing one.
    let other = common::student_token(&app, "some.other@example.com").await;
    let foreign = actix_test::call_service(&app, delete_authed(&uri, &other)).await;
    assert_eq!(foreign.status().as_u16(), 404);
    let body = body_json(foreign).await;
    assert_eq!(body["message"], "Enrollment not found");

    let owned = actix_test::call_service(&app, delete_authed(&uri, &owner)).await;
    assert_eq!(owned.status().as_u16(), 204);

    let again = actix_test::call_service(&app, delete_authed(&uri, &owner)).await;
    assert_eq!(again.status().as_u16(), 404);
}

#[actix_web::test]
async fn admin_roster_view_lists_courses_with_enrollments() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let admin = common::admin_token(&fixture.http_state);
    let attended = create_course(&app, &admin, "Astronomy", 10).await;
    create_course(&app, &admin, "Empty Elective", 10).await;

    let student = common::student_token(&app, "star.gazer@example.com").await;
    let enrolled = actix_test::call_service(
        &app,
        post_json_authed("/api/enrollments", &student, &json!({ "courseId": attended })),
    )
    .await;
    assert!(enrolled.status().is_success());

    let forbidden =
        actix_test::call_service(&app, get_authed("/api/enrollments/admin/courses", &student))
            .await;
    assert_eq!(forbidden.status().as_u16(), 403);

    let rosters =
        actix_test::call_service(&app, get_authed("/api/enrollments/admin/courses", &admin)).await;
    assert!(rosters.status().is_success());
    let rosters = body_json(rosters).await;
    let rosters = rosters.as_array().expect("roster list");
    // Courses without enrollments stay out of the view.
    assert_eq!(rosters.len(), 1);
    assert_eq!(rosters[0]["name"], "Astronomy");
    assert_eq!(rosters[0]["currentEnrollments"], 1);
    let entries = rosters[0]["enrollments"].as_array().expect("entries");
    assert_eq!(entries[0]["studentEmail"], "star.gazer@example.com");
}

#[actix_web::test]
async fn concurrent_claims_never_exceed_capacity() {
    let fixture = common::test_app(false).await;
    let app = actix_test::init_service(build_app(
        fixture.http_state.clone(),
        fixture.health_state.clone(),
    ))
    .await;
    let admin = common::admin_token(&fixture.http_state);
    let course_id = create_course(&app, &admin, "Popular Elective", 2).await;

    let mut tokens = Vec::new();
    for n in 0..4 {
        tokens.push(common::student_token(&app, &format!("rusher{n}@example.com")).await);
    }

    let responses = join_all(tokens.iter().map(|token| {
        actix_test::call_service(
            &app,
            post_json_authed("/api/enrollments", token, &json!({ "courseId": course_id })),
        )
    }))
    .await;

    let successes = responses
        .iter()
        .filter(|response| response.status().is_success())
        .count();
    assert_eq!(successes, 2);
    for rejected in responses
        .into_iter()
        .filter(|response| !response.status().is_success())
    {
        assert_eq!(rejected.status().as_u16(), 400);
        let body = body_json(rejected).await;
        assert_eq!(body["details"]["code"], "course_full");
    }

    let course = actix_test::call_service(&app, get(&format!("/api/courses/{course_id}"))).await;
    assert_eq!(body_json(course).await["currentEnrollments"], 2);
}
