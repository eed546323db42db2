#![cfg(feature = "web")]

mod test_support;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use test_support::{create, send, send_json, student_json, test_app};
use tower::ServiceExt;

#[tokio::test]
async fn empty_store_has_no_dashboard() {
    let app = test_app();

    let (status, body) = send_json(&app, "GET", "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let request = Request::get("/dashboard/charts/course.png")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_counts_courses_genders_and_age_groups() {
    let app = test_app();
    create(&app, student_json("1", "Ana", 20, "Math", "Female")).await;
    create(&app, student_json("2", "Ben", 22, "Art", "Male")).await;
    create(&app, student_json("3", "Cara", 27, "Math", "Female")).await;
    create(&app, student_json("4", "Dev", 19, "Math", "Male")).await;

    let (status, body) = send_json(&app, "GET", "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        body["stats"],
        json!({ "totalStudents": 4, "averageAge": "22.0", "coursesCount": 2 })
    );
    assert_eq!(
        body["courseData"],
        json!([{ "name": "Math", "value": 3 }, { "name": "Art", "value": 1 }])
    );
    assert_eq!(
        body["genderData"],
        json!([{ "name": "Female", "value": 2 }, { "name": "Male", "value": 2 }])
    );
    assert_eq!(
        body["ageData"],
        json!([
            { "name": "15-19", "value": 1 },
            { "name": "20-24", "value": 2 },
            { "name": "25-29", "value": 1 },
        ])
    );
}

#[tokio::test]
async fn unknown_chart_is_not_found() {
    let app = test_app();
    create(&app, student_json("1", "Ana", 20, "Math", "Female")).await;

    let request = Request::get("/dashboard/charts/grades.png")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Unknown chart: grades");
}

#[tokio::test]
async fn every_chart_renders_as_png() {
    let app = test_app();
    create(&app, student_json("1", "Ana", 20, "Math", "Female")).await;
    create(&app, student_json("2", "Ben", 22, "Art", "Male")).await;
    create(&app, student_json("3", "Cara", 27, "Math", "Female")).await;

    for chart in ["course.png", "gender.png", "age.png"] {
        let request = Request::get(format!("/dashboard/charts/{}", chart))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", chart);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{} is not a PNG", chart);
    }
}
