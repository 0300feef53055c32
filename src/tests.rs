//! End-to-end tests through the real route table.

use actix_web::{App, http::StatusCode, middleware::NormalizePath, test, web::Data};
use chrono::{Duration, Local};
use serde_json::{Value, json};

use crate::{
    routes,
    test_utils::{test_config, test_pool},
};

/// Builds the service with the production route table over a fresh database.
macro_rules! app {
    () => {{
        let config = test_config();
        let limiter = routes::build_limiter(config.rate_limit_per_min).unwrap();
        test::init_service(
            App::new()
                .wrap(NormalizePath::trim())
                .app_data(Data::new(test_pool().await))
                .configure(|cfg| routes::configure(cfg, &config, limiter)),
        )
        .await
    }};
}

fn employee_body(code: &str, email: &str) -> Value {
    json!({
        "employee_code": code,
        "full_name": "A B",
        "email": email,
        "department": "Engineering"
    })
}

#[actix_web::test]
async fn health_reports_healthy() {
    let app = app!();

    let resp: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(resp, json!({ "status": "healthy" }));
}

#[actix_web::test]
async fn employee_lifecycle() {
    let app = app!();

    // trailing slash is accepted
    let req = test::TestRequest::post()
        .uri("/employees/")
        .set_json(employee_body("EMP010", "ab@x.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["employee_code"], "EMP010");
    assert!(created["created_at"].is_string());

    let list: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/employees").to_request(),
    )
    .await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let one: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/employees/{id}")).to_request(),
    )
    .await;
    assert_eq!(one["email"], "ab@x.com");
    assert_eq!(one["attendances"], json!([]));

    let resp = test::call_service(
        &app,
        test::TestRequest::delete().uri(&format!("/employees/{id}")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/employees/{id}")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Employee not found");
}

#[actix_web::test]
async fn create_maps_failures_to_status_codes() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/employees")
        .set_json(employee_body("EMP010", "ab@x.com"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/employees")
        .set_json(employee_body("EMP011", "AB@x.com"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/employees")
        .set_json(employee_body("EMP012", "not-an-email"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/employees")
        .set_json(json!({
            "employee_code": "EMP013",
            "full_name": "C D",
            "email": "cd@x.com",
            "department": "Legal"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/employees")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_web::test]
async fn attendance_rules_over_http() {
    let app = app!();

    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/employees")
            .set_json(employee_body("EMP010", "ab@x.com"))
            .to_request(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let mark = |date: String, status: &str| {
        test::TestRequest::post()
            .uri("/attendance/")
            .set_json(json!({ "employee_id": id, "date": date, "status": status }))
            .to_request()
    };

    let resp = test::call_service(&app, mark("2024-01-15".into(), "Present")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, mark("2024-01-15".into(), "Absent")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(&app, mark("2024-01-16".into(), "Late")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let future = (Local::now().date_naive() + Duration::days(2)).to_string();
    let resp = test::call_service(&app, mark(future, "Present")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/attendance")
            .set_json(json!({ "employee_id": id + 1, "date": "2024-01-16", "status": "Present" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let records: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/attendance/employee/{id}"))
            .to_request(),
    )
    .await;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "Present");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/attendance/employee/{}", id + 1))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn summary_after_marking_two_days() {
    let app = app!();

    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/employees")
            .set_json(employee_body("EMP010", "ab@x.com"))
            .to_request(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    // before any attendance the employee is listed with zeros
    let summary: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/summary/employees").to_request(),
    )
    .await;
    assert_eq!(summary[0]["total_days"], 0);

    for (date, status) in [("2024-01-15", "Present"), ("2024-01-16", "Absent")] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/attendance")
                .set_json(json!({ "employee_id": id, "date": date, "status": status }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let summary: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/summary/employees").to_request(),
    )
    .await;
    assert_eq!(summary[0]["employee_id"], id);
    assert_eq!(summary[0]["present_days"], 1);
    assert_eq!(summary[0]["absent_days"], 1);
    assert_eq!(summary[0]["total_days"], 2);

    let departments: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/summary/departments").to_request(),
    )
    .await;
    assert_eq!(departments[0]["department"], "Engineering");
    assert_eq!(departments[0]["present_count"], 1);
    assert_eq!(departments[0]["absent_count"], 1);
}

#[actix_web::test]
async fn bulk_and_export() {
    let app = app!();

    let mut ids = Vec::new();
    for (code, email) in [("EMP001", "a@x.com"), ("EMP002", "b@x.com")] {
        let created: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/employees")
                .set_json(employee_body(code, email))
                .to_request(),
        )
        .await;
        ids.push(created["id"].as_i64().unwrap());
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/attendance/bulk")
            .set_json(json!({ "employee_ids": [ids[0], 999], "date": "2024-01-15", "status": "Present" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/attendance/bulk")
            .set_json(json!({ "employee_ids": ids, "date": "2024-01-15", "status": "Present" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["marked_employees"], 2);

    let csv = test::call_and_read_body(
        &app,
        test::TestRequest::post()
            .uri("/reports/attendance")
            .set_json(json!({ "format": "csv" }))
            .to_request(),
    )
    .await;
    let csv = String::from_utf8(csv.to_vec()).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Employee ID,Employee Name,Date,Status");
    assert_eq!(lines[1], "EMP001,A B,2024-01-15,Present");
    assert_eq!(lines.len(), 3);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/reports/attendance")
            .set_json(json!({ "format": "xml" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn search_and_code_generation() {
    let app = app!();

    for (code, email) in [("ENG001", "a@x.com"), ("ENG002", "b@x.com")] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/employees")
                .set_json(employee_body(code, email))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let found: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/employees/search?query=b%40x&department=Engineering")
            .to_request(),
    )
    .await;
    assert_eq!(found["total"], 1);
    assert_eq!(found["results"][0]["employee_code"], "ENG002");

    let generated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/employees/generate-code?department=Engineering")
            .to_request(),
    )
    .await;
    assert_eq!(generated["employee_code"], "ENG003");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/attendance/monthly?year=2024&month=13")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn non_numeric_ids_get_the_error_shape() {
    let app = app!();

    for uri in ["/employees/abc", "/employees/abc/stats", "/attendance/employee/abc"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert!(
            body["message"].as_str().unwrap().starts_with("Invalid path parameter"),
            "{uri}: {body}"
        );
    }
}

#[actix_web::test]
async fn input_checks_come_before_the_employee_lookup() {
    let app = app!();

    // no employee 42 exists, yet the bad input is what gets reported
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/attendance")
            .set_json(json!({ "employee_id": 42, "date": "2024-01-15", "status": "Late" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Status must be Present or Absent");

    let future = (Local::now().date_naive() + Duration::days(2)).to_string();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/attendance")
            .set_json(json!({ "employee_id": 42, "date": future, "status": "Present" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/attendance")
            .set_json(json!({ "employee_id": 42, "date": "2024-01-15", "status": "Present" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
