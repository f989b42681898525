use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use faculty_hr::config::Config;
use faculty_hr::routes;
use faculty_hr::state::AppState;
use faculty_hr::store::MemoryStore;

macro_rules! spawn_app {
    () => {{
        let config = Config::in_memory();
        let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40000))
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).peer_addr(peer())
}

fn post(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).peer_addr(peer()).set_json(body)
}

fn put(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::put().uri(uri).peer_addr(peer()).set_json(body)
}

fn delete(uri: &str) -> test::TestRequest {
    test::TestRequest::delete().uri(uri).peer_addr(peer())
}

fn faculty_body(emp_id: u64, casual_leaves: i32) -> Value {
    json!({
        "empId": emp_id,
        "name": format!("Faculty {emp_id}"),
        "dept": "Physics",
        "designation": "Lecturer",
        "salary": 26000.0,
        "casualLeaves": casual_leaves
    })
}

#[actix_web::test]
async fn errors_share_one_json_shape() {
    let app = spawn_app!();

    let res = test::call_service(&app, get("/api/faculty/99").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("99"));

    let res = test::call_service(&app, get("/api/summary/2024-13").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "BAD_REQUEST");

    let malformed = test::TestRequest::post()
        .uri("/api/faculty")
        .peer_addr(peer())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"empId\": ")
        .to_request();
    let res = test::call_service(&app, malformed).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[actix_web::test]
async fn faculty_crud_round() {
    let app = spawn_app!();

    let res = test::call_service(&app, post("/api/faculty", faculty_body(1, 2)).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(&app, post("/api/faculty", faculty_body(1, 2)).to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(&app, put("/api/faculty/1", json!({ "salary": 31000.0 })).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["salary"], 31000.0);
    assert_eq!(body["casualLeaves"], 2);

    let res = test::call_service(&app, delete("/api/faculty/1").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(&app, get("/api/faculty").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn attendance_rows_apply_valid_rows_and_warn_about_the_rest() {
    let app = spawn_app!();
    test::call_service(&app, post("/api/faculty", faculty_body(1, 0)).to_request()).await;

    let rows = json!({
        "date": "2024-03-11",
        "rows": [
            { "Emp.Id": 1, "In.Time": "08:45" },
            { "Emp.Id": 42, "In.Time": "09:30" }
        ]
    });
    let res = test::call_service(&app, post("/api/attendance/rows", rows).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["accepted"], 1);
    assert_eq!(body["rejected"][0]["row"], 2);
    assert!(body["warning"].as_str().unwrap().contains("42"));

    let res = test::call_service(&app, get("/api/attendance/daily/2024-03-11").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["totalFaculty"], 1);
    assert_eq!(body["onTime"], 1);
    assert_eq!(body["records"][0]["status"], "On-time");

    let nothing_usable = json!({ "date": "2024-03-12", "rows": [{ "Emp.Id": 42, "In.Time": "09:30" }] });
    let res = test::call_service(&app, post("/api/attendance/rows", nothing_usable).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn empty_workbook_upload_is_rejected() {
    let app = spawn_app!();
    let req = test::TestRequest::post()
        .uri("/api/attendance/upload/2024-03-11")
        .peer_addr(peer())
        .set_payload(Vec::<u8>::new())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn leave_lifecycle() {
    let app = spawn_app!();
    test::call_service(&app, post("/api/faculty", faculty_body(1, 2)).to_request()).await;

    let res = test::call_service(&app, post("/api/leave", json!({ "empId": 1 })).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["errors"].as_array().unwrap().len(), 4);

    let submission = json!({
        "empId": 1,
        "startDate": "2024-03-04",
        "endDate": "2024-03-05",
        "reason": "Workshop",
        "leaveType": "On-Duty"
    });
    let res = test::call_service(&app, post("/api/leave", submission).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let leave: Value = test::read_body_json(res).await;
    assert_eq!(leave["status"], "Pending");
    let id = leave["id"].as_str().unwrap().to_string();

    let res = test::call_service(&app, get("/api/attendance/daily/2024-03-05").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["onDuty"], 1);

    let approve = format!("/api/leave/{id}/approve");
    let res = test::call_service(&app, put(&approve, json!({})).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "Approved");

    let res = test::call_service(&app, put(&approve, json!({})).to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(&app, delete(&format!("/api/leave/{id}")).to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(&app, get(&format!("/api/leave/{id}/letter")).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let letter = test::read_body(res).await;
    assert!(String::from_utf8_lossy(&letter).contains("Workshop"));

    let res = test::call_service(&app, get("/api/leave?status=Approved&empId=1").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn allocation_runs_once_per_month() {
    let app = spawn_app!();
    test::call_service(&app, post("/api/faculty", faculty_body(1, 0)).to_request()).await;

    let res = test::call_service(&app, get("/api/allocation/2024-03").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert!(body.is_null());

    let first = test::TestRequest::post().uri("/api/allocation/2024-03").peer_addr(peer()).to_request();
    let body: Value = test::call_and_read_body_json(&app, first).await;
    assert_eq!(body["outcome"], "completed");
    assert_eq!(body["lock"]["updatedCount"], 1);

    let second = test::TestRequest::post().uri("/api/allocation/2024-03").peer_addr(peer()).to_request();
    let body: Value = test::call_and_read_body_json(&app, second).await;
    assert_eq!(body["outcome"], "alreadyCompleted");

    let res = test::call_service(&app, get("/api/faculty/1").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["casualLeaves"], 1);
}

#[actix_web::test]
async fn summary_export_is_an_attachment() {
    let app = spawn_app!();
    test::call_service(&app, post("/api/faculty", faculty_body(1, 0)).to_request()).await;

    let res = test::call_service(&app, get("/api/summary/2024-03?workingDays=26").to_request()).await;
    let rows: Value = test::read_body_json(res).await;
    assert_eq!(rows[0]["empId"], 1);
    assert_eq!(rows[0]["actualWorkingDays"], 26);

    let res = test::call_service(
        &app,
        post("/api/summary/2024-03/export", json!({ "format": "csv", "workingDays": 26 })).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.contains("summary-2024-03.csv"));
    let csv = test::read_body(res).await;
    assert!(String::from_utf8_lossy(&csv).starts_with("Emp ID,Name"));

    let res = test::call_service(
        &app,
        post("/api/summary/2024-03/adjust", json!({ "overrides": { "7": 10.0 } })).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_then_login() {
    let app = spawn_app!();
    test::call_service(&app, post("/api/faculty", faculty_body(7, 0)).to_request()).await;

    let registration = json!({
        "username": " Api.Asha ",
        "password": "s3cret",
        "confirmPassword": "s3cret",
        "empId": 7
    });
    let res = test::call_service(&app, post("/api/auth/register", registration.clone()).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["outcome"], "created");

    let res = test::call_service(&app, post("/api/auth/register", registration).to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(&app, get("/api/auth/username-available/API.ASHA").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["available"], false);

    let wrong = json!({ "username": "api.asha", "password": "nope" });
    let res = test::call_service(&app, post("/api/auth/login", wrong).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let right = json!({ "username": "api.asha", "password": "s3cret" });
    let res = test::call_service(&app, post("/api/auth/login", right).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["role"], "Faculty");
    assert_eq!(body["empId"], 7);

    let res = test::call_service(&app, get("/api/faculty/7").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["registered"], true);
}

#[actix_web::test]
async fn settings_round_trip() {
    let app = spawn_app!();

    let res = test::call_service(&app, get("/api/settings").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["onTimeThreshold"], "09:00:00");

    let res = test::call_service(
        &app,
        put("/api/settings", json!({ "onTimeThreshold": "09:15:00", "permissionLimit": 5 })).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(&app, get("/api/settings").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["permissionLimit"], 5);
    assert_eq!(body["accountCreationEnabled"], true);
}
