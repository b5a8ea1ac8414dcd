use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::{stream, StreamExt};
use models::student::Student;
use serde_json::{json, Value};
use service::students::{
    broker::{StudentStorageBroker, StudentStream},
    StorageError,
};
use tower::ServiceExt;
use uuid::Uuid;

use server::{startup::build_app, state::ServerState};

fn app() -> Router {
    build_app(ServerState::in_memory())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn student(name: &str) -> Value {
    json!({ "id": Uuid::new_v4(), "name": name, "email": format!("{}@school.test", name.to_lowercase()), "grade": 7 })
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn crud_round_trip() {
    let app = app();
    let ada = student("Ada");
    let id = ada["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::POST, "/api/students", Some(ada.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ada);

    let (status, body) = send(&app, Method::GET, &format!("/api/students/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");

    let mut renamed = ada.clone();
    renamed["name"] = json!("Ada Lovelace");
    let (status, body) = send(&app, Method::PUT, "/api/students", Some(renamed.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, renamed);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/students/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada Lovelace");

    let (status, body) = send(&app, Method::GET, &format!("/api/students/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["detail"], format!("couldn't find student with id: {id}"));
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/api/students", Some(Value::Null)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "student is null");

    let nil = json!({ "id": Uuid::nil(), "name": "Ada" });
    let (status, body) = send(&app, Method::POST, "/api/students", Some(nil)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation Error");

    let blank = json!({ "id": Uuid::new_v4(), "name": "   " });
    let (status, _) = send(&app, Method::PUT, "/api/students", Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, &format!("/api/students/{}", Uuid::nil()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    let ada = student("Ada");
    let (status, _) = send(&app, Method::POST, "/api/students", Some(ada.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/api/students", Some(ada)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn modify_or_delete_missing_student_is_a_problem() {
    let app = app();
    let ghost = student("Ghost");

    let (status, body) = send(&app, Method::PUT, "/api/students", Some(ghost)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["title"], "Problem");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/students/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_is_empty_then_filterable() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/students", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    for name in ["Ada", "Grace", "Adele", "Linus"] {
        let (status, _) = send(&app, Method::POST, "/api/students", Some(student(name))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, Method::GET, "/api/students", None).await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (_, body) = send(&app, Method::GET, "/api/students?name=AD", None).await;
    let mut names: Vec<&str> = body.as_array().unwrap().iter().map(|s| s["name"].as_str().unwrap()).collect();
    names.sort();
    assert_eq!(names, vec!["Ada", "Adele"]);

    let (_, body) = send(&app, Method::GET, "/api/students?skip=1&top=2", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/api/students?skip=10", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn openapi_document_lists_student_routes() {
    let (status, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/students"].is_object());
    assert!(body["paths"]["/api/students/{id}"].is_object());
    assert!(body["components"]["schemas"]["ProblemDoc"].is_object());
    let not_found = body["paths"]["/api/students/{id}"]["get"]["responses"]["404"].to_string();
    assert!(not_found.contains("#/components/schemas/ProblemDoc"));
}

#[tokio::test]
async fn missing_or_null_fields_reach_the_validator() {
    let app = app();

    let no_name = json!({ "id": Uuid::new_v4() });
    let (status, body) = send(&app, Method::POST, "/api/students", Some(no_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation Error");

    let null_name = json!({ "id": Uuid::new_v4(), "name": null });
    let (status, body) = send(&app, Method::PUT, "/api/students", Some(null_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation Error");

    let no_id = json!({ "name": "Ada" });
    let (status, body) = send(&app, Method::POST, "/api/students", Some(no_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("parameter name: id"));
}

#[tokio::test]
async fn malformed_body_is_a_problem_document() {
    let app = app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/students")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/problem+json");
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["title"], "Invalid Body");
}

/// Listing yields a row, then a lost connection, then another row.
struct FlakyListingBroker {
    first: Student,
    last: Student,
}

#[async_trait::async_trait]
impl StudentStorageBroker for FlakyListingBroker {
    async fn insert_student(&self, student: Student) -> Result<Student, StorageError> {
        Ok(student)
    }

    async fn select_student_by_id(&self, _id: Uuid) -> Result<Option<Student>, StorageError> {
        Ok(None)
    }

    fn select_all_students(&self) -> StudentStream {
        stream::iter(vec![
            Ok(self.first.clone()),
            Err(StorageError::Connectivity("connection reset".into())),
            Ok(self.last.clone()),
        ])
        .boxed()
    }

    async fn update_student(&self, student: Student) -> Result<Student, StorageError> {
        Ok(student)
    }

    async fn delete_student(&self, student: Student) -> Result<Student, StorageError> {
        Ok(student)
    }
}

fn flaky_app() -> Router {
    let named = |name: &str| Student { id: Uuid::new_v4(), name: name.into(), email: None, grade: None };
    build_app(ServerState::with_broker(FlakyListingBroker { first: named("a"), last: named("b") }))
}

#[tokio::test]
async fn listing_failure_is_never_skipped_or_filtered_away() {
    let app = flaky_app();

    for uri in ["/api/students", "/api/students?skip=1", "/api/students?skip=2", "/api/students?name=b"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["title"], "Problem");
    }

    let (status, body) = send(&app, Method::GET, "/api/students?top=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
