use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use futures::{future, StreamExt, TryStreamExt};
use models::student::Student;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{errors::JsonApiError, state::ServerState};

/// Student body as sent by clients. Missing or null `id` and `name` fall
/// through to the validator instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct StudentPayload {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub grade: Option<i32>,
}

impl From<StudentPayload> for Student {
    fn from(p: StudentPayload) -> Self {
        Student {
            id: p.id.unwrap_or_else(Uuid::nil),
            name: p.name.unwrap_or_default(),
            email: p.email,
            grade: p.grade,
        }
    }
}

fn student_from_body(
    body: Result<Json<Option<StudentPayload>>, JsonRejection>,
) -> Result<Option<Student>, JsonApiError> {
    let Json(payload) = body?;
    Ok(payload.map(Student::from))
}

/// Optional narrowing applied to the lazy listing before it is materialised.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring of the student name.
    pub name: Option<String>,
    pub skip: Option<usize>,
    pub top: Option<usize>,
}

#[utoipa::path(
    post, path = "/api/students", tag = "students",
    request_body = crate::openapi::StudentDoc,
    responses(
        (status = 200, description = "Registered", body = crate::openapi::StudentDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ProblemDoc, content_type = "application/problem+json"),
        (status = 409, description = "Conflict", body = crate::openapi::ProblemDoc, content_type = "application/problem+json"),
        (status = 500, description = "Problem", body = crate::openapi::ProblemDoc, content_type = "application/problem+json")
    )
)]
pub async fn post_student(
    State(state): State<ServerState>,
    body: Result<Json<Option<StudentPayload>>, JsonRejection>,
) -> Result<Json<Student>, JsonApiError> {
    let stored = state.students.register_student(student_from_body(body)?).await?;
    info!(id = %stored.id, "registered student");
    Ok(Json(stored))
}

#[utoipa::path(
    get, path = "/api/students/{id}", tag = "students",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::StudentDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ProblemDoc, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = crate::openapi::ProblemDoc, content_type = "application/problem+json"),
        (status = 500, description = "Problem", body = crate::openapi::ProblemDoc, content_type = "application/problem+json")
    )
)]
pub async fn get_student(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<Student>, JsonApiError> {
    Ok(Json(state.students.retrieve_student_by_id(id).await?))
}

#[utoipa::path(
    get, path = "/api/students", tag = "students",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::StudentDoc]),
        (status = 500, description = "Problem", body = crate::openapi::ProblemDoc, content_type = "application/problem+json")
    )
)]
pub async fn get_students(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Student>>, JsonApiError> {
    let mut listing = state.students.retrieve_all_students().await?;

    if let Some(name) = q.name.filter(|n| !n.trim().is_empty()) {
        let needle = name.to_lowercase();
        listing = listing
            .try_filter(move |s| future::ready(s.name.to_lowercase().contains(&needle)))
            .boxed();
    }
    // only stored rows count towards `skip`; failures must still reach the caller
    let mut to_skip = q.skip.unwrap_or(0);
    let listing = listing.try_filter(move |_| {
        let keep = to_skip == 0;
        to_skip = to_skip.saturating_sub(1);
        future::ready(keep)
    });
    let list: Vec<Student> = match q.top {
        Some(top) => listing.take(top).try_collect().await?,
        None => listing.try_collect().await?,
    };
    info!(count = list.len(), "list students");
    Ok(Json(list))
}

#[utoipa::path(
    put, path = "/api/students", tag = "students",
    request_body = crate::openapi::StudentDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::StudentDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ProblemDoc, content_type = "application/problem+json"),
        (status = 500, description = "Problem", body = crate::openapi::ProblemDoc, content_type = "application/problem+json")
    )
)]
pub async fn put_student(
    State(state): State<ServerState>,
    body: Result<Json<Option<StudentPayload>>, JsonRejection>,
) -> Result<Json<Student>, JsonApiError> {
    let updated = state.students.modify_student(student_from_body(body)?).await?;
    info!(id = %updated.id, "modified student");
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/students/{id}", tag = "students",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::StudentDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ProblemDoc, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = crate::openapi::ProblemDoc, content_type = "application/problem+json"),
        (status = 500, description = "Problem", body = crate::openapi::ProblemDoc, content_type = "application/problem+json")
    )
)]
pub async fn delete_student(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, JsonApiError> {
    let deleted = state.students.delete_student_by_id(id).await?;
    info!(id = %deleted.id, "deleted student");
    Ok(Json(deleted))
}
