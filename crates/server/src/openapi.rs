use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(ToSchema)]
pub struct StudentDoc {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub grade: Option<i32>,
}

#[derive(ToSchema)]
pub struct ProblemDoc {
    pub status: u16,
    pub title: String,
    pub detail: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::students::post_student,
        crate::routes::students::get_students,
        crate::routes::students::get_student,
        crate::routes::students::put_student,
        crate::routes::students::delete_student,
    ),
    components(schemas(HealthResponse, StudentDoc, ProblemDoc)),
    tags((name = "health"), (name = "students"))
)]
pub struct ApiDoc;
