use futures::{future, stream, StreamExt};
use models::student::{self, Student};
use sea_orm::{
    sqlx, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder, RuntimeErr,
    SqlErr,
};
use uuid::Uuid;

use crate::students::broker::{StudentStorageBroker, StudentStream};
use crate::students::errors::StorageError;

/// Rows fetched per round trip while a listing stream is consumed.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// SeaORM-backed broker.
pub struct SeaOrmStudentStorageBroker {
    pub db: DatabaseConnection,
    page_size: u64,
}

impl SeaOrmStudentStorageBroker {
    pub fn new(db: DatabaseConnection) -> Self { Self { db, page_size: DEFAULT_PAGE_SIZE } }

    pub fn with_page_size(db: DatabaseConnection, page_size: u64) -> Self {
        Self { db, page_size: page_size.max(1) }
    }
}

/// Transport-level sqlx failures surfacing inside a query or statement.
fn is_lost_connection(err: &RuntimeErr) -> bool {
    matches!(
        err,
        RuntimeErr::SqlxError(
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        )
    )
}

/// Map a SeaORM error onto the broker failure kinds.
pub fn classify_db_err(err: DbErr) -> StorageError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => return StorageError::DuplicateKey(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => return StorageError::UpdateConflict(detail),
        _ => {}
    }
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StorageError::Connectivity(err.to_string()),
        DbErr::Query(ref rt) | DbErr::Exec(ref rt) if is_lost_connection(rt) => {
            StorageError::Connectivity(err.to_string())
        }
        DbErr::RecordNotUpdated | DbErr::RecordNotInserted => StorageError::UpdateConflict(err.to_string()),
        other => StorageError::Unknown(other.to_string()),
    }
}

#[async_trait::async_trait]
impl StudentStorageBroker for SeaOrmStudentStorageBroker {
    async fn insert_student(&self, student: Student) -> Result<Student, StorageError> {
        student.to_active_model().insert(&self.db).await.map_err(classify_db_err)
    }

    async fn select_student_by_id(&self, id: Uuid) -> Result<Option<Student>, StorageError> {
        student::Entity::find_by_id(id).one(&self.db).await.map_err(classify_db_err)
    }

    fn select_all_students(&self) -> StudentStream {
        let db = self.db.clone();
        let page_size = self.page_size;
        stream::unfold(Some(0u64), move |page| {
            let db = db.clone();
            async move {
                let Some(page) = page else { return None };
                let fetched = student::Entity::find()
                    .order_by_asc(student::Column::Id)
                    .paginate(&db, page_size)
                    .fetch_page(page)
                    .await;
                match fetched {
                    Ok(rows) if rows.is_empty() => None,
                    Ok(rows) => {
                        let next = if (rows.len() as u64) < page_size { None } else { Some(page + 1) };
                        Some((Ok(rows), next))
                    }
                    Err(e) => Some((Err(classify_db_err(e)), None)),
                }
            }
        })
        .flat_map(|page: Result<Vec<Student>, StorageError>| match page {
            Ok(rows) => stream::iter(rows.into_iter().map(Ok)).boxed(),
            Err(e) => stream::once(future::ready(Err(e))).boxed(),
        })
        .boxed()
    }

    async fn update_student(&self, student: Student) -> Result<Student, StorageError> {
        student.to_active_model().update(&self.db).await.map_err(classify_db_err)
    }

    async fn delete_student(&self, student: Student) -> Result<Student, StorageError> {
        let res = student::Entity::delete_by_id(student.id)
            .exec(&self.db)
            .await
            .map_err(classify_db_err)?;
        if res.rows_affected == 0 {
            return Err(StorageError::UpdateConflict(format!("student {} was not deleted", student.id)));
        }
        Ok(student)
    }
}
