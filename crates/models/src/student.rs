use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub grade: Option<i32>,
}

/// The registry's only entity.
pub type Student = Model;

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Active model with every column marked for write.
    pub fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            name: Set(self.name.clone()),
            email: Set(self.email.clone()),
            grade: Set(self.grade),
        }
    }
}
