use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_gamification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub points: i64,
    pub level: String,
    pub badges: String,       // JSON array, in the order they were earned
    pub achievements: String, // JSON array
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn badge_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.badges)
    }

    pub fn achievement_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.achievements)
    }
}
