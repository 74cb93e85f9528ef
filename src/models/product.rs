use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub product_type: String, // hosting | vpn | domain | vps
    pub tier: Option<String>,
    pub provider: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub currency: String,
    pub rating: Option<f64>,
    pub clicks: i64,
    pub is_featured: bool,
    pub display_order: i32,
    pub show_on_landing: bool,
    pub show_on_home: bool,
    pub target_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::click_event::Entity")]
    ClickEvents,
}

impl Related<super::click_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClickEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One entry of an admin catalog reorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOrderEntry {
    pub id: String,
    pub display_order: i32,
    pub show_on_landing: bool,
    pub show_on_home: bool,
}

/// Where a product list is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Landing,
    Home,
}
