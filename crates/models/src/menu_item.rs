use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_item")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub image: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: i32,
    pub active: bool,
    pub people: i32,
    pub quantity: f64,
    pub measurement: String,
    pub unit_price: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input for inserting a catalog item.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    pub image: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: i32,
    pub people: i32,
    pub quantity: f64,
    pub measurement: String,
    pub unit_price: f64,
}

pub fn validate_item_type(t: &str) -> Result<(), errors::ModelError> {
    match t {
        "Veg" | "Non-Veg" => Ok(()),
        _ => Err(errors::ModelError::Validation("type must be Veg or Non-Veg".into())),
    }
}

pub fn validate_measurement(m: &str) -> Result<(), errors::ModelError> {
    match m {
        "kg" | "pcs" => Ok(()),
        _ => Err(errors::ModelError::Validation("measurement must be kg or pcs".into())),
    }
}

pub async fn create(db: &DatabaseConnection, input: NewMenuItem) -> Result<Model, errors::ModelError> {
    if input.name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    validate_item_type(&input.item_type)?;
    validate_measurement(&input.measurement)?;
    if input.unit_price < 0.0 { return Err(errors::ModelError::Validation("unitPrice must be >= 0".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        image: Set(input.image),
        item_type: Set(input.item_type),
        category: Set(input.category),
        active: Set(true),
        people: Set(input.people),
        quantity: Set(input.quantity),
        measurement: Set(input.measurement),
        unit_price: Set(input.unit_price),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
