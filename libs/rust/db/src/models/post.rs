use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Off-chain metadata for a governance post. The `id` is the proposal's
/// on-chain index rendered as a string; a post is unique within its
/// proposal-type collection.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub proposal_type: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Json>,
    pub topic: Option<Json>,
    pub topic_id: Option<i32>,
    pub track_number: Option<i32>,
    pub last_edited_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
