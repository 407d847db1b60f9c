use chrono::Utc;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    #[sea_orm(column_type = "String(StringLen::N(12))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(30))")]
    pub title: String,
    pub race: String,
    pub profession: String,
    pub birthday: chrono::DateTime<Utc>,
    pub experience: i32,
    pub level: i32,
    pub until_next_level: i32,
    pub banned: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
