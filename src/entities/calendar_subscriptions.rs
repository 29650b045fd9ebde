use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "calendar_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub principal_uri: String,

    pub uri: String,

    pub display_name: String,

    /// Upstream URL the subscription is refreshed from.
    pub source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
