use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "calendars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// DAV principal owning this calendar, e.g. `principals/users/alice`.
    pub principal_uri: String,

    pub uri: String,

    pub display_name: String,

    /// Comma-separated component types this calendar accepts, e.g. "VEVENT,VTODO".
    pub components: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
