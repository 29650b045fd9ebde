use sea_orm::entity::prelude::*;

/// One indexed property value per row, mirroring the object's parsed
/// component. Searches match against `value`; `parameter` carries the
/// sub-property a value came from (e.g. CN for attendee display names).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "calendar_object_properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub object_id: i32,

    pub calendar_id: i32,

    pub calendar_type: i32,

    pub name: String,

    pub parameter: Option<String>,

    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::calendar_objects::Entity",
        from = "Column::ObjectId",
        to = "super::calendar_objects::Column::Id"
    )]
    CalendarObjects,
}

impl Related<super::calendar_objects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarObjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
