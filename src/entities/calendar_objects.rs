use sea_orm::entity::prelude::*;

/// Discriminator for `calendar_id`: 0 = calendar, 1 = subscription.
pub const CALENDAR_TYPE_CALENDAR: i32 = 0;
pub const CALENDAR_TYPE_SUBSCRIPTION: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "calendar_objects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub calendar_id: i32,

    pub calendar_type: i32,

    pub uri: String,

    /// VEVENT or VTODO.
    pub component_type: String,

    pub calendar_data: String,

    /// Epoch seconds of the first occurrence, for time-range bounded search.
    pub first_occurrence: Option<i64>,

    pub last_occurrence: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::calendar_object_properties::Entity")]
    CalendarObjectProperties,
}

impl Related<super::calendar_object_properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarObjectProperties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
