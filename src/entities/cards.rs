use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub address_book_id: i32,

    pub uri: String,

    pub card_data: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::card_properties::Entity")]
    CardProperties,
}

impl Related<super::card_properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CardProperties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
