use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Calendars)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CalendarSubscriptions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CalendarObjects)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CalendarObjectProperties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AddressBooks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Cards)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(CardProperties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserSettings)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Property lookups always filter on name + value.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_calendar_object_properties_name_value")
                    .table(CalendarObjectProperties)
                    .col(crate::entities::calendar_object_properties::Column::Name)
                    .col(crate::entities::calendar_object_properties::Column::Value)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_card_properties_name_value")
                    .table(CardProperties)
                    .col(crate::entities::card_properties::Column::Name)
                    .col(crate::entities::card_properties::Column::Value)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CardProperties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cards).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AddressBooks).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CalendarObjectProperties).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CalendarObjects).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CalendarSubscriptions).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Calendars).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSettings).to_owned())
            .await?;

        Ok(())
    }
}
