use crate::entities::calendar_objects::{CALENDAR_TYPE_CALENDAR, CALENDAR_TYPE_SUBSCRIPTION};
use crate::entities::{
    calendar_object_properties, calendar_objects, calendar_subscriptions, calendars, prelude::*,
};
use crate::models::search::{ObjectSearchOptions, ObjectSearchRow};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, NotSet,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use std::collections::HashMap;

/// An indexed property attached to a stored calendar object.
#[derive(Debug, Clone)]
pub struct IndexedProperty {
    pub name: String,

    /// Sub-property the value came from, e.g. CN for attendee names.
    pub parameter: Option<String>,

    pub value: String,
}

impl IndexedProperty {
    #[must_use]
    pub fn plain(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            parameter: None,
            value: value.to_string(),
        }
    }

    #[must_use]
    pub fn with_parameter(name: &str, parameter: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            parameter: Some(parameter.to_string()),
            value: value.to_string(),
        }
    }
}

/// Repository for calendars, subscriptions and calendar objects, including
/// the property-index search consumed by the events and tasks providers.
pub struct CalendarRepository {
    conn: DatabaseConnection,
}

impl CalendarRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_calendars_for_principal(
        &self,
        principal_uri: &str,
    ) -> Result<Vec<calendars::Model>> {
        let rows = Calendars::find()
            .filter(calendars::Column::PrincipalUri.eq(principal_uri))
            .order_by_asc(calendars::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn get_subscriptions_for_principal(
        &self,
        principal_uri: &str,
    ) -> Result<Vec<calendar_subscriptions::Model>> {
        let rows = CalendarSubscriptions::find()
            .filter(calendar_subscriptions::Column::PrincipalUri.eq(principal_uri))
            .order_by_asc(calendar_subscriptions::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn insert_calendar(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: &str,
        components: &str,
    ) -> Result<calendars::Model> {
        let calendar = calendars::ActiveModel {
            id: NotSet,
            principal_uri: Set(principal_uri.to_string()),
            uri: Set(uri.to_string()),
            display_name: Set(display_name.to_string()),
            components: Set(components.to_string()),
        }
        .insert(&self.conn)
        .await?;

        Ok(calendar)
    }

    pub async fn insert_subscription(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: &str,
        source: &str,
    ) -> Result<calendar_subscriptions::Model> {
        let subscription = calendar_subscriptions::ActiveModel {
            id: NotSet,
            principal_uri: Set(principal_uri.to_string()),
            uri: Set(uri.to_string()),
            display_name: Set(display_name.to_string()),
            source: Set(source.to_string()),
        }
        .insert(&self.conn)
        .await?;

        Ok(subscription)
    }

    /// Store a calendar object together with its searchable property rows.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_object(
        &self,
        calendar_id: i32,
        calendar_type: i32,
        uri: &str,
        component_type: &str,
        calendar_data: &str,
        occurrence: (Option<i64>, Option<i64>),
        properties: &[IndexedProperty],
    ) -> Result<calendar_objects::Model> {
        let object = calendar_objects::ActiveModel {
            id: NotSet,
            calendar_id: Set(calendar_id),
            calendar_type: Set(calendar_type),
            uri: Set(uri.to_string()),
            component_type: Set(component_type.to_string()),
            calendar_data: Set(calendar_data.to_string()),
            first_occurrence: Set(occurrence.0),
            last_occurrence: Set(occurrence.1),
        }
        .insert(&self.conn)
        .await?;

        for property in properties {
            calendar_object_properties::ActiveModel {
                id: NotSet,
                object_id: Set(object.id),
                calendar_id: Set(calendar_id),
                calendar_type: Set(calendar_type),
                name: Set(property.name.clone()),
                parameter: Set(property.parameter.clone()),
                value: Set(property.value.clone()),
            }
            .insert(&self.conn)
            .await?;
        }

        Ok(object)
    }

    /// Search all objects in the principal's calendars and subscriptions
    /// whose indexed properties match the term. Component and time-range
    /// filters apply before the window, so `offset`/`limit` slice the final
    /// ordering. Results are distinct per object, ordered by object id.
    pub async fn search_principal_uri(
        &self,
        principal_uri: &str,
        term: &str,
        options: &ObjectSearchOptions,
    ) -> Result<Vec<ObjectSearchRow>> {
        let calendars = self.get_calendars_for_principal(principal_uri).await?;
        let subscriptions = self.get_subscriptions_for_principal(principal_uri).await?;

        if calendars.is_empty() && subscriptions.is_empty() {
            return Ok(Vec::new());
        }

        let calendar_uris: HashMap<i32, String> =
            calendars.iter().map(|c| (c.id, c.uri.clone())).collect();
        let subscription_uris: HashMap<i32, String> = subscriptions
            .iter()
            .map(|s| (s.id, s.uri.clone()))
            .collect();

        let mut collection_cond = Condition::any();
        if !calendars.is_empty() {
            let ids: Vec<i32> = calendars.iter().map(|c| c.id).collect();
            collection_cond = collection_cond.add(
                Condition::all()
                    .add(
                        calendar_object_properties::Column::CalendarType
                            .eq(CALENDAR_TYPE_CALENDAR),
                    )
                    .add(calendar_object_properties::Column::CalendarId.is_in(ids)),
            );
        }
        if !subscriptions.is_empty() {
            let ids: Vec<i32> = subscriptions.iter().map(|s| s.id).collect();
            collection_cond = collection_cond.add(
                Condition::all()
                    .add(
                        calendar_object_properties::Column::CalendarType
                            .eq(CALENDAR_TYPE_SUBSCRIPTION),
                    )
                    .add(calendar_object_properties::Column::CalendarId.is_in(ids)),
            );
        }

        let mut property_cond = Condition::any();
        for name in &options.properties {
            if options.cn_only_properties.contains(name) {
                property_cond = property_cond.add(
                    Condition::all()
                        .add(calendar_object_properties::Column::Name.eq(name.as_str()))
                        .add(calendar_object_properties::Column::Parameter.eq("CN")),
                );
            } else {
                property_cond =
                    property_cond.add(calendar_object_properties::Column::Name.eq(name.as_str()));
            }
        }

        let mut query = CalendarObjectProperties::find()
            .join(
                JoinType::InnerJoin,
                calendar_object_properties::Relation::CalendarObjects.def(),
            )
            .filter(collection_cond)
            .filter(property_cond);

        if !term.is_empty() {
            query = query.filter(calendar_object_properties::Column::Value.contains(term));
        }

        if let Some(component) = &options.component {
            query = query.filter(calendar_objects::Column::ComponentType.eq(component.as_str()));
        }
        if let Some(since) = options.since {
            query = query.filter(calendar_objects::Column::LastOccurrence.gte(since));
        }
        if let Some(until) = options.until {
            query = query.filter(calendar_objects::Column::FirstOccurrence.lte(until));
        }

        let object_ids: Vec<i32> = query
            .select_only()
            .column(calendar_object_properties::Column::ObjectId)
            .distinct()
            .order_by_asc(calendar_object_properties::Column::ObjectId)
            .offset(options.offset)
            .limit(options.limit)
            .into_tuple()
            .all(&self.conn)
            .await?;

        if object_ids.is_empty() {
            return Ok(Vec::new());
        }

        let matched = CalendarObjects::find()
            .filter(calendar_objects::Column::Id.is_in(object_ids))
            .order_by_asc(calendar_objects::Column::Id)
            .all(&self.conn)
            .await?;

        let rows = matched
            .into_iter()
            .map(|object| {
                let collection_uri = if object.calendar_type == CALENDAR_TYPE_SUBSCRIPTION {
                    subscription_uris.get(&object.calendar_id)
                } else {
                    calendar_uris.get(&object.calendar_id)
                };

                ObjectSearchRow {
                    object_id: object.id,
                    object_uri: object.uri,
                    collection_uri: collection_uri.cloned().unwrap_or_default(),
                    data: object.calendar_data,
                }
            })
            .collect();

        Ok(rows)
    }
}
