use crate::entities::{address_books, card_properties, cards, prelude::*};
use crate::models::search::{ObjectSearchOptions, ObjectSearchRow};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

/// Repository for address books and their cards, including the
/// property-index search consumed by the contacts provider.
pub struct AddressBookRepository {
    conn: DatabaseConnection,
}

impl AddressBookRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_for_principal(
        &self,
        principal_uri: &str,
    ) -> Result<Vec<address_books::Model>> {
        let books = AddressBooks::find()
            .filter(address_books::Column::PrincipalUri.eq(principal_uri))
            .order_by_asc(address_books::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(books)
    }

    pub async fn insert_address_book(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: &str,
    ) -> Result<address_books::Model> {
        let book = address_books::ActiveModel {
            id: NotSet,
            principal_uri: Set(principal_uri.to_string()),
            uri: Set(uri.to_string()),
            display_name: Set(display_name.to_string()),
        }
        .insert(&self.conn)
        .await?;

        Ok(book)
    }

    /// Store a card together with its searchable property rows.
    pub async fn insert_card(
        &self,
        address_book_id: i32,
        uri: &str,
        card_data: &str,
        properties: &[(&str, &str)],
    ) -> Result<cards::Model> {
        let card = cards::ActiveModel {
            id: NotSet,
            address_book_id: Set(address_book_id),
            uri: Set(uri.to_string()),
            card_data: Set(card_data.to_string()),
        }
        .insert(&self.conn)
        .await?;

        for (name, value) in properties {
            card_properties::ActiveModel {
                id: NotSet,
                card_id: Set(card.id),
                address_book_id: Set(address_book_id),
                name: Set((*name).to_string()),
                value: Set((*value).to_string()),
            }
            .insert(&self.conn)
            .await?;
        }

        Ok(card)
    }

    /// Search all cards in the principal's address books whose indexed
    /// properties match the term. Results are distinct per card, ordered by
    /// card id, windowed exactly by `offset`/`limit`.
    pub async fn search_principal_uri(
        &self,
        principal_uri: &str,
        term: &str,
        options: &ObjectSearchOptions,
    ) -> Result<Vec<ObjectSearchRow>> {
        let books = self.get_for_principal(principal_uri).await?;
        if books.is_empty() {
            return Ok(Vec::new());
        }

        let book_uris: HashMap<i32, String> =
            books.iter().map(|b| (b.id, b.uri.clone())).collect();
        let book_ids: Vec<i32> = books.iter().map(|b| b.id).collect();

        let mut property_cond = Condition::any();
        for name in &options.properties {
            property_cond = property_cond.add(card_properties::Column::Name.eq(name.as_str()));
        }

        let mut query = CardProperties::find()
            .filter(card_properties::Column::AddressBookId.is_in(book_ids))
            .filter(property_cond);

        if !term.is_empty() {
            query = query.filter(card_properties::Column::Value.contains(term));
        }

        let card_ids: Vec<i32> = query
            .select_only()
            .column(card_properties::Column::CardId)
            .distinct()
            .order_by_asc(card_properties::Column::CardId)
            .offset(options.offset)
            .limit(options.limit)
            .into_tuple()
            .all(&self.conn)
            .await?;

        if card_ids.is_empty() {
            return Ok(Vec::new());
        }

        let matched = Cards::find()
            .filter(cards::Column::Id.is_in(card_ids))
            .order_by_asc(cards::Column::Id)
            .all(&self.conn)
            .await?;

        let rows = matched
            .into_iter()
            .map(|card| ObjectSearchRow {
                object_id: card.id,
                object_uri: card.uri,
                collection_uri: book_uris
                    .get(&card.address_book_id)
                    .cloned()
                    .unwrap_or_default(),
                data: card.card_data,
            })
            .collect();

        Ok(rows)
    }
}
