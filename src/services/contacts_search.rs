use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::Config;
use crate::constants::apps;
use crate::db::Store;
use crate::domain::principal_uri;
use crate::models::search::{ObjectSearchOptions, SearchResultEntry, SearchResults};
use crate::parser::vcard;
use crate::services::apps::AppGate;
use crate::services::search_provider::{SearchError, SearchProvider, SearchQuery};

const SEARCH_PROPERTIES: &[&str] = &["FN", "N", "NICKNAME", "EMAIL", "ORG", "NOTE"];

/// Searches the user's address books and renders cards as avatar entries.
pub struct ContactsSearchProvider {
    store: Store,
    gate: Arc<AppGate>,
    config: Arc<RwLock<Config>>,
}

impl ContactsSearchProvider {
    #[must_use]
    pub const fn new(store: Store, gate: Arc<AppGate>, config: Arc<RwLock<Config>>) -> Self {
        Self {
            store,
            gate,
            config,
        }
    }

    fn entry(
        web_base: &str,
        user_id: &str,
        collection_uri: &str,
        object_uri: &str,
        contact: &vcard::ParsedContact,
    ) -> SearchResultEntry {
        let stem = object_uri.trim_end_matches(".vcf");

        let title = contact
            .full_name
            .clone()
            .unwrap_or_else(|| stem.to_string());
        let subline = contact.email.clone().unwrap_or_default();

        let thumbnail_url = if contact.has_photo {
            format!(
                "{web_base}/remote.php/dav/addressbooks/users/{user_id}/{collection_uri}/{object_uri}?photo"
            )
        } else {
            String::new()
        };

        let uid = contact.uid.as_deref().unwrap_or(stem);
        let resource_url = format!(
            "{web_base}/apps/contacts/direct/contact/{}",
            urlencoding::encode(&format!("{uid}~{collection_uri}"))
        );

        SearchResultEntry {
            thumbnail_url,
            title,
            subline,
            resource_url,
            icon: "icon-contacts-dark".to_string(),
            rounded: true,
        }
    }
}

#[async_trait]
impl SearchProvider for ContactsSearchProvider {
    fn id(&self) -> &'static str {
        apps::CONTACTS
    }

    fn display_name(&self) -> &'static str {
        "Contacts"
    }

    async fn search(
        &self,
        user_id: &str,
        query: &SearchQuery,
    ) -> Result<SearchResults, SearchError> {
        if !self
            .gate
            .is_enabled_for_user(apps::CONTACTS, user_id)
            .await?
        {
            return Ok(SearchResults::empty());
        }

        let principal = principal_uri(user_id);
        let offset = query.offset();

        let options = ObjectSearchOptions {
            component: None,
            properties: SEARCH_PROPERTIES.iter().map(ToString::to_string).collect(),
            cn_only_properties: Vec::new(),
            limit: query.limit,
            offset,
            since: None,
            until: None,
        };

        let rows = self
            .store
            .search_cards(&principal, &query.term, &options)
            .await?;
        let row_count = rows.len() as u64;

        metrics::counter!("davarr_searches_total", "provider" => apps::CONTACTS).increment(1);

        let web_base = self.config.read().await.server.web_base_url.clone();

        let entries = rows
            .into_iter()
            .filter_map(|row| match vcard::parse_contact(&row.data) {
                Ok(contact) => Some(Self::entry(
                    &web_base,
                    user_id,
                    &row.collection_uri,
                    &row.object_uri,
                    &contact,
                )),
                Err(e) => {
                    warn!(object = %row.object_uri, error = %e, "Skipping unreadable card");
                    None
                }
            })
            .collect();

        Ok(SearchResults::page(
            entries,
            row_count,
            query.limit,
            offset,
        ))
    }
}
