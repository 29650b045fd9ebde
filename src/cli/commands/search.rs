use std::sync::Arc;

use crate::config::Config;
use crate::services::SearchQuery;
use crate::state::SharedState;

pub async fn cmd_search(
    config: &Config,
    provider_id: &str,
    user: &str,
    term: &str,
    limit: Option<u64>,
    cursor: Option<u64>,
) -> anyhow::Result<()> {
    let state = Arc::new(SharedState::new(config.clone()).await?);

    let Some(provider) = state.provider(provider_id) else {
        println!("Unknown provider '{provider_id}'.");
        println!(
            "Available: {}",
            state
                .providers
                .iter()
                .map(|p| p.id())
                .collect::<Vec<_>>()
                .join(", ")
        );
        return Ok(());
    };

    let query = SearchQuery {
        term: term.to_string(),
        limit: limit.unwrap_or(config.search.default_limit),
        cursor,
        since: None,
        until: None,
    };

    let results = provider.search(user, &query).await?;

    if results.entries.is_empty() {
        println!("No {} results for '{term}'.", provider.display_name());
        return Ok(());
    }

    println!("{} results for '{term}':", provider.display_name());
    println!("{:-<60}", "");

    for entry in &results.entries {
        println!("• {}", entry.title);
        if !entry.subline.is_empty() {
            println!("  {}", entry.subline);
        }
        println!("  {}", entry.resource_url);
    }

    if results.is_paginated
        && let Some(cursor) = results.cursor
    {
        println!();
        println!("More results: davarr search {provider_id} \"{term}\" -u {user} --cursor {cursor}");
    }

    Ok(())
}
