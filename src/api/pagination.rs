// src/api/pagination.rs
//! Cursor pagination over `{ data, paging.next }` list endpoints.

use super::client::GraphClient;
use super::rate_limiter::Pace;
use super::request::GraphRequest;
use super::responses::PagedResponse;
use crate::error::AppError;
use serde::de::DeserializeOwned;

/// Follows `paging.next` from `first` and concatenates every page's `data`.
///
/// Stops when a page has no `next` cursor, when `max_items` items have been
/// collected or after the client's page cap, whichever comes first. The
/// result never holds more than `max_items` items.
pub async fn fetch_all_pages<T>(
    client: &GraphClient,
    first: GraphRequest,
    max_items: Option<usize>,
) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned,
{
    if max_items == Some(0) {
        return Ok(Vec::new());
    }

    let settings = client.settings();
    let max_pages = settings.max_pages.max(1);
    let mut items: Vec<T> = Vec::new();
    let mut pages_fetched = 0usize;

    let mut page: PagedResponse<T> = parse_page(client.send(&first, Pace::Normal).await?)?;

    loop {
        pages_fetched += 1;
        let next = page.next_url().map(str::to_string);
        items.extend(page.data);

        if max_items.is_some_and(|max| items.len() >= max) {
            log::debug!("Item cap reached after {} page(s)", pages_fetched);
            break;
        }
        let Some(next) = next else {
            break;
        };
        if pages_fetched >= max_pages {
            log::warn!(
                "Stopped following pagination after {} pages; more results were offered",
                max_pages
            );
            break;
        }

        if !settings.page_delay.is_zero() {
            tokio::time::sleep(settings.page_delay).await;
        }
        page = parse_page(client.follow_url(&next, Pace::Burst).await?)?;
    }

    if let Some(max) = max_items {
        items.truncate(max);
    }
    log::debug!("Collected {} item(s) over {} page(s)", items.len(), pages_fetched);
    Ok(items)
}

fn parse_page<T: DeserializeOwned>(value: serde_json::Value) -> Result<PagedResponse<T>, AppError> {
    serde_json::from_value(value).map_err(|e| {
        AppError::MalformedResponse(format!("unexpected list page shape: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientSettings;
    use crate::api::request::RequestOptions;
    use crate::api::test_support::{Scripted, ScriptedTransport};
    use crate::types::AccessToken;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    fn page(ids: std::ops::Range<usize>, next: Option<&str>) -> Scripted {
        let data: Vec<_> = ids.map(|i| json!({ "id": i.to_string() })).collect();
        let mut body = json!({ "data": data });
        if let Some(next) = next {
            body["paging"] = json!({ "next": next, "cursors": { "after": "c" } });
        }
        Scripted::json(200, body)
    }

    fn client(transport: Arc<ScriptedTransport>) -> GraphClient {
        GraphClient::with_transport(transport, ClientSettings::unpaced("https://graph.test/v19.0"))
    }

    fn first() -> GraphRequest {
        let token = AccessToken::new("EAAtesttokenvalue123").unwrap();
        GraphRequest::endpoint("act_1/campaigns", RequestOptions::get(), &token)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_page_without_cursor() {
        let transport = Arc::new(ScriptedTransport::new([page(0..3, None)]));
        let items: Vec<Item> = fetch_all_pages(&client(transport.clone()), first(), None)
            .await
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follows_next_urls_verbatim() {
        let next = "https://graph.test/v19.0/act_1/campaigns?after=c1&access_token=t";
        let transport = Arc::new(ScriptedTransport::new([
            page(0..2, Some(next)),
            page(2..4, None),
        ]));

        let items: Vec<Item> = fetch_all_pages(&client(transport.clone()), first(), None)
            .await
            .unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3"]);
        assert_eq!(transport.requests()[1].url.as_str(), next);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_page_cap_even_if_cursor_never_ends() {
        let next = "https://graph.test/v19.0/forever?after=x";
        let transport = Arc::new(ScriptedTransport::new(
            (0..15).map(|p| page(p * 2..p * 2 + 2, Some(next))),
        ));

        let items: Vec<Item> = fetch_all_pages(&client(transport.clone()), first(), None)
            .await
            .unwrap();

        assert_eq!(transport.calls(), 10);
        assert_eq!(items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_items_truncates() {
        let next = "https://graph.test/v19.0/more?after=x";
        let transport = Arc::new(ScriptedTransport::new([
            page(0..4, Some(next)),
            page(4..8, Some(next)),
            page(8..12, Some(next)),
        ]));

        let items: Vec<Item> = fetch_all_pages(&client(transport.clone()), first(), Some(6))
            .await
            .unwrap();

        assert_eq!(items.len(), 6);
        assert_eq!(items.last().unwrap().id, "5");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_items_above_total_returns_everything() {
        let transport = Arc::new(ScriptedTransport::new([page(0..3, None)]));
        let items: Vec<Item> = fetch_all_pages(&client(transport), first(), Some(50))
            .await
            .unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_max_items_skips_network() {
        let transport = Arc::new(ScriptedTransport::new([]));
        let items: Vec<Item> = fetch_all_pages(&client(transport.clone()), first(), Some(0))
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_on_later_page_propagates() {
        let next = "https://graph.test/v19.0/more?after=x";
        let transport = Arc::new(ScriptedTransport::new([
            page(0..2, Some(next)),
            Scripted::graph_error(190, "expired"),
        ]));

        let err = fetch_all_pages::<Item>(&client(transport.clone()), first(), None)
            .await
            .unwrap_err();
        assert!(err.is_token_error());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuation_pages_wait_for_page_delay() {
        let next = "https://graph.test/v19.0/more?after=x";
        let transport = Arc::new(ScriptedTransport::new([
            page(0..1, Some(next)),
            page(1..2, None),
        ]));
        let mut settings = ClientSettings::unpaced("https://graph.test/v19.0");
        settings.page_delay = std::time::Duration::from_millis(100);
        let client = GraphClient::with_transport(transport.clone(), settings);

        let _: Vec<Item> = fetch_all_pages(&client, first(), None).await.unwrap();

        let times = transport.call_times();
        assert!(times[1] - times[0] >= std::time::Duration::from_millis(100));
    }
}
