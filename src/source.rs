//! Data fetching: PokeAPI access behind the [`PokeSource`] seam, the
//! page fan-out, and the background task the UI sends page requests to.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::config::Config;
use crate::net::send_with_backoff;
use crate::pagination::Pagination;
use crate::types::{
    AppEvent, ListPage, NamedResource, PageRequest, Pokemon, PokemonDetails, TypeList, TypeOption,
};

#[async_trait]
pub trait PokeSource: Send + Sync {
    async fn list(&self, offset: u64, limit: u32) -> Result<ListPage>;
    async fn details(&self, url: &str) -> Result<PokemonDetails>;
    async fn types(&self) -> Result<Vec<NamedResource>>;
}

/// PokeAPI over HTTP. Cloning shares the connection pool.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
    retries: u8,
}

impl HttpSource {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(cfg.detail_concurrency)
            .tcp_nodelay(true)
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            timeout: Duration::from_millis(cfg.http_timeout_ms),
            retries: cfg.http_retries,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, rb: reqwest::RequestBuilder, label: &str) -> Result<T> {
        let response = send_with_backoff(rb.timeout(self.timeout), label, self.retries).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("PokeAPI error ({status}) for {label}: {error_text}"));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("Failed to parse {label} response: {e}"))
    }
}

#[async_trait]
impl PokeSource for HttpSource {
    async fn list(&self, offset: u64, limit: u32) -> Result<ListPage> {
        log::debug!("[source] list offset={offset} limit={limit}");
        let rb = self
            .client
            .get(format!("{}/pokemon", self.api_url))
            .query(&[("limit", limit as u64), ("offset", offset)]);
        self.get_json(rb, "pokemon list").await
    }

    async fn details(&self, url: &str) -> Result<PokemonDetails> {
        self.get_json(self.client.get(url), url).await
    }

    async fn types(&self) -> Result<Vec<NamedResource>> {
        let rb = self
            .client
            .get(format!("{}/type", self.api_url))
            .query(&[("limit", 100u32)]);
        let list: TypeList = self.get_json(rb, "type list").await?;
        Ok(list.results)
    }
}

/// One fetched page: the rows plus the server-side item count.
#[derive(Clone, Debug, PartialEq)]
pub struct PageData {
    pub total: u64,
    pub rows: Vec<Pokemon>,
}

/// Fetch a list page, then every row's details with at most `concurrency`
/// requests in flight. Rows keep list order. Any failed detail fails the page.
pub async fn fetch_page<S: PokeSource + ?Sized>(
    source: &S,
    pagination: Pagination,
    concurrency: usize,
) -> Result<PageData> {
    let offset = pagination.offset();
    let list = source.list(offset, pagination.per_page()).await?;
    log::info!(
        "[source] page {} lists {} entries (count={})",
        pagination.page(),
        list.results.len(),
        list.count
    );

    let rows: Vec<Pokemon> = stream::iter(list.results.into_iter().enumerate())
        .map(|(index, item)| async move {
            let details = source
                .details(&item.url)
                .await
                .with_context(|| format!("Failed to fetch details for {}", item.name))?;
            let id = (offset + index as u64 + 1) as u32;
            Ok::<_, anyhow::Error>(details.into_pokemon(id, item.name))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(PageData {
        total: list.count,
        rows,
    })
}

/// Type names for the multi-select, labels capitalized, in API order.
pub async fn fetch_type_options<S: PokeSource + ?Sized>(source: &S) -> Result<Vec<TypeOption>> {
    let types = source.types().await?;
    Ok(types.into_iter().map(|t| TypeOption::new(t.name)).collect())
}

/// Fetch type options once and report the outcome as an event.
pub async fn load_types<S: PokeSource + ?Sized>(source: &S, events: &UnboundedSender<AppEvent>) {
    let ev = match fetch_type_options(source).await {
        Ok(options) => {
            log::info!("[source] loaded {} type options", options.len());
            AppEvent::TypesLoaded(options)
        }
        Err(e) => {
            log::error!("[source] type list failed: {e:#}");
            AppEvent::TypesFailed(format!("{e:#}"))
        }
    };
    let _ = events.send(ev);
}

/// Background task serving page requests from the UI.
///
/// Requests queued while a fetch is running collapse to the newest one.
/// Returns when either channel closes.
pub async fn run_fetcher<S: PokeSource>(
    source: S,
    concurrency: usize,
    mut requests: UnboundedReceiver<PageRequest>,
    events: UnboundedSender<AppEvent>,
) -> Result<()> {
    log::info!("[fetcher] started (concurrency={concurrency})");

    while let Some(mut request) = requests.recv().await {
        while let Ok(newer) = requests.try_recv() {
            log::debug!("[fetcher] skipping superseded request {request:?}");
            request = newer;
        }

        let pagination = Pagination::new(request.page, request.per_page);
        let ev = match fetch_page(&source, pagination, concurrency).await {
            Ok(data) => AppEvent::PageLoaded {
                request,
                total: data.total,
                rows: data.rows,
            },
            Err(e) => {
                log::error!("[fetcher] page {} failed: {e:#}", request.page);
                AppEvent::PageFailed {
                    request,
                    error: format!("{e:#}"),
                }
            }
        };

        if events.send(ev).is_err() {
            break;
        }
    }

    log::info!("[fetcher] shutting down");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;
    use crate::net::test_server::serve;
    use std::sync::atomic::Ordering;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn page_rows_keep_list_order_and_position_ids() {
        let src = FakeSource::new(35);
        let page = fetch_page(&src, Pagination::new(2, 10), 4).await.unwrap();

        assert_eq!(page.total, 35);
        let ids: Vec<u32> = page.rows.iter().map(|p| p.id).collect();
        assert_eq!(ids, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.rows[0].name, "mon-11");
        assert_eq!(page.rows[0].image.as_deref(), Some("https://img/11.png"));
        assert_eq!(page.rows[0].types, vec!["fire"]);
    }

    #[tokio::test]
    async fn detail_requests_respect_concurrency() {
        let src = FakeSource::new(20);
        fetch_page(&src, Pagination::new(1, 20), 3).await.unwrap();
        let max = src.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "max in flight was {max}");
        assert!(max >= 2, "details were never fetched in parallel");
    }

    #[tokio::test]
    async fn last_page_may_be_short() {
        let src = FakeSource::new(25);
        let page = fetch_page(&src, Pagination::new(3, 10), 5).await.unwrap();
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.rows.last().map(|p| p.id), Some(25));
    }

    #[tokio::test]
    async fn one_failed_detail_fails_the_page() {
        let mut src = FakeSource::new(10);
        src.failing.insert("fake://pokemon/4".into());
        let err = fetch_page(&src, Pagination::new(1, 10), 4).await.unwrap_err();
        assert!(format!("{err:#}").contains("mon-4"));
    }

    #[tokio::test]
    async fn type_options_are_capitalized() {
        let src = FakeSource::new(0);
        let opts = fetch_type_options(&src).await.unwrap();
        assert_eq!(opts[1], TypeOption { value: "fire".into(), label: "Fire".into() });
    }

    #[tokio::test]
    async fn fetcher_answers_requests_and_stops_when_closed() {
        let (req_tx, req_rx) = unbounded_channel();
        let (ev_tx, mut ev_rx) = unbounded_channel();
        let request = PageRequest { page: 1, per_page: 5 };
        req_tx.send(request).unwrap();
        drop(req_tx);

        run_fetcher(FakeSource::new(12), 2, req_rx, ev_tx).await.unwrap();

        match ev_rx.recv().await {
            Some(AppEvent::PageLoaded { request: r, total, rows }) => {
                assert_eq!(r, request);
                assert_eq!(total, 12);
                assert_eq!(rows.len(), 5);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(ev_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn fetcher_collapses_queued_requests() {
        let (req_tx, req_rx) = unbounded_channel();
        let (ev_tx, mut ev_rx) = unbounded_channel();
        for page in 1..=3 {
            req_tx.send(PageRequest { page, per_page: 5 }).unwrap();
        }
        drop(req_tx);

        let src = FakeSource::new(30);
        run_fetcher(src, 2, req_rx, ev_tx).await.unwrap();

        let mut pages = Vec::new();
        while let Some(ev) = ev_rx.recv().await {
            if let AppEvent::PageLoaded { request, .. } = ev {
                pages.push(request.page);
            }
        }
        assert_eq!(pages, vec![3]);
    }

    #[tokio::test]
    async fn fetcher_reports_failures_as_events() {
        let (req_tx, req_rx) = unbounded_channel();
        let (ev_tx, mut ev_rx) = unbounded_channel();
        let mut src = FakeSource::new(5);
        src.failing.insert("fake://pokemon/1".into());
        req_tx.send(PageRequest { page: 1, per_page: 5 }).unwrap();
        drop(req_tx);

        run_fetcher(src, 2, req_rx, ev_tx).await.unwrap();
        assert!(matches!(ev_rx.recv().await, Some(AppEvent::PageFailed { .. })));
    }

    fn http_source(url: String, retries: u8) -> HttpSource {
        let mut cfg = crate::app::test_support::config();
        cfg.api_url = url;
        cfg.http_retries = retries;
        HttpSource::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let (url, _) = serve(vec![(500, "database unavailable")]).await;
        let src = http_source(url, 0);

        let err = src.list(0, 10).await.unwrap_err().to_string();
        assert!(err.contains("500"), "{err}");
        assert!(err.contains("database unavailable"), "{err}");
    }

    #[tokio::test]
    async fn http_list_recovers_after_rate_limit() {
        let body = r#"{"count":1302,"results":[{"name":"bulbasaur","url":"https://pokeapi.co/api/v2/pokemon/1/"}]}"#;
        let (url, hits) = serve(vec![(429, "{}"), (200, body)]).await;
        let src = http_source(url, 2);

        let page = src.list(0, 1).await.unwrap();
        assert_eq!(page.count, 1302);
        assert_eq!(page.results[0].name, "bulbasaur");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn http_bad_json_is_a_parse_error() {
        let (url, _) = serve(vec![(200, "not json")]).await;
        let src = http_source(url, 0);

        let err = src.types().await.unwrap_err().to_string();
        assert!(err.contains("Failed to parse type list"), "{err}");
    }
}
