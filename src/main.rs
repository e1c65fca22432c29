mod demo;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;

use entropy_core::config::CoreConfig;
use entropy_core::locator::ServiceLocator;
use entropy_core::logging::init_tracing;
use entropy_core::net::{HttpClient, ReqwestClient};
use entropy_core::udf::{
    AnyViewModel, AsyncInteractor, ComposedViewModel, EventActionMap, UiContext, ViewModel,
};

use demo::catalog::{MovieCatalog, StaticCatalog, TmdbCatalog};
use demo::search::{SearchEvent, SearchEventMap, SearchHandler, SearchState, SearchView, SearchViewReducer};

/// Run movie searches through the view model pipeline and print each view state.
#[derive(Parser, Debug)]
#[command(name = "entropy-core", version)]
struct Cli {
    /// Config file (default: <config dir>/entropy-core/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// TMDB API key. Searches a built-in catalog when neither this nor
    /// `network.api_key` is set.
    #[arg(long)]
    api_key: Option<String>,

    /// Queries to submit, in order
    #[arg(required = true)]
    queries: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CoreConfig::load_from(path),
        None => CoreConfig::load(),
    }
    .context("failed to load configuration")?;
    init_tracing(&config.logging);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build Tokio runtime")?;
    runtime.block_on(run(cli, config))
}

fn register_services(
    locator: &ServiceLocator,
    config: &CoreConfig,
    api_key: Option<String>,
) -> Result<()> {
    let http: Arc<dyn HttpClient> = Arc::new(
        ReqwestClient::from_config(&config.network).context("failed to build HTTP client")?,
    );
    locator.register_instance(http);

    let catalog: Arc<dyn MovieCatalog> = match api_key.or_else(|| config.network.api_key.clone())
    {
        Some(key) => {
            let http = locator.retrieve::<Arc<dyn HttpClient>>()?;
            Arc::new(TmdbCatalog::new(http, &config.network, key))
        }
        None => {
            tracing::info!("No API key configured, using built-in catalog");
            Arc::new(StaticCatalog::default())
        }
    };
    locator.register_instance(catalog);

    for service in locator.registrations() {
        tracing::debug!(service = ?service, "Service registered");
    }
    Ok(())
}

async fn run(cli: Cli, config: CoreConfig) -> Result<()> {
    let locator = ServiceLocator::new();
    register_services(&locator, &config, cli.api_key)?;

    let ui = UiContext::new();
    let settle = Duration::from_secs(u64::from(config.network.timeout_seconds) + 1);

    ui.run_until(async {
        let catalog = locator.retrieve::<Arc<dyn MovieCatalog>>()?;
        let interactor = Arc::new(AsyncInteractor::spawn(
            SearchHandler { catalog },
            SearchState::default(),
        ));
        let view_model = AnyViewModel::new(ComposedViewModel::with_policy(
            &ui,
            Arc::clone(&interactor),
            SearchEventMap,
            SearchViewReducer {
                image_base_url: config.network.image_base_url.clone(),
            },
            config.view_model.notify,
        ));

        let (updates, mut received) = mpsc::unbounded_channel();
        let _observation = view_model.observe(Box::new(move |view: &SearchView| {
            let _ = updates.send(view.clone());
        }));
        render(&view_model.view_state());

        for query in cli.queries {
            submit(&view_model, &mut received, query, settle, render).await;
        }

        interactor.shutdown();
        Ok::<(), anyhow::Error>(())
    })
    .await
}

/// Submit `query` and pass each view update to `on_view` until the view
/// settles or no update arrives within `settle`.
///
/// Queries the event map drops never reach the interactor and produce no
/// update, so they return immediately.
async fn submit<V>(
    view_model: &V,
    updates: &mut mpsc::UnboundedReceiver<SearchView>,
    query: String,
    settle: Duration,
    mut on_view: impl FnMut(&SearchView),
) where
    V: ViewModel<State = SearchView, Event = SearchEvent>,
{
    let event = SearchEvent::Submit(query.clone());
    if SearchEventMap.map(&event).is_none() {
        tracing::warn!(query = %query, "Skipping blank query");
        return;
    }
    view_model.handle(event);

    loop {
        match tokio::time::timeout(settle, updates.recv()).await {
            Ok(Some(view)) => {
                on_view(&view);
                if view.is_settled() {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(query = %query, "No view update for query");
                break;
            }
        }
    }
}

fn render(view: &SearchView) {
    match view {
        SearchView::Idle => println!("Type a query to search movies"),
        SearchView::Loading(query) => println!("Searching for \"{}\"...", query),
        SearchView::Results(lines) => {
            for line in lines {
                println!("  {}", line);
            }
        }
        SearchView::Empty(query) => println!("No movies match \"{}\"", query),
        SearchView::Failed(message) => println!("Search failed: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_query_returns_without_waiting() {
        let ui = UiContext::new();
        ui.run_until(async {
            let catalog: Arc<dyn MovieCatalog> = Arc::new(StaticCatalog::default());
            let interactor = Arc::new(AsyncInteractor::spawn(
                SearchHandler { catalog },
                SearchState::default(),
            ));
            let view_model = ComposedViewModel::new(
                &ui,
                interactor,
                SearchEventMap,
                SearchViewReducer {
                    image_base_url: String::new(),
                },
            );
            let (updates, mut received) = mpsc::unbounded_channel();
            let _observation = view_model.observe(Box::new(move |view: &SearchView| {
                let _ = updates.send(view.clone());
            }));

            let settle = Duration::from_secs(30);
            let mut seen = Vec::new();
            tokio::time::timeout(
                Duration::from_secs(1),
                submit(&view_model, &mut received, "   ".to_string(), settle, |v| {
                    seen.push(v.clone())
                }),
            )
            .await
            .unwrap();
            assert!(seen.is_empty());

            tokio::time::timeout(
                Duration::from_secs(1),
                submit(&view_model, &mut received, "dune".to_string(), settle, |v| {
                    seen.push(v.clone())
                }),
            )
            .await
            .unwrap();
            assert_eq!(seen.first(), Some(&SearchView::Loading("dune".to_string())));
            assert!(matches!(seen.last(), Some(SearchView::Results(lines)) if lines.len() == 2));
        })
        .await;
    }
}
