use std::sync::Arc;

use async_trait::async_trait;

use entropy_core::net::ApiRequestError;
use entropy_core::udf::{
    ActionHandler, DomainAction, DomainState, EventActionMap, StateHandle, ViewEvent, ViewState,
    ViewStateReducer,
};

use super::catalog::{Movie, MovieCatalog};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub query: String,
    pub loading: bool,
    pub results: Vec<Movie>,
    pub error: Option<String>,
}

impl DomainState for SearchState {}

#[derive(Debug)]
pub enum SearchAction {
    Search(String),
}

impl DomainAction for SearchAction {}

#[derive(Debug)]
pub enum SearchEvent {
    Submit(String),
}

impl ViewEvent for SearchEvent {}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchView {
    Idle,
    Loading(String),
    Results(Vec<String>),
    Empty(String),
    Failed(String),
}

impl ViewState for SearchView {}

impl SearchView {
    /// Whether the view has stopped changing for the last query.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SearchView::Loading(_))
    }
}

/// Submits trimmed, non-empty queries.
pub struct SearchEventMap;

impl EventActionMap for SearchEventMap {
    type Event = SearchEvent;
    type Action = SearchAction;

    fn map(&self, event: &SearchEvent) -> Option<SearchAction> {
        match event {
            SearchEvent::Submit(query) => {
                let query = query.trim();
                (!query.is_empty()).then(|| SearchAction::Search(query.to_string()))
            }
        }
    }
}

pub struct SearchViewReducer {
    pub image_base_url: String,
}

impl ViewStateReducer for SearchViewReducer {
    type Domain = SearchState;
    type View = SearchView;

    fn reduce(&self, state: &SearchState) -> SearchView {
        if state.loading {
            return SearchView::Loading(state.query.clone());
        }
        if let Some(error) = &state.error {
            return SearchView::Failed(error.clone());
        }
        if state.query.is_empty() {
            return SearchView::Idle;
        }
        if state.results.is_empty() {
            return SearchView::Empty(state.query.clone());
        }
        SearchView::Results(
            state
                .results
                .iter()
                .map(|movie| {
                    let year = movie
                        .release_date
                        .as_deref()
                        .and_then(|date| date.get(..4))
                        .unwrap_or("----");
                    match &movie.poster_path {
                        Some(poster) => {
                            format!("{} ({}) {}{}", movie.title, year, self.image_base_url, poster)
                        }
                        None => format!("{} ({})", movie.title, year),
                    }
                })
                .collect(),
        )
    }
}

pub struct SearchHandler {
    pub catalog: Arc<dyn MovieCatalog>,
}

#[async_trait]
impl ActionHandler for SearchHandler {
    type State = SearchState;
    type Action = SearchAction;
    type Error = ApiRequestError;

    async fn handle(
        &self,
        action: SearchAction,
        state: &StateHandle<'_, SearchState>,
    ) -> Result<(), ApiRequestError> {
        match action {
            SearchAction::Search(query) => {
                state.update(|s| {
                    s.query = query.clone();
                    s.loading = true;
                    s.error = None;
                });
                let results = self.catalog.search(&query).await?;
                state.update(|s| {
                    s.loading = false;
                    s.results = results;
                });
                Ok(())
            }
        }
    }

    fn recover(&self, state: &SearchState, error: &ApiRequestError) -> Option<SearchState> {
        Some(SearchState {
            query: state.query.clone(),
            loading: false,
            results: Vec::new(),
            error: Some(error.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, date: Option<&str>, poster: Option<&str>) -> Movie {
        Movie {
            title: title.to_string(),
            release_date: date.map(str::to_string),
            poster_path: poster.map(str::to_string),
        }
    }

    #[test]
    fn test_blank_query_maps_to_no_action() {
        assert!(SearchEventMap.map(&SearchEvent::Submit("   ".into())).is_none());
        assert!(matches!(
            SearchEventMap.map(&SearchEvent::Submit(" dune ".into())),
            Some(SearchAction::Search(q)) if q == "dune"
        ));
    }

    #[test]
    fn test_reducer_formats_results() {
        let reducer = SearchViewReducer {
            image_base_url: "https://img/".to_string(),
        };
        let state = SearchState {
            query: "dune".to_string(),
            results: vec![
                movie("Dune", Some("2021-09-15"), Some("p.jpg")),
                movie("Dune (1984)", None, None),
            ],
            ..SearchState::default()
        };
        assert_eq!(
            reducer.reduce(&state),
            SearchView::Results(vec![
                "Dune (2021) https://img/p.jpg".to_string(),
                "Dune (1984) (----)".to_string(),
            ])
        );
        assert_eq!(reducer.reduce(&SearchState::default()), SearchView::Idle);
    }
}
