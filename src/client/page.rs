use anyhow::Result;
use tracing::{debug, error};

use super::api::MediaApi;
use crate::media::{MediaDetail, MediaSummary, MediaType, SearchResults, SearchType};
use crate::render::{
    self, render_card_list, render_modal, render_modal_error, render_modal_loading, CardTarget,
    RenderConfig,
};

const TRENDING_FAILED: &str = "Falha ao carregar conteúdos em alta. Tente novamente mais tarde.";
const SEARCH_FAILED: &str = "Falha na busca. Verifique sua conexão e tente novamente.";
const RECOMMENDATIONS_FAILED: &str = "Falha ao carregar recomendações. Tente novamente mais tarde.";
const EMPTY_QUERY: &str = "Por favor, digite um termo para busca";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    Enabled,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Loading(CardTarget),
    Populated { target: CardTarget, body: String },
    Failed(CardTarget),
}

/// Where a click inside the modal layer landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed backdrop itself, outside the content box.
    Overlay,
    ModalContent,
    CloseButton,
    RetryButton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub kind: SearchType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// Value of the media-type selector.
    pub media_type: MediaType,
    /// Type of the request that produced the cards currently shown.
    pub last_search_type: MediaType,
    /// Markup of the results region.
    pub results: String,
    /// Click target per rendered card, in display order.
    pub cards: Vec<Option<CardTarget>>,
    pub search: SearchControl,
    pub modal: ModalState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            media_type: MediaType::Movie,
            last_search_type: MediaType::Movie,
            results: String::new(),
            cards: Vec::new(),
            search: SearchControl::Enabled,
            modal: ModalState::Closed,
        }
    }
}

/// Page state container. Every user action is a transition on [`UiState`];
/// request-bound actions are split into `begin_*`/`finish_*` halves around the fetch.
pub struct Page<A> {
    api: A,
    state: UiState,
    render: RenderConfig,
}

impl<A: MediaApi> Page<A> {
    pub fn new(api: A) -> Self {
        Self::with_render_config(api, RenderConfig::default())
    }

    pub fn with_render_config(api: A, render: RenderConfig) -> Self {
        Self {
            api,
            state: UiState::default(),
            render,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn modal_open(&self) -> bool {
        self.state.modal != ModalState::Closed
    }

    /// Markup of the modal body, `None` while closed.
    pub fn modal_body(&self) -> Option<String> {
        match &self.state.modal {
            ModalState::Closed => None,
            ModalState::Loading(_) => Some(render_modal_loading()),
            ModalState::Populated { body, .. } => Some(body.clone()),
            ModalState::Failed(_) => Some(render_modal_error()),
        }
    }

    /// Initial load, and every media-type change.
    pub async fn load_trending(&mut self) {
        let media = self.state.media_type;
        self.state.results = render::LOADING_SPINNER.to_string();
        let result = self.api.trending(media).await;
        self.show_results(result, media, TRENDING_FAILED);
    }

    pub async fn select_media_type(&mut self, media: MediaType) {
        self.state.media_type = media;
        self.load_trending().await;
    }

    /// Validates the query and enters the busy state. `None` means no request is to be made.
    pub fn begin_search(&mut self, query: &str) -> Option<SearchRequest> {
        let query = query.trim();
        if query.is_empty() {
            self.show_error(EMPTY_QUERY);
            return None;
        }
        self.state.last_search_type = self.state.media_type;
        self.state.search = SearchControl::Busy;
        self.state.results = render::LOADING_SPINNER.to_string();
        Some(SearchRequest {
            query: query.to_string(),
            kind: self.state.media_type.into(),
        })
    }

    pub fn finish_search(&mut self, result: Result<SearchResults>) {
        let fallback = self.state.last_search_type;
        self.show_results(result, fallback, SEARCH_FAILED);
        self.state.search = SearchControl::Enabled;
    }

    /// Button click or Enter in the search box.
    pub async fn search(&mut self, query: &str) {
        let Some(request) = self.begin_search(query) else {
            return;
        };
        debug!("Searching {} for '{}'", request.kind, request.query);
        let result = self.api.search(&request.query, request.kind).await;
        self.finish_search(result);
    }

    /// Replaces the results with titles the provider recommends for `target`.
    pub async fn show_recommendations(&mut self, target: CardTarget) {
        self.state.results = render::LOADING_SPINNER.to_string();
        let result = self
            .api
            .recommendations(target.id, target.media_type)
            .await;
        self.show_results(result, target.media_type, RECOMMENDATIONS_FAILED);
    }

    /// Opens the detail view for the card at `index`. Returns false for cards without a target.
    pub async fn click_card(&mut self, index: usize) -> bool {
        match self.state.cards.get(index).copied().flatten() {
            Some(target) => {
                self.open_details(target).await;
                true
            }
            None => false,
        }
    }

    pub fn begin_details(&mut self, target: CardTarget) {
        self.state.modal = ModalState::Loading(target);
    }

    /// Applies a finished detail fetch. Ignored unless the modal still waits for `target`.
    pub fn finish_details(&mut self, target: CardTarget, result: Result<MediaDetail>) {
        if self.state.modal != ModalState::Loading(target) {
            debug!("Dropping stale detail response for {}", target.id);
            return;
        }
        self.state.modal = match result {
            Ok(detail) => ModalState::Populated {
                target,
                body: render_modal(&detail, &self.render),
            },
            Err(e) => {
                error!("Failed to load details for {} {}: {:#}", target.media_type, target.id, e);
                ModalState::Failed(target)
            }
        };
    }

    /// Shows the modal at once, then fetches details and cast together; both must succeed.
    pub async fn open_details(&mut self, target: CardTarget) {
        self.begin_details(target);
        let joined = tokio::try_join!(
            self.api.details(target.id, target.media_type),
            self.api.credits(target.id, target.media_type),
        )
        .map(|(details, credits)| MediaDetail::join(details, credits));
        self.finish_details(target, joined);
    }

    pub async fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Overlay | ClickTarget::CloseButton => self.close_modal(),
            ClickTarget::ModalContent => {}
            ClickTarget::RetryButton => {
                if let ModalState::Failed(failed) = self.state.modal {
                    self.open_details(failed).await;
                }
            }
        }
    }

    pub fn close_modal(&mut self) {
        self.state.modal = ModalState::Closed;
    }

    fn show_results(&mut self, result: Result<SearchResults>, fallback: MediaType, failure: &str) {
        match result {
            Ok(page) => {
                let items: Vec<MediaSummary> = page.into_items();
                let (html, cards) = render_card_list(&items, fallback, &self.render);
                self.state.last_search_type = fallback;
                self.state.results = html;
                self.state.cards = cards;
            }
            Err(e) => {
                error!("{}: {:#}", failure, e);
                self.show_error(failure);
            }
        }
    }

    fn show_error(&mut self, message: &str) {
        self.state.results = render::render_error(message);
        self.state.cards.clear();
    }
}
