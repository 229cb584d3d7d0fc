//! Rendering client: page state, user actions, and the proxy it talks to.

mod api;
mod page;

pub use api::{HttpMediaApi, MediaApi};
pub use page::{ClickTarget, ModalState, Page, SearchControl, SearchRequest, UiState};
