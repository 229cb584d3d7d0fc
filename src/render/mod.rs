//! Markup for the results grid and the detail modal.

mod card;
mod modal;
mod text;

pub use card::{render_card_list, CardTarget};
pub use modal::{render_modal, render_modal_error, render_modal_loading};

pub(crate) use text::escape_html;

pub const IMG_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const PLACEHOLDER_IMG: &str = "placeholder.jpg";

pub(crate) const LOADING_SPINNER: &str = r#"<div class="loading-spinner"></div>"#;
pub(crate) const NO_RESULTS: &str = r#"<p class="no-results">Nenhum resultado encontrado</p>"#;

/// Where poster images come from.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_base: String,
    pub placeholder: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_base: IMG_BASE.to_string(),
            placeholder: PLACEHOLDER_IMG.to_string(),
        }
    }
}

impl RenderConfig {
    pub(crate) fn poster_url(&self, poster_path: Option<&str>) -> String {
        match poster_path.filter(|p| !p.is_empty()) {
            Some(path) => format!("{}{}", self.image_base, path),
            None => self.placeholder.clone(),
        }
    }
}

pub(crate) fn render_error(message: &str) -> String {
    format!(r#"<div class="error">{}</div>"#, escape_html(message))
}
