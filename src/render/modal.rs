use super::text::{
    escape_html, format_runtime, format_score, format_seasons, year_of, NOT_AVAILABLE,
};
use super::{RenderConfig, LOADING_SPINNER};
use crate::media::MediaDetail;

const CAST_LIMIT: usize = 6;

pub fn render_modal_loading() -> String {
    LOADING_SPINNER.to_string()
}

pub fn render_modal_error() -> String {
    r#"<div class="error"><p>Erro ao carregar detalhes</p><button class="retry-btn">Tentar novamente</button></div>"#
        .to_string()
}

/// Modal body for a detail record joined with its cast.
pub fn render_modal(detail: &MediaDetail, config: &RenderConfig) -> String {
    let d = &detail.details;
    let title = escape_html(detail.display_title());
    let poster = escape_html(&config.poster_url(d.poster_path.as_deref()));
    let year = escape_html(&year_of(detail.date()));
    let length = if detail.is_movie() {
        format_runtime(d.runtime)
    } else {
        format_seasons(d.number_of_seasons)
    }
    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let rating = format_score(d.vote_average).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let overview = d
        .overview
        .as_deref()
        .filter(|o| !o.trim().is_empty())
        .map(escape_html)
        .unwrap_or_else(|| "Sinopse não disponível".to_string());

    format!(
        concat!(
            r#"<div class="modal-poster"><img src="{poster}" alt="{title}"></div>"#,
            r#"<div class="modal-info">"#,
            r#"<h2 id="modal-title">{title}</h2>"#,
            r#"<div class="meta-info">"#,
            r#"<span id="modal-year">{year}</span>"#,
            r#"<span id="modal-runtime">{length}</span>"#,
            r#"<span id="modal-rating">{rating}</span>"#,
            r#"</div>"#,
            r#"<p id="modal-overview">{overview}</p>"#,
            r#"<div class="cast-container"><h3>Elenco Principal</h3>{cast}</div>"#,
            r#"<p id="modal-id">ID TMDB: {id}</p>"#,
            r#"</div>"#
        ),
        poster = poster,
        title = title,
        year = year,
        length = length,
        rating = rating,
        overview = overview,
        cast = render_cast(detail),
        id = d.id.map(|id| id.to_string()).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    )
}

fn render_cast(detail: &MediaDetail) -> String {
    if detail.cast.is_empty() {
        return "<p>Informações de elenco não disponíveis</p>".to_string();
    }
    detail
        .cast
        .iter()
        .take(CAST_LIMIT)
        .map(|actor| {
            let character = actor
                .character
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("Personagem");
            format!(
                r#"<div class="actor"><p><strong>{}</strong></p><p>{}</p></div>"#,
                escape_html(actor.name.as_deref().unwrap_or("")),
                escape_html(character)
            )
        })
        .collect()
}
