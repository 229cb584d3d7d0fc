use super::text::{escape_html, format_score, year_of, NO_RATING};
use super::{RenderConfig, NO_RESULTS};
use crate::media::{MediaSummary, MediaType};

/// What clicking a card opens. Cards for people (multi search) or without an id have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTarget {
    pub id: u64,
    pub media_type: MediaType,
}

/// Renders the results grid and returns, per card, the detail view it opens.
///
/// `fallback` is the media type of the request that produced `items`; it is
/// used for records that do not carry their own `media_type`.
pub fn render_card_list(
    items: &[MediaSummary],
    fallback: MediaType,
    config: &RenderConfig,
) -> (String, Vec<Option<CardTarget>>) {
    if items.is_empty() {
        return (NO_RESULTS.to_string(), Vec::new());
    }

    let mut html = String::new();
    let mut targets = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let target = item
            .tmdb_id()
            .zip(item.kind(fallback))
            .map(|(id, media_type)| CardTarget { id, media_type });
        html.push_str(&render_card(index, item, target, config));
        targets.push(target);
    }
    (html, targets)
}

fn render_card(
    index: usize,
    item: &MediaSummary,
    target: Option<CardTarget>,
    config: &RenderConfig,
) -> String {
    let title = escape_html(item.display_title());
    let poster = escape_html(&config.poster_url(item.poster_path.as_deref()));
    let year = escape_html(&year_of(item.date()));
    let rating = format_score(item.vote_average).unwrap_or_else(|| NO_RATING.to_string());
    let data = match target {
        Some(t) => format!(
            r#" data-index="{index}" data-id="{}" data-type="{}""#,
            t.id, t.media_type
        ),
        None => format!(r#" data-index="{index}""#),
    };
    format!(
        r#"<div class="media-card"{data}><img src="{poster}" alt="{title}" loading="lazy"><div class="media-info"><h3>{title}</h3><p>{year}</p><p>{rating}</p></div></div>"#
    )
}
