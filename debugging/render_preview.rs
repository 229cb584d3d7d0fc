//! Drive the rendering client against a running proxy and print the rendered regions.
//! Usage:
//!   cargo run --bin render_preview -- trending <movie|tv>
//!   cargo run --bin render_preview -- search <movie|tv> <query...>
//!   cargo run --bin render_preview -- details <movie|tv> <tmdb_id>
//! Reads PROXY_BASE_URL (default http://127.0.0.1:3000/api; .env supported).

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use telaflix::client::{HttpMediaApi, Page};
use telaflix::media::MediaType;
use telaflix::render::CardTarget;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: render_preview <trending|search|details> <movie|tv> [query|id]");
    }
    let media: MediaType = args[1].parse()?;

    let base_url =
        env::var("PROXY_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000/api".to_string());
    let mut page = Page::new(HttpMediaApi::new(base_url)?);
    page.select_media_type(media).await;

    match args[0].as_str() {
        "trending" => {}
        "search" => {
            let query = args[2..].join(" ");
            page.search(&query).await;
        }
        "details" => {
            let id: u64 = args
                .get(2)
                .context("details needs a TMDB id")?
                .parse()
                .context("TMDB id must be numeric")?;
            page.open_details(CardTarget {
                id,
                media_type: media,
            })
            .await;
        }
        other => bail!("unknown action '{}'", other),
    }

    let state = page.state();
    println!("== results ({} cards)", state.cards.len());
    println!("{}", state.results);
    if let Some(body) = page.modal_body() {
        println!("== modal");
        println!("{}", body);
    }
    Ok(())
}
