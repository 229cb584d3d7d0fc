//! Fixed-window request counting per caller address.
//!
//! Every caller gets `max` requests per window; the window boundaries are
//! shared by all callers (`now / window_secs`). Decisions carry what the
//! `RateLimit-*` headers report.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::error_response;

const DEFAULT_MAX_CALLERS: usize = 10_000;

#[derive(Clone, Debug)]
pub struct WindowCounter {
    pub window: u64,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window ends.
    pub reset_secs: u64,
}

#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window_secs: u64,
    max_callers: usize,
    counters: Mutex<HashMap<String, WindowCounter>>,
}

impl RateLimiter {
    pub fn new(max: u32, window_secs: u64) -> Self {
        Self {
            max,
            window_secs: window_secs.max(1),
            max_callers: DEFAULT_MAX_CALLERS,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Upper bound on tracked callers; the least active one is evicted past it.
    pub fn with_max_callers(mut self, max_callers: usize) -> Self {
        self.max_callers = max_callers.max(1);
        self
    }

    pub async fn check(&self, caller: &str) -> RateDecision {
        self.check_at(caller, Utc::now().timestamp().max(0) as u64)
            .await
    }

    pub async fn check_at(&self, caller: &str, now_secs: u64) -> RateDecision {
        let window = now_secs / self.window_secs;
        let reset_secs = (window + 1) * self.window_secs - now_secs;
        let mut guards = self.counters.lock().await;
        if !guards.contains_key(caller) && guards.len() >= self.max_callers {
            guards.retain(|_, v| v.window == window);
            if guards.len() >= self.max_callers {
                let quietest = guards
                    .iter()
                    .min_by_key(|(_, v)| v.count)
                    .map(|(k, _)| k.clone());
                if let Some(key) = quietest {
                    guards.remove(&key);
                }
            }
        }
        let entry = guards
            .entry(caller.to_string())
            .or_insert(WindowCounter { window, count: 0 });
        if entry.window != window {
            entry.window = window;
            entry.count = 0;
        }
        let allowed = entry.count < self.max;
        if allowed {
            entry.count += 1;
        }
        RateDecision {
            allowed,
            limit: self.max,
            remaining: self.max.saturating_sub(entry.count),
            reset_secs,
        }
    }
}

/// Rejects callers over their quota with 429 and stamps `RateLimit-*` headers on every response.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let caller = caller_key(&request);
    let decision = limiter.check(&caller).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!("Rate limit exceeded for {}", caller);
        let mut res = error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Muitas requisições, tente novamente mais tarde",
        );
        res.headers_mut()
            .insert("retry-after", HeaderValue::from(decision.reset_secs));
        res
    };
    stamp_headers(response.headers_mut(), &decision);
    response
}

fn stamp_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert("ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(decision.reset_secs));
}

/// Proxy headers first, then the socket peer.
fn caller_key(request: &Request<Body>) -> String {
    extract_ip(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn extract_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cf-connecting-ip")
        .or_else(|| headers.get("x-real-ip"))
        .or_else(|| headers.get("x-forwarded-for"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty())
}
