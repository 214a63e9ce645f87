//! HTTP handler functions for the pacify map API.

use actix_web::{HttpResponse, web};
use pacify_render::window_features as render_window;
use pacify_server_models::{ApiError, ApiHealth, ApiMeta, ApiWindow};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/meta`
pub async fn meta(state: web::Data<AppState>) -> HttpResponse {
    let store = &state.store;
    HttpResponse::Ok().json(ApiMeta {
        window_count: store.window_index().size(),
        feature_count: store.feature_count(),
        grid: store.grid().map(ToString::to_string),
        resolution: store.resolution(),
    })
}

/// `GET /api/windows`
///
/// Lists the windows in slider order with their totals.
pub async fn windows(state: web::Data<AppState>) -> HttpResponse {
    let store = &state.store;
    let windows: Vec<ApiWindow> = store
        .window_index()
        .iter()
        .enumerate()
        .map(|(index, window)| ApiWindow {
            index,
            start: window.start,
            end: window.end,
            label: window.to_string(),
            total: store.total_at(index),
            feature_count: store.features_at(index).len(),
        })
        .collect();

    HttpResponse::Ok().json(windows)
}

/// `GET /api/windows/{index}/features`
///
/// Returns the `GeoJSON` the renderer writes into both map sources for the
/// window.
pub async fn window_features(
    state: web::Data<AppState>,
    path: web::Path<usize>,
) -> HttpResponse {
    let index = path.into_inner();
    let size = state.store.window_index().size();

    if index >= size {
        return HttpResponse::NotFound().json(ApiError::new(format!(
            "Window {index} out of range (have {size})"
        )));
    }

    HttpResponse::Ok().json(render_window(&state.store, index))
}

/// `GET /api/style`
pub async fn style(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.style)
}
