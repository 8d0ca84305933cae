//! HTTP proxy in front of the availability source.

use reqwest::Client;
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};
use warp::{http::StatusCode, reject::Rejection, reply::Reply, Filter};

use crate::fetch::TableSource;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "show-rota"
    })))
}

async fn availabilities(source: Arc<TableSource>, client: Client) -> Result<impl Reply, Rejection> {
    match source.fetch_availability_table(&client).await {
        Ok(table) => {
            info!(rows = table.rows.len(), "served availability table");
            Ok(warp::reply::with_status(
                warp::reply::json(&table),
                StatusCode::OK,
            ))
        }
        Err(e) => {
            error!(error = %e, "availability fetch failed");
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorResponse {
                    error: e.to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

/// `GET /health` and `GET /api/availabilities`.
pub fn routes(
    source: Arc<TableSource>,
    client: Client,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let with_source = warp::any().map(move || Arc::clone(&source));
    let with_client = warp::any().map(move || client.clone());
    let avail = warp::path!("api" / "availabilities")
        .and(warp::get())
        .and(with_source)
        .and(with_client)
        .and_then(availabilities);

    health.or(avail)
}

pub async fn run(source: TableSource, client: Client, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server starting on port {}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Availability: GET http://localhost:{}/api/availabilities", port);
    warp::serve(routes(Arc::new(source), client)).run(addr).await;
}
