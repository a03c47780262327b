//! HTTP server for the Prometheus scrape endpoint.
//!
//! Every request to the telemetry path runs one scrape pass. A failed pass
//! still answers 200; the failure shows up as `pgbouncer_up 0`.

use crate::admin::AdminSource;
use crate::scrape::Exporter;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::{Router, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

/// Handler for GET <telemetry_path> - scrapes pgbouncer and returns text format.
async fn metrics_handler<S>(State(exporter): State<Arc<Exporter<S>>>) -> impl IntoResponse
where
    S: AdminSource + 'static,
{
    let samples = exporter.collect().await;
    (
        [(header::CONTENT_TYPE, crate::metrics::content_type())],
        crate::metrics::gather_metrics(&samples),
    )
}

fn landing_page(telemetry_path: &str) -> Html<String> {
    Html(format!(
        "<html><head><title>Pgbouncer Exporter</title></head><body>\
         <h1>Pgbouncer Exporter</h1><p><a href='{telemetry_path}'>Metrics</a></p>\
         </body></html>"
    ))
}

/// Build the router: metrics under `telemetry_path`, a landing page at `/`.
pub fn router<S>(exporter: Arc<Exporter<S>>, telemetry_path: &str) -> Router
where
    S: AdminSource + 'static,
{
    let page = landing_page(telemetry_path);
    Router::new()
        .route(telemetry_path, get(metrics_handler::<S>))
        .route("/", get(move || async move { page }))
        .with_state(exporter)
}

/// Run the HTTP server until `shutdown` resolves.
pub async fn run_http_server(
    addr: SocketAddr,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Prometheus HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{AdminCommand, ColumnValue, Row};
    use crate::error::ScrapeError;
    use crate::scrape::DescriptorRegistry;
    use async_trait::async_trait;

    struct ListsOnly;

    #[async_trait]
    impl AdminSource for ListsOnly {
        async fn query(&mut self, command: AdminCommand) -> Result<Vec<Row>, ScrapeError> {
            match command {
                AdminCommand::Lists => Ok(vec![Row(vec![
                    ColumnValue::Text("databases".into()),
                    ColumnValue::Integer(2),
                ])]),
                AdminCommand::Mem => Err(ScrapeError::query(command, sqlx::Error::PoolClosed)),
                _ => Ok(Vec::new()),
            }
        }
    }

    async fn serve(telemetry_path: &'static str) -> SocketAddr {
        let exporter = Arc::new(Exporter::new(
            ListsOnly,
            Arc::new(DescriptorRegistry::pgbouncer()),
        ));
        let app = router(exporter, telemetry_path);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_metrics_endpoint_reports_failed_pass() {
        let addr = serve("/metrics").await;
        let resp = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert!(
            resp.headers()[reqwest::header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );

        let body = resp.text().await.unwrap();
        assert!(body.contains("pgbouncer_databases 2"));
        assert!(body.contains("pgbouncer_up 0"));
        assert!(body.contains("pgbouncer_scrape_total 1"));
        assert!(body.contains("pgbouncer_scrape_error_count 1"));
    }

    #[tokio::test]
    async fn test_landing_page_links_telemetry_path() {
        let addr = serve("/debug/metrics").await;
        let body = reqwest::get(format!("http://{addr}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("<a href='/debug/metrics'>Metrics</a>"));
    }
}
