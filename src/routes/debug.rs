use actix_web::{get, web, HttpResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Process counters in Prometheus text format. Behind basic auth.
#[get("/vars")]
pub async fn vars(handle: web::Data<PrometheusHandle>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(handle.render())
}
