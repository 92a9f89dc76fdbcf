use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static UPLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wallpaper_uploads_total",
        "Total wallpapers uploaded"
    )
    .expect("register uploads_total")
});

pub static UPLOAD_REJECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wallpaper_upload_rejections_total",
        "Total uploads rejected by validation"
    )
    .expect("register upload_rejections_total")
});

pub static DOWNLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wallpaper_downloads_total",
        "Total recorded downloads"
    )
    .expect("register downloads_total")
});

pub static LIST_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "wallpaper_list_requests_total",
        "Total listing requests"
    )
    .expect("register list_requests_total")
});

/// Touch every counter so `/metrics` lists them from the first scrape.
pub fn init() {
    Lazy::force(&UPLOADS_TOTAL);
    Lazy::force(&UPLOAD_REJECTIONS_TOTAL);
    Lazy::force(&DOWNLOADS_TOTAL);
    Lazy::force(&LIST_REQUESTS_TOTAL);
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
