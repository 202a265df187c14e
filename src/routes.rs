use crate::{api::attendance, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{guard, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst size are non-zero");
        Governor::new(&cfg)
    }

    let upload_limiter = Arc::new(build_limiter(config.rate_upload_per_min));
    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));

    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/attendance")
                // POST /attendance
                .service(
                    web::resource("")
                        .guard(guard::Post())
                        .wrap(upload_limiter)
                        .route(web::post().to(attendance::mark_attendance)),
                )
                // GET /attendance
                .service(
                    web::resource("")
                        .wrap(read_limiter.clone())
                        .route(web::get().to(attendance::list_attendance)),
                )
                // /attendance/export
                .service(
                    web::resource("/export")
                        .wrap(read_limiter.clone())
                        .route(web::get().to(attendance::export_attendance)),
                )
                // /attendance/summary
                .service(
                    web::resource("/summary")
                        .wrap(read_limiter)
                        .route(web::get().to(attendance::attendance_summary)),
                ),
        ),
    );
}
