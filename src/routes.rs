use crate::{
    api::{attendance, employee, health, report, summary},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::Condition, web};
use anyhow::Context;
use std::sync::Arc;

pub type WriteLimiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiter shared by every write route.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<WriteLimiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limit settings")?;

    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, write_limiter: WriteLimiter) {
    let rate_limited = config.rate_limit_per_min > 0;
    let limit = move || Condition::new(rate_limited, write_limiter.clone());

    // Malformed bodies, query strings and path ids are client mistakes, reported like any validation error
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid request body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid path parameter: {err}")).into()
    }));

    cfg.service(health::index).service(health::health);

    cfg.service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee).wrap(limit())),
            )
            // /employees/search
            .service(web::resource("/search").route(web::get().to(employee::search_employees)))
            // /employees/generate-code
            .service(
                web::resource("/generate-code")
                    .wrap(limit())
                    .route(web::post().to(employee::generate_employee_code)),
            )
            // /employees/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee).wrap(limit())),
            )
            // /employees/{id}/stats
            .service(web::resource("/{id}/stats").route(web::get().to(employee::employee_stats))),
    );

    cfg.service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::get().to(attendance::list_attendance))
                    .route(web::post().to(attendance::mark_attendance).wrap(limit())),
            )
            // /attendance/bulk
            .service(
                web::resource("/bulk")
                    .wrap(limit())
                    .route(web::post().to(attendance::mark_bulk_attendance)),
            )
            // /attendance/monthly
            .service(
                web::resource("/monthly").route(web::get().to(attendance::monthly_attendance)),
            )
            // /attendance/employee/{id}
            .service(
                web::resource("/employee/{id}")
                    .route(web::get().to(attendance::list_attendance_for_employee)),
            ),
    );

    cfg.service(
        web::scope("/summary")
            .service(web::resource("/employees").route(web::get().to(summary::summarize)))
            .service(
                web::resource("/departments")
                    .route(web::get().to(summary::summarize_by_department)),
            ),
    );

    cfg.service(web::resource("/dashboard").route(web::get().to(summary::dashboard)));

    cfg.service(
        web::resource("/reports/attendance").route(web::post().to(report::export_attendance)),
    );
}
