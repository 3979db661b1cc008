//! HTTP inbound adapter exposing REST endpoints.

pub mod assessments;
pub mod error;
pub mod health;
pub mod image_sets;
pub mod images;
pub mod patients;
pub mod records;
pub mod samples;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Registers every route, body and query error handler, and the fallback.
///
/// Fixed paths come before the generic `/{table_name}` routes, and the
/// latest-record route comes before lookups by id, since Actix tries
/// services in registration order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .service(health::ready)
        .service(health::live)
        .service(samples::generate_all)
        .service(samples::generate_collection)
        .service(patients::list_patients)
        .service(patients::create_patient)
        .service(image_sets::create_image_set)
        .service(images::latest_image)
        .service(images::capture_image)
        .service(assessments::assess_image)
        .service(records::latest_record)
        .service(images::get_image)
        .service(records::get_record)
        .service(records::list_records)
        .default_service(web::to(error::route_not_found));
}
