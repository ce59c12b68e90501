//! Endpoint table
//!
//! One function per backend endpoint, each fixing method and path. Bodies are
//! attached by the caller in [`ApiClient`](crate::network::ApiClient).

use crate::network::request::{ApiRequest, Filters};

// ============ Auth ============

pub fn login() -> ApiRequest {
    ApiRequest::post("/auth/login")
}

pub fn register() -> ApiRequest {
    ApiRequest::post("/auth/register")
}

pub fn current_user() -> ApiRequest {
    ApiRequest::get("/auth/me")
}

// ============ Units ============

pub fn list_units(filters: &Filters) -> ApiRequest {
    ApiRequest::get("/units").query(filters)
}

pub fn get_unit(id: &str) -> ApiRequest {
    ApiRequest::get(format!("/units/{}", id))
}

pub fn create_unit() -> ApiRequest {
    ApiRequest::post("/units")
}

pub fn update_unit(id: &str) -> ApiRequest {
    ApiRequest::put(format!("/units/{}", id))
}

pub fn delete_unit(id: &str) -> ApiRequest {
    ApiRequest::delete(format!("/units/{}", id))
}

pub fn optimize_unit(id: &str) -> ApiRequest {
    ApiRequest::post(format!("/ai/optimize/{}", id))
}

// ============ Sensors ============

pub fn list_sensors(filters: &Filters) -> ApiRequest {
    ApiRequest::get("/sensors").query(filters)
}

pub fn get_sensor(id: &str) -> ApiRequest {
    ApiRequest::get(format!("/sensors/{}", id))
}

pub fn create_sensor() -> ApiRequest {
    ApiRequest::post("/sensors")
}

pub fn update_sensor(id: &str) -> ApiRequest {
    ApiRequest::put(format!("/sensors/{}", id))
}

pub fn add_sensor_reading(id: &str) -> ApiRequest {
    ApiRequest::post(format!("/sensors/{}/reading", id))
}

// ============ Analytics ============

pub fn model_health() -> ApiRequest {
    ApiRequest::get("/ai/health")
}

pub fn unit_analytics(id: &str, timeframe: Option<&str>) -> ApiRequest {
    let req = ApiRequest::get(format!("/ai/analytics/{}", id));
    match timeframe {
        Some(timeframe) => req.query(&Filters::new().with("timeframe", timeframe)),
        None => req,
    }
}

pub fn network_insights() -> ApiRequest {
    ApiRequest::get("/ai/insights")
}

// ============ Carbon credits ============

pub fn list_credits(filters: &Filters) -> ApiRequest {
    ApiRequest::get("/credits").query(filters)
}

pub fn get_credit(id: &str) -> ApiRequest {
    ApiRequest::get(format!("/credits/{}", id))
}

pub fn mint_credits() -> ApiRequest {
    ApiRequest::post("/credits/mint")
}

pub fn transfer_credit(id: &str) -> ApiRequest {
    ApiRequest::post(format!("/credits/{}/transfer", id))
}

pub fn retire_credit(id: &str) -> ApiRequest {
    ApiRequest::post(format!("/credits/{}/retire", id))
}

pub fn credit_market() -> ApiRequest {
    ApiRequest::get("/credits/market")
}

// ============ Reports ============

pub fn unit_performance_report(id: &str, filters: &Filters) -> ApiRequest {
    ApiRequest::get(format!("/reports/units/{}/performance", id)).query(filters)
}

pub fn network_performance_report(filters: &Filters) -> ApiRequest {
    ApiRequest::get("/reports/network/performance").query(filters)
}

pub fn credit_report(filters: &Filters) -> ApiRequest {
    ApiRequest::get("/reports/credits").query(filters)
}

pub fn environmental_report(filters: &Filters) -> ApiRequest {
    ApiRequest::get("/reports/environmental").query(filters)
}
