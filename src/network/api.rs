//! Domain methods on [`ApiClient`]
//!
//! Each method picks its descriptor from [`routes`] and hands it to
//! [`ApiClient::request`]. Response types are chosen by the caller; the
//! records in [`crate::models`] fit the usual payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiResult;
use crate::models::{
    Credentials, MintRequest, RegisterRequest, RetireRequest, SensorReading, TransferRequest,
};
use crate::network::client::ApiClient;
use crate::network::request::Filters;
use crate::network::routes;

impl ApiClient {
    // ============ Auth ============

    /// POST /auth/login
    pub async fn login<T: DeserializeOwned>(&self, credentials: &Credentials) -> ApiResult<T> {
        self.request_json(routes::login(), credentials).await
    }

    /// POST /auth/register
    pub async fn register<T: DeserializeOwned>(&self, user: &RegisterRequest) -> ApiResult<T> {
        self.request_json(routes::register(), user).await
    }

    /// GET /auth/me
    pub async fn current_user<T: DeserializeOwned>(&self) -> ApiResult<T> {
        self.request(routes::current_user()).await
    }

    // ============ Units ============

    /// GET /units
    pub async fn list_units<T: DeserializeOwned>(&self, filters: &Filters) -> ApiResult<T> {
        self.request(routes::list_units(filters)).await
    }

    /// GET /units/{id}
    pub async fn get_unit<T: DeserializeOwned>(&self, id: &str) -> ApiResult<T> {
        self.request(routes::get_unit(id)).await
    }

    /// POST /units
    pub async fn create_unit<T, B>(&self, unit: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(routes::create_unit(), unit).await
    }

    /// PUT /units/{id}
    pub async fn update_unit<T, B>(&self, id: &str, unit: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(routes::update_unit(id), unit).await
    }

    /// DELETE /units/{id}
    pub async fn delete_unit<T: DeserializeOwned>(&self, id: &str) -> ApiResult<T> {
        self.request(routes::delete_unit(id)).await
    }

    /// POST /ai/optimize/{id}: ask the AI engine to tune a unit
    pub async fn optimize_unit<T: DeserializeOwned>(&self, id: &str) -> ApiResult<T> {
        self.request(routes::optimize_unit(id)).await
    }

    // ============ Sensors ============

    /// GET /sensors
    pub async fn list_sensors<T: DeserializeOwned>(&self, filters: &Filters) -> ApiResult<T> {
        self.request(routes::list_sensors(filters)).await
    }

    /// GET /sensors/{id}
    pub async fn get_sensor<T: DeserializeOwned>(&self, id: &str) -> ApiResult<T> {
        self.request(routes::get_sensor(id)).await
    }

    /// POST /sensors
    pub async fn create_sensor<T, B>(&self, sensor: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(routes::create_sensor(), sensor).await
    }

    /// PUT /sensors/{id}
    pub async fn update_sensor<T, B>(&self, id: &str, sensor: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(routes::update_sensor(id), sensor).await
    }

    /// POST /sensors/{id}/reading
    pub async fn add_sensor_reading<T: DeserializeOwned>(
        &self,
        id: &str,
        reading: &SensorReading,
    ) -> ApiResult<T> {
        self.request_json(routes::add_sensor_reading(id), reading).await
    }

    // ============ Analytics ============

    /// GET /ai/health
    pub async fn model_health<T: DeserializeOwned>(&self) -> ApiResult<T> {
        self.request(routes::model_health()).await
    }

    /// GET /ai/analytics/{id}, optionally narrowed with `?timeframe=`
    pub async fn unit_analytics<T: DeserializeOwned>(
        &self,
        id: &str,
        timeframe: Option<&str>,
    ) -> ApiResult<T> {
        self.request(routes::unit_analytics(id, timeframe)).await
    }

    /// GET /ai/insights
    pub async fn network_insights<T: DeserializeOwned>(&self) -> ApiResult<T> {
        self.request(routes::network_insights()).await
    }

    // ============ Carbon credits ============

    /// GET /credits
    pub async fn list_credits<T: DeserializeOwned>(&self, filters: &Filters) -> ApiResult<T> {
        self.request(routes::list_credits(filters)).await
    }

    /// GET /credits/{id}
    pub async fn get_credit<T: DeserializeOwned>(&self, id: &str) -> ApiResult<T> {
        self.request(routes::get_credit(id)).await
    }

    /// POST /credits/mint
    pub async fn mint_credits<T: DeserializeOwned>(&self, mint: &MintRequest) -> ApiResult<T> {
        self.request_json(routes::mint_credits(), mint).await
    }

    /// POST /credits/{id}/transfer
    pub async fn transfer_credit<T: DeserializeOwned>(
        &self,
        id: &str,
        transfer: &TransferRequest,
    ) -> ApiResult<T> {
        self.request_json(routes::transfer_credit(id), transfer).await
    }

    /// POST /credits/{id}/retire
    pub async fn retire_credit<T: DeserializeOwned>(
        &self,
        id: &str,
        retire: &RetireRequest,
    ) -> ApiResult<T> {
        self.request_json(routes::retire_credit(id), retire).await
    }

    /// GET /credits/market
    pub async fn credit_market<T: DeserializeOwned>(&self) -> ApiResult<T> {
        self.request(routes::credit_market()).await
    }

    // ============ Reports ============

    /// GET /reports/units/{id}/performance
    pub async fn unit_performance_report<T: DeserializeOwned>(
        &self,
        id: &str,
        filters: &Filters,
    ) -> ApiResult<T> {
        self.request(routes::unit_performance_report(id, filters)).await
    }

    /// GET /reports/network/performance
    pub async fn network_performance_report<T: DeserializeOwned>(
        &self,
        filters: &Filters,
    ) -> ApiResult<T> {
        self.request(routes::network_performance_report(filters)).await
    }

    /// GET /reports/credits
    pub async fn credit_report<T: DeserializeOwned>(&self, filters: &Filters) -> ApiResult<T> {
        self.request(routes::credit_report(filters)).await
    }

    /// GET /reports/environmental
    pub async fn environmental_report<T: DeserializeOwned>(
        &self,
        filters: &Filters,
    ) -> ApiResult<T> {
        self.request(routes::environmental_report(filters)).await
    }
}
