use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
        }
    }
}

/// HTTP Header
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Header {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ============ Request bodies ============

/// Body of `POST /auth/login`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// A single sensor measurement, as posted by gateways
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    /// Reading taken now, with no quality grade
    pub fn now(value: f64) -> Self {
        SensorReading {
            value,
            quality: None,
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /credits/mint`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub unit_id: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Body of `POST /credits/:id/transfer`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Body of `POST /credits/:id/retire`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RetireRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ============ Response records ============
//
// The backend schema is open-ended; every record keeps fields it does not
// name in `extra` so nothing the server sends is lost.

/// Response of login/register
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A carbon capture unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default, rename = "type")]
    pub sensor_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCredit {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Health of the AI models behind `/ai/health`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelHealth {
    pub overall_status: String,
    #[serde(default)]
    pub models: Map<String, Value>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_check: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_keeps_unknown_fields() {
        let unit: Unit = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Reykjavik-01",
            "capacityTonsPerDay": 4.5
        }))
        .unwrap();
        assert_eq!(unit.id, "u1");
        assert_eq!(unit.name.as_deref(), Some("Reykjavik-01"));
        assert_eq!(unit.extra.get("capacityTonsPerDay"), Some(&json!(4.5)));
    }

    #[test]
    fn test_sensor_type_and_unit_id() {
        let sensor: Sensor = serde_json::from_value(json!({
            "_id": "s4",
            "unitId": "u1",
            "type": "co2_concentration",
            "status": "online",
            "calibratedAt": "2024-02-11T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(sensor.id, "s4");
        assert_eq!(sensor.unit_id.as_deref(), Some("u1"));
        assert_eq!(sensor.sensor_type.as_deref(), Some("co2_concentration"));
        assert_eq!(
            sensor.extra.get("calibratedAt"),
            Some(&json!("2024-02-11T00:00:00Z"))
        );
    }

    #[test]
    fn test_credit_with_missing_fields() {
        let credit: CarbonCredit = serde_json::from_value(json!({
            "id": "c9",
            "amount": 2.25,
            "vintage": 2024
        }))
        .unwrap();
        assert_eq!(credit.amount, Some(2.25));
        assert_eq!(credit.owner, None);
        assert_eq!(credit.status, None);
        assert_eq!(credit.extra.get("vintage"), Some(&json!(2024)));
    }

    #[test]
    fn test_model_health_response() {
        let health: ModelHealth = serde_json::from_value(json!({
            "overall_status": "healthy",
            "models": {
                "efficiency_predictor": { "status": "loaded", "accuracy": 0.94 },
                "maintenance_predictor": { "status": "loaded" }
            },
            "version": "1.0.0",
            "last_check": "2024-03-01T08:30:00",
            "uptime_seconds": 3600
        }))
        .unwrap();
        assert_eq!(health.overall_status, "healthy");
        assert_eq!(health.models.len(), 2);
        assert_eq!(health.version.as_deref(), Some("1.0.0"));
        assert_eq!(health.last_check.as_deref(), Some("2024-03-01T08:30:00"));
        assert_eq!(health.extra.get("uptime_seconds"), Some(&json!(3600)));
    }

    #[test]
    fn test_mint_request_uses_camel_case() {
        let body = serde_json::to_value(MintRequest {
            unit_id: "u1".to_string(),
            amount: 12.0,
            metadata: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "unitId": "u1", "amount": 12.0 }));
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(HttpMethod::default(), HttpMethod::GET);
        assert_eq!(HttpMethod::DELETE.as_str(), "DELETE");
        assert_eq!(reqwest::Method::from(HttpMethod::PUT), reqwest::Method::PUT);
    }
}
