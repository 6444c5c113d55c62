//! Estimation API client.
//!
//! Wire schema for the remote calorie-estimation service, the validation
//! step that turns a loosely-typed payload into an [`Estimate`], and the
//! HTTP client that performs the single outbound call.

use crate::config::Config;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Message shown when the server gives no usable error text.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to estimate calories";

/// Request body sent to the estimation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// Trimmed food description typed by the user.
    pub food_item: String,
}

impl EstimateRequest {
    /// Create a request, trimming surrounding whitespace.
    pub fn new(food_item: &str) -> Self {
        Self {
            food_item: food_item.trim().to_string(),
        }
    }
}

/// Success envelope: `{ "data": { ... } }`.
#[derive(Debug, Deserialize)]
struct EstimateResponse {
    data: EstimatePayload,
}

/// Error envelope: `{ "error": "..." }`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Raw nutrition payload as returned by the API, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatePayload {
    pub estimated_serving: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub confidence: f64,
}

impl EstimatePayload {
    /// Validate the payload and convert it into an [`Estimate`].
    pub fn validate(self) -> Result<Estimate, EstimateError> {
        let serving_size = self.estimated_serving.trim();
        if serving_size.is_empty() {
            return Err(EstimateError::InvalidPayload(
                "estimated_serving is empty".into(),
            ));
        }

        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EstimateError::InvalidPayload(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(EstimateError::InvalidPayload(format!(
                "confidence must be between 0 and 1, got {}",
                self.confidence
            )));
        }

        Ok(Estimate {
            serving_size: serving_size.to_string(),
            calories: self.calories,
            protein_grams: self.protein,
            carbs_grams: self.carbs,
            fat_grams: self.fat,
            confidence: self.confidence,
        })
    }
}

/// A validated nutrition estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// Serving the numbers refer to (e.g. "100g", "1 medium apple").
    pub serving_size: String,
    /// Energy in kcal.
    pub calories: f64,
    /// Protein in grams.
    pub protein_grams: f64,
    /// Carbohydrates in grams.
    pub carbs_grams: f64,
    /// Fat in grams.
    pub fat_grams: f64,
    /// Model confidence in `0..=1`.
    pub confidence: f64,
}

impl Estimate {
    /// Confidence as a whole percentage, e.g. `"92%"`. Halves round up.
    pub fn confidence_percent(&self) -> String {
        format!("{}%", (self.confidence * 100.0).round())
    }

    /// Label/value rows in display order.
    pub fn rows(&self) -> [(&'static str, String); 6] {
        [
            ("Serving Size", self.serving_size.clone()),
            ("Calories", format_quantity(self.calories)),
            ("Protein", format!("{}g", format_quantity(self.protein_grams))),
            ("Carbs", format!("{}g", format_quantity(self.carbs_grams))),
            ("Fat", format!("{}g", format_quantity(self.fat_grams))),
            ("Confidence", self.confidence_percent()),
        ]
    }
}

/// Format a number the way the API sends it: `165`, `3.6`, `0`.
fn format_quantity(value: f64) -> String {
    format!("{value}")
}

/// HTTP client for the estimation endpoint.
#[derive(Debug, Clone)]
pub struct EstimationClient {
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl EstimationClient {
    /// Build a client for the endpoint described by `config`.
    pub fn new(config: &Config) -> Result<Self, EstimateError> {
        let url = config.endpoint();
        let endpoint =
            reqwest::Url::parse(&url).map_err(|e| EstimateError::InvalidEndpoint {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("calorie/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EstimateError::Transport)?;

        Ok(Self { http, endpoint })
    }

    /// The endpoint URL this client posts to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Request an estimate for one food item.
    pub async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate, EstimateError> {
        debug!(endpoint = %self.endpoint, food_item = %request.food_item, "Dispatching estimate request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Estimate request failed to send");
                EstimateError::Transport(e)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(EstimateError::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&body)
                .ok()
                .map(|b| b.error)
                .filter(|m| !m.trim().is_empty());
            warn!(status = status.as_u16(), message = ?message, "Estimate request rejected");
            return Err(EstimateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: EstimateResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "Estimate response did not match the expected schema");
            EstimateError::Decode(e)
        })?;
        let estimate = envelope.data.validate()?;

        info!(
            food_item = %request.food_item,
            calories = estimate.calories,
            confidence = estimate.confidence,
            "Received estimate"
        );
        Ok(estimate)
    }
}

/// Errors that can occur while requesting an estimate.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// The configured endpoint is not a valid URL.
    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Connection, TLS or body transfer failure.
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx response.
    #[error("API returned status {status}")]
    Api {
        status: u16,
        /// The server's `error` text, when the body carried one.
        message: Option<String>,
    },

    /// Success response that is not the expected JSON envelope.
    #[error("Could not decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Well-formed JSON with out-of-range or missing values.
    #[error("Invalid estimate: {0}")]
    InvalidPayload(String),
}

impl EstimateError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => message.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server_uri: &str) -> EstimationClient {
        let config = Config::default().with_api_base_url(server_uri);
        EstimationClient::new(&config).unwrap()
    }

    fn chicken_payload() -> EstimatePayload {
        EstimatePayload {
            estimated_serving: "100g".into(),
            calories: 165.0,
            protein: 31.0,
            carbs: 0.0,
            fat: 3.6,
            confidence: 0.92,
        }
    }

    #[test]
    fn test_request_trims_food_item() {
        let request = EstimateRequest::new("  chicken breast \n");
        assert_eq!(request.food_item, "chicken breast");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "food_item": "chicken breast" })
        );
    }

    #[test]
    fn test_validate_accepts_well_formed_payload() {
        let estimate = chicken_payload().validate().unwrap();
        assert_eq!(estimate.serving_size, "100g");
        assert!((estimate.fat_grams - 3.6).abs() < f64::EPSILON);
        assert!((estimate.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut payload = chicken_payload();
        payload.confidence = 1.5;
        assert!(matches!(
            payload.validate(),
            Err(EstimateError::InvalidPayload(_))
        ));

        let mut payload = chicken_payload();
        payload.calories = -10.0;
        assert!(matches!(
            payload.validate(),
            Err(EstimateError::InvalidPayload(_))
        ));

        let mut payload = chicken_payload();
        payload.fat = f64::NAN;
        assert!(matches!(
            payload.validate(),
            Err(EstimateError::InvalidPayload(_))
        ));

        let mut payload = chicken_payload();
        payload.estimated_serving = "   ".into();
        assert!(matches!(
            payload.validate(),
            Err(EstimateError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_rows_format() {
        let estimate = chicken_payload().validate().unwrap();
        let rows = estimate.rows();
        assert_eq!(rows[0], ("Serving Size", "100g".to_string()));
        assert_eq!(rows[1], ("Calories", "165".to_string()));
        assert_eq!(rows[2], ("Protein", "31g".to_string()));
        assert_eq!(rows[3], ("Carbs", "0g".to_string()));
        assert_eq!(rows[4], ("Fat", "3.6g".to_string()));
        assert_eq!(rows[5], ("Confidence", "92%".to_string()));
    }

    #[test]
    fn test_confidence_percent_rounds_halves_up() {
        let mut estimate = chicken_payload().validate().unwrap();
        for (confidence, expected) in [(0.125, "13%"), (0.625, "63%"), (0.0, "0%"), (1.0, "100%")]
        {
            estimate.confidence = confidence;
            assert_eq!(estimate.confidence_percent(), expected);
        }
    }

    #[test]
    fn test_user_message() {
        let err = EstimateError::Api {
            status: 404,
            message: Some("unknown food item".into()),
        };
        assert_eq!(err.user_message(), "unknown food item");

        let err = EstimateError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);

        let err = EstimateError::InvalidPayload("bad".into());
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = Config::default().with_api_base_url("not a url");
        let err = EstimationClient::new(&config).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_estimate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/estimate-calories"))
            .and(body_json(json!({ "food_item": "chicken breast" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "estimated_serving": "100g",
                    "calories": 165,
                    "protein": 31,
                    "carbs": 0,
                    "fat": 3.6,
                    "confidence": 0.92
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let estimate = client
            .estimate(&EstimateRequest::new(" chicken breast "))
            .await
            .unwrap();

        assert_eq!(estimate, chicken_payload().validate().unwrap());
    }

    #[tokio::test]
    async fn test_estimate_server_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/estimate-calories"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "error": "unknown food item" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .estimate(&EstimateRequest::new("xyzzy"))
            .await
            .unwrap_err();

        assert!(matches!(err, EstimateError::Api { status: 422, .. }));
        assert_eq!(err.user_message(), "unknown food item");
    }

    #[tokio::test]
    async fn test_estimate_error_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .estimate(&EstimateRequest::new("apple"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_estimate_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "calories": 52 } })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .estimate(&EstimateRequest::new("apple"))
            .await
            .unwrap_err();

        assert!(matches!(err, EstimateError::Decode(_)));
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_estimate_connection_refused() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let client = client_for(&uri);
        let err = client
            .estimate(&EstimateRequest::new("apple"))
            .await
            .unwrap_err();

        assert!(matches!(err, EstimateError::Transport(_)));
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }
}
