//! Validated JSON extractor.
//!
//! Runs the request validation pipeline: undeclared properties are rejected
//! against the payload's OpenAPI schema, the body is deserialized into the
//! target type, and `validator` rules are applied.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use utoipa::{
    openapi::{RefOr, Schema},
    ToSchema,
};
use validator::Validate;

use common::AppError;

/// JSON extractor that whitelists, transforms and validates the payload.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + for<'s> ToSchema<'s>,
    Json<Value>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        // Whitelist
        let (_, schema) = T::schema();
        let mut unknown = Vec::new();
        collect_unknown_properties(&schema, &raw, "", &mut unknown);
        if !unknown.is_empty() {
            let message = unknown
                .iter()
                .map(|field| format!("property {} should not exist", field))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::validation(message));
        }

        // Transform
        let value: T =
            serde_json::from_value(raw).map_err(|e| AppError::validation(e.to_string()))?;

        // Validate
        value.validate().map_err(|e| {
            let message = e
                .field_errors()
                .iter()
                .next()
                .and_then(|(field, errors)| {
                    errors.first().map(|error| match error.message.as_ref() {
                        Some(msg) => msg.to_string(),
                        None => format!("{} is invalid", field),
                    })
                })
                .unwrap_or_else(|| "Validation failed".to_string());
            AppError::validation(message)
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Walk `value` alongside `schema`, recording every object key the schema
/// does not declare. Referenced schemas and open maps accept anything.
fn collect_unknown_properties(
    schema: &RefOr<Schema>,
    value: &Value,
    path: &str,
    unknown: &mut Vec<String>,
) {
    match (schema, value) {
        (RefOr::T(Schema::Object(object)), Value::Object(fields)) => {
            if object.additional_properties.is_some() {
                return;
            }
            for (key, nested) in fields {
                let field = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                match object.properties.get(key) {
                    Some(property) => collect_unknown_properties(property, nested, &field, unknown),
                    None => unknown.push(field),
                }
            }
        }
        (RefOr::T(Schema::Array(array)), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let field = format!("{}[{}]", path, index);
                collect_unknown_properties(&array.items, item, &field, unknown);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        response::IntoResponse,
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize, Validate, ToSchema)]
    #[serde(rename_all = "camelCase")]
    struct Address {
        city: String,
    }

    #[derive(Debug, Deserialize, Validate, ToSchema)]
    #[serde(rename_all = "camelCase")]
    struct Signup {
        #[validate(email(message = "Email must be a valid address"))]
        email: String,
        #[validate(length(min = 1, max = 100))]
        first_name: Option<String>,
        #[schema(inline)]
        address: Option<Address>,
        #[schema(inline)]
        #[serde(default)]
        previous: Vec<Address>,
    }

    async fn signup(ValidatedJson(body): ValidatedJson<Signup>) -> impl IntoResponse {
        body.email
    }

    async fn send(body: &str) -> (StatusCode, String) {
        let app = Router::new().route("/signup", post(signup));
        let response = app
            .oneshot(
                HttpRequest::post("/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_accepts_declared_fields() {
        let (status, body) = send(r#"{"email":"a@example.com","firstName":"Ada"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "a@example.com");
    }

    #[tokio::test]
    async fn test_rejects_undeclared_fields_before_handler() {
        let (status, body) = send(r#"{"email":"a@example.com","isAdmin":true}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("VALIDATION_ERROR"));
        assert!(body.contains("property isAdmin should not exist"));
    }

    #[tokio::test]
    async fn test_rejects_undeclared_nested_fields() {
        let (status, body) =
            send(r#"{"email":"a@example.com","previous":[{"city":"Oslo","zip":"0150"}]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("previous[0].zip"));
    }

    #[tokio::test]
    async fn test_runs_validation_rules() {
        let (status, body) = send(r#"{"email":"not-an-email"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Email must be a valid address"));
    }

    #[tokio::test]
    async fn test_rejects_wrong_types() {
        let (status, body) = send(r#"{"email":42}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let (status, _) = send(r#"{"email":"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_collect_unknown_properties() {
        let (_, schema) = Signup::schema();
        let value = serde_json::json!({
            "email": "a@example.com",
            "role": "admin",
            "previous": [{"city": "Oslo"}, {"country": "NO"}]
        });

        let mut unknown = Vec::new();
        collect_unknown_properties(&schema, &value, "", &mut unknown);
        unknown.sort();

        assert_eq!(unknown, vec!["previous[1].country", "role"]);
    }
}
