use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Form,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::NutritionError;

/// Plain form fields from either `application/x-www-form-urlencoded` or
/// `multipart/form-data`. File parts are ignored.
pub struct FormFields<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormFields<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = NutritionError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !multipart {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| NutritionError::Rejected {
                    status: e.status(),
                    message: e.body_text(),
                })?;
            return Ok(FormFields(value));
        }

        let mut mp = Multipart::from_request(req, state)
            .await
            .map_err(|e| NutritionError::Rejected {
                status: e.status(),
                message: e.body_text(),
            })?;
        let mut fields = Map::new();
        while let Some(field) = mp.next_field().await? {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            fields.insert(name, Value::String(field.text().await?));
        }
        serde_json::from_value(Value::Object(fields))
            .map(FormFields)
            .map_err(|e| NutritionError::Rejected {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: format!("Failed to deserialize form: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Fields {
        barcode: String,
    }

    async fn extract(content_type: &str, body: &str) -> Result<Fields, NutritionError> {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        FormFields::<Fields>::from_request(req, &())
            .await
            .map(|FormFields(f)| f)
    }

    #[tokio::test]
    async fn reads_urlencoded() {
        let fields = extract("application/x-www-form-urlencoded", "barcode=7310865004703")
            .await
            .unwrap();
        assert_eq!(fields.barcode, "7310865004703");
    }

    #[tokio::test]
    async fn reads_multipart_and_skips_files() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"note\"; filename=\"n.txt\"\r\n\r\nignored\r\n\
                    --b\r\nContent-Disposition: form-data; name=\"barcode\"\r\n\r\n12345678\r\n--b--\r\n";
        let fields = extract("multipart/form-data; boundary=b", body).await.unwrap();
        assert_eq!(fields.barcode, "12345678");
    }

    #[tokio::test]
    async fn missing_field_is_unprocessable() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"code\"\r\n\r\n1\r\n--b--\r\n";
        let err = extract("multipart/form-data; boundary=b", body).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = extract("application/x-www-form-urlencoded", "code=1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn other_content_types_are_unsupported() {
        let err = extract("application/json", "{\"barcode\":\"1\"}")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
