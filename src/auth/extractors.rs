use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts, Uri},
    Form,
};

use super::errors::AccountError;

/// Text fields of a form submission, from `multipart/form-data` or
/// `application/x-www-form-urlencoded`. Query parameters fill in keys the
/// body lacks; for keys repeated within the body the first value wins.
/// Any other body is read as an empty form so missing fields surface
/// through validation.
#[derive(Debug, Default)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    pub fn take(&mut self, key: &str) -> String {
        self.0.remove(key).unwrap_or_default()
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut fields = query_pairs(req.uri())
            .map(first_wins)
            .unwrap_or_default();

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut body = HashMap::new();
        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| malformed(e.body_text()))?;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| malformed(e.body_text()))?
            {
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                if field.file_name().is_some() {
                    continue;
                }
                let value = field.text().await.map_err(|e| malformed(e.body_text()))?;
                body.entry(name).or_insert(value);
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| malformed(e.body_text()))?;
            body = first_wins(pairs);
        }

        fields.extend(body);
        Ok(Self(fields))
    }
}

/// Query-string parameters only; the first value of a repeated key wins.
#[derive(Debug, Default)]
pub struct QueryFields(pub HashMap<String, String>);

#[async_trait]
impl<S> FromRequestParts<S> for QueryFields
where
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = query_pairs(&parts.uri).map_err(|detail| {
            AccountError::Validation(format!("malformed query string: {detail}"))
        })?;
        Ok(Self(first_wins(pairs)))
    }
}

fn query_pairs(uri: &Uri) -> Result<Vec<(String, String)>, String> {
    Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map(|Query(pairs)| pairs)
        .map_err(|e| e.body_text())
}

fn first_wins(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (name, value) in pairs {
        fields.entry(name).or_insert(value);
    }
    fields
}

fn malformed(detail: String) -> AccountError {
    AccountError::Validation(format!("malformed form body: {detail}"))
}
