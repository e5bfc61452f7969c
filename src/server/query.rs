use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// Query string pairs in request order.
///
/// Lookups return the first value of a key, so repeated or malformed
/// parameters never reject a request before the handler runs.
#[derive(Debug, Clone, Default)]
pub struct QueryValues(Vec<(String, String)>);

impl QueryValues {
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<S> FromRequestParts<S> for QueryValues
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or_default()))
    }
}
