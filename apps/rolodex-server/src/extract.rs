use axum::{
    extract::{FromRequest, Request},
    http::{header, Method},
    response::Response,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::responses;

/// A form or JSON body, chosen by `Content-Type`. Anything that is not JSON
/// is read as `application/x-www-form-urlencoded`.
pub(crate) struct Submission<T>(pub T);

impl<S, T> FromRequest<S> for Submission<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rej| responses::bad_request(&rej.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rej| responses::bad_request(&rej.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// HTML forms can only POST; `?_method=PUT` or `?_method=DELETE` on a POST
/// is routed as that method.
pub(crate) fn method_override(mut req: Request) -> Request {
    if req.method() != Method::POST {
        return req;
    }
    let wanted = req.uri().query().and_then(|q| {
        q.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "_method")
            .map(|(_, value)| value.to_ascii_uppercase())
    });
    match wanted.as_deref() {
        Some("PUT") => *req.method_mut() = Method::PUT,
        Some("DELETE") => *req.method_mut() = Method::DELETE,
        _ => {}
    }
    req
}
