//! Request identification.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the client sent none
//! - Expose the ID to handlers as a request extension
//! - Echo the ID on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied ID is kept as-is when it is a valid header value

use axum::http::{HeaderName, HeaderValue, Request, Response};
use futures_util::future::BoxFuture;
use std::fmt;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// ID of the request being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the request ID from a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Layer that assigns request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let (id, value) = match req.headers().get(&X_REQUEST_ID) {
            Some(v) if !v.is_empty() && v.to_str().is_ok() => {
                (v.to_str().unwrap_or_default().to_string(), v.clone())
            }
            _ => {
                let id = Uuid::new_v4().to_string();
                let value = HeaderValue::from_str(&id).unwrap_or(HeaderValue::from_static("unknown"));
                (id, value)
            }
        };

        req.headers_mut().insert(X_REQUEST_ID.clone(), value.clone());
        req.extensions_mut().insert(RequestId(id));

        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            res.headers_mut().insert(X_REQUEST_ID.clone(), value);
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    async fn echo_id(req: Request<()>) -> Result<Response<String>, Infallible> {
        let id = req.request_id().map(|id| id.to_string()).unwrap_or_default();
        Ok(Response::new(id))
    }

    #[tokio::test]
    async fn test_generates_id() {
        let svc = RequestIdLayer.layer(service_fn(echo_id));
        let res = svc.oneshot(Request::new(())).await.unwrap();

        let header = res.headers().get(&X_REQUEST_ID).unwrap().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(res.body(), &header);
    }

    #[tokio::test]
    async fn test_keeps_client_id() {
        let svc = RequestIdLayer.layer(service_fn(echo_id));
        let req = Request::builder()
            .header("x-request-id", "abc-123")
            .body(())
            .unwrap();
        let res = svc.oneshot(req).await.unwrap();

        assert_eq!(res.headers().get(&X_REQUEST_ID).unwrap(), "abc-123");
        assert_eq!(res.body(), "abc-123");
    }
}
