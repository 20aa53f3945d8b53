//! Per-client rate limiting middleware for the API scope.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use quill_shared::ErrorResponse;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use quill_core::ports::RateLimiter;

/// Rate limiting middleware factory.
///
/// Clients are keyed by the socket peer address unless proxy headers are trusted.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    trust_proxy_headers: bool,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            limiter,
            trust_proxy_headers: false,
        }
    }

    /// Key on `Forwarded`/`X-Forwarded-For`. Enable only behind a proxy that sets them.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service,
            limiter: self.limiter.clone(),
            trust_proxy_headers: self.trust_proxy_headers,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: S,
    limiter: Arc<dyn RateLimiter>,
    trust_proxy_headers: bool,
}

impl<S> RateLimitMiddlewareService<S> {
    fn client_key(&self, req: &ServiceRequest) -> String {
        if self.trust_proxy_headers {
            if let Some(addr) = req.connection_info().realip_remote_addr() {
                return addr.to_string();
            }
        }

        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = self.client_key(&req);

        match self.limiter.check(&key) {
            Ok(result) if !result.allowed => {
                let retry_after = result.reset_after.as_secs().max(1);
                tracing::warn!(client = %key, retry_after, "Rate limit exceeded");

                let response = HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", retry_after.to_string()))
                    .json(ErrorResponse::failure("Too Many Requests"));

                let (http_req, _payload) = req.into_parts();
                let srv_response = ServiceResponse::new(http_req, response);

                Box::pin(async move { Ok(srv_response.map_into_right_body()) })
            }
            outcome => {
                // Limiter failures let the request through.
                if let Err(e) = outcome {
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                }

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test, web};
    use quill_infra::{InMemoryRateLimiter, RateLimitConfig};
    use std::time::Duration;

    fn one_per_minute() -> Arc<dyn RateLimiter> {
        Arc::new(
            InMemoryRateLimiter::new(RateLimitConfig {
                max_requests: 1,
                window: Duration::from_secs(60),
            })
            .unwrap(),
        )
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_forwarded_header_does_not_reset_the_bucket() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(one_per_minute()))
                .route("/", web::get().to(ok)),
        )
        .await;

        let mut statuses = Vec::new();
        for i in 0..5 {
            let req = test::TestRequest::get()
                .uri("/")
                .peer_addr("10.0.0.1:40000".parse().unwrap())
                .insert_header(("X-Forwarded-For", format!("1.2.3.{i}")))
                .to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }

        assert_eq!(statuses[0], StatusCode::OK);
        assert!(statuses[1..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    }

    #[actix_web::test]
    async fn test_peers_are_limited_independently() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(one_per_minute()))
                .route("/", web::get().to(ok)),
        )
        .await;

        for peer in ["10.0.0.1:1000", "10.0.0.2:1000"] {
            let req = test::TestRequest::get()
                .uri("/")
                .peer_addr(peer.parse().unwrap())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get()
            .uri("/")
            .peer_addr("10.0.0.1:2000".parse().unwrap())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key("Retry-After"));
    }

    #[actix_web::test]
    async fn test_trusted_proxy_headers_key_per_client() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(one_per_minute()).trust_proxy_headers(true))
                .route("/", web::get().to(ok)),
        )
        .await;

        for client in ["1.2.3.4", "1.2.3.5"] {
            let req = test::TestRequest::get()
                .uri("/")
                .peer_addr("10.0.0.1:40000".parse().unwrap())
                .insert_header(("X-Forwarded-For", client))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
    }
}
