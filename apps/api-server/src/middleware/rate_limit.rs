//! Per-client rate limiting for credential sign-in.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use devconnect_shared::ErrorResponse;

use crate::state::AppState;

/// Rate limiting middleware. Uses the login limiter from [`AppState`];
/// requests pass through untouched when none is configured.
pub struct LoginRateLimit;

impl<S, B> Transform<S, ServiceRequest> for LoginRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = LoginRateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginRateLimitService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoginRateLimitService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoginRateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| state.login_limiter.clone());

        let key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        Box::pin(async move {
            if let Some(limiter) = limiter {
                match limiter.check(&key).await {
                    Ok(result) if !result.allowed => {
                        tracing::warn!(client = %key, "Sign-in rate limit exceeded");

                        let retry_after = result.reset_after.as_secs().max(1);
                        let error = ErrorResponse::new(429, "Too Many Requests").with_detail(
                            format!("Too many sign-in attempts. Try again in {retry_after} seconds."),
                        );
                        let response = HttpResponse::TooManyRequests()
                            .insert_header(("Retry-After", retry_after.to_string()))
                            .json(error);

                        let (http_req, _payload) = req.into_parts();
                        return Ok(ServiceResponse::new(http_req, response).map_into_right_body());
                    }
                    Ok(_) => {}
                    // Fail open.
                    Err(e) => tracing::error!(error = %e, "Rate limiter error"),
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
