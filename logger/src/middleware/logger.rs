use std::{future::Future, pin::Pin, sync::Arc, time::Instant};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use colored::Colorize;
use common::jwt::JwtClaims;
use futures::future::{Ready, ok};

/// Logs one line per handled request: method, path, status, latency and
/// the acting member when the request carried valid claims.
pub struct LoggerMiddleware {}

impl LoggerMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(LoggerMiddlewareService {
            service: Arc::new(service),
        })
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Arc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().to_string();
        let path = req.path().to_string();
        let started = Instant::now();
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            let res = srv.call(req).await?;

            let user = res
                .request()
                .extensions()
                .get::<JwtClaims>()
                .map(|claims| claims.user_id.to_string())
                .unwrap_or_else(|| "-".to_string());

            let status = res.status();
            let status_str = if status.is_success() {
                status.as_str().green()
            } else if status.is_client_error() {
                status.as_str().yellow()
            } else {
                status.as_str().red()
            };

            log::info!(
                "{} {} {} {}ms user={}",
                method,
                path,
                status_str,
                started.elapsed().as_millis(),
                user
            );

            Ok(res)
        })
    }
}
