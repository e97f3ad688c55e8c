use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse};
use futures_util::future::LocalBoxFuture;
use log::warn;
use serde_json::json;

use crate::server::AppState;

const API_KEY_HEADER: &str = "X-API-Key";

/// Guards a scope behind the shared `X-API-Key` secret.
///
/// Fails closed when the server key is unconfigured: a deployment that
/// forgot to set `API_KEY` serves 500 on protected routes instead of
/// accepting anything.
pub struct RequireApiKey;

impl<S, B> Transform<S, ServiceRequest> for RequireApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireApiKeyService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireApiKeyService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireApiKeyService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireApiKeyService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let state = req.app_data::<web::Data<AppState>>();

        let rejection = match (provided, state) {
            (None, _) => Some((StatusCode::UNAUTHORIZED, "Missing X-API-Key")),
            (Some(_), Some(state)) if !state.settings.api_key_configured() => {
                warn!("rejecting protected request: server API_KEY not configured");
                Some((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server API_KEY not configured",
                ))
            }
            (Some(key), Some(state)) if key != state.settings.api_key => {
                Some((StatusCode::UNAUTHORIZED, "Invalid API key"))
            }
            (Some(_), None) => Some((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server API_KEY not configured",
            )),
            _ => None,
        };

        if let Some((status, message)) = rejection {
            let (req, _payload) = req.into_parts();
            let response = HttpResponse::build(status)
                .json(json!({ "ok": false, "error": message }))
                .map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
