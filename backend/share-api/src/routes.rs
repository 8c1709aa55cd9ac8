//! HTTP routes: GraphQL execution, SDL, playground and health

use actix_web::{web, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::error::{ApiError, SESSION_EXPIRED_MESSAGE};
use crate::middleware::Session;
use crate::schema::{AppSchema, CurrentUser};

/// Execute `request` as the caller identified by `session`.
/// A rejected token aborts the request before any resolver runs.
pub async fn execute_in_session(
    schema: &AppSchema,
    session: Session,
    request: async_graphql::Request,
) -> async_graphql::Response {
    let current_user = match session {
        Session::Anonymous => CurrentUser(None),
        Session::Authenticated(claims) => CurrentUser(Some(claims)),
        Session::Rejected(_) => {
            let error =
                ApiError::Authentication(SESSION_EXPIRED_MESSAGE.to_string()).into_server_error();
            return async_graphql::Response::from_errors(vec![error]);
        }
    };

    schema.execute(request.data(current_user)).await
}

pub async fn graphql_handler(
    schema: web::Data<AppSchema>,
    session: Option<web::ReqData<Session>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let session = session
        .map(|s| s.into_inner())
        .unwrap_or(Session::Anonymous);

    execute_in_session(&schema, session, req.into_inner())
        .await
        .into()
}

/// SDL endpoint for client code generation
pub async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(schema.sdl())
}

pub async fn playground_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub async fn health_handler() -> &'static str {
    "ok"
}

/// Register all routes; the playground only when enabled
pub fn configure_routes(playground: bool) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.route("/graphql", web::post().to(graphql_handler))
            .route("/graphql/schema", web::get().to(schema_handler))
            .route("/schema", web::get().to(schema_handler))
            .route("/health", web::get().to(health_handler));

        if playground {
            cfg.route("/playground", web::get().to(playground_handler));
        }
    }
}
