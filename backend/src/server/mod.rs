//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{Backend, ServerConfig};
pub use state_builders::build_ports;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use fictures::Trace;
use fictures::inbound::http::configure;
use fictures::inbound::http::health::{HealthState, live, ready};
use fictures::inbound::http::posts::not_found;
use fictures::inbound::http::session_config::SessionSettings;
use fictures::inbound::http::session_config::fingerprint::key_fingerprint;
use fictures::inbound::http::state::HttpState;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionCookie,
}

#[derive(Clone)]
struct SessionCookie {
    key: actix_web::cookie::Key,
    secure: bool,
    same_site: actix_web::cookie::SameSite,
    ttl: actix_web::cookie::time::Duration,
}

impl From<SessionSettings> for SessionCookie {
    fn from(settings: SessionSettings) -> Self {
        Self {
            key: settings.key,
            secure: settings.cookie_secure,
            same_site: settings.same_site,
            ttl: settings.ttl,
        }
    }
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), session.key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(session.secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(session.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(session.ttl))
        .build();

    let screens = web::scope("")
        .wrap(session)
        .configure(configure)
        .default_service(web::to(not_found));

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(ready)
        .service(live)
        .service(screens)
}

/// Construct an Actix HTTP server from `config`.
///
/// The readiness check flips once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the ports cannot be built or the socket
/// cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let bind_addr = config.bind_addr();
    let ServerConfig {
        session, backend, ..
    } = config;
    info!(key_fingerprint = %key_fingerprint(&session.key), "session key loaded");
    let http_state = web::Data::new(HttpState::from(build_ports(backend)?));
    let session = SessionCookie::from(session);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
