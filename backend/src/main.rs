//! Backend entry-point: wires adapters, REST endpoints, and OpenAPI docs.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use campus_market::domain::ports::UserRepository;
use campus_market::domain::user::{Role, User, UserId};
use campus_market::inbound::http::health::{live, ready, HealthState};
use campus_market::inbound::http::state::HttpState;
use campus_market::inbound::http;
use campus_market::outbound::persistence::{
    MemoryListingRepository, MemoryLoginService, MemoryUserRepository,
};
#[cfg(debug_assertions)]
use campus_market::ApiDoc;
use campus_market::Trace;

/// Server configuration, sourced from flags or the environment.
#[derive(Debug, Parser)]
#[command(name = "campus-market", about = "Campus marketplace backend")]
struct Config {
    /// Socket address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// Path to the session signing key material.
    #[arg(long, env = "SESSION_KEY_FILE", default_value = "/var/run/secrets/session_key")]
    session_key_file: String,

    /// Allow an ephemeral session key when the key file is unreadable.
    #[arg(long, env = "SESSION_ALLOW_EPHEMERAL")]
    session_allow_ephemeral: bool,

    /// Set the Secure attribute on session cookies.
    #[arg(
        long,
        env = "SESSION_COOKIE_SECURE",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    cookie_secure: bool,

    /// Email for the bootstrap admin account.
    #[arg(long, env = "ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// Password for the bootstrap admin account.
    #[arg(long, env = "ADMIN_PASSWORD")]
    admin_password: Option<String>,
}

impl Config {
    fn session_key(&self) -> std::io::Result<Key> {
        match std::fs::read(&self.session_key_file) {
            Ok(bytes) => Ok(Key::derive_from(&bytes)),
            Err(e) => {
                if cfg!(debug_assertions) || self.session_allow_ephemeral {
                    warn!(path = %self.session_key_file, error = %e, "using temporary session key (dev only)");
                    Ok(Key::generate())
                } else {
                    Err(std::io::Error::other(format!(
                        "failed to read session key at {}: {e}",
                        self.session_key_file
                    )))
                }
            }
        }
    }
}

/// Seed the bootstrap admin account when credentials are configured.
async fn seed_admin(
    config: &Config,
    users: &MemoryUserRepository,
    login: &MemoryLoginService,
) -> std::io::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        warn!("no admin credentials configured; moderation endpoints are unreachable");
        return Ok(());
    };

    let mut admin = User::new(UserId::random(), email.clone(), "Administrator", chrono::Utc::now());
    admin.role = Role::Admin;
    admin.onboarding_completed = true;
    login
        .register(email, password, admin.id)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let admin_id = admin.id;
    users
        .insert(&admin)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(admin = %admin_id, "bootstrap admin account seeded");
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = Config::parse();
    let key = config.session_key()?;
    let cookie_secure = config.cookie_secure;

    let users = Arc::new(MemoryUserRepository::new());
    let listings = Arc::new(MemoryListingRepository::new());
    let login = Arc::new(MemoryLoginService::new());
    seed_admin(&config, &users, &login).await?;

    let state = web::Data::new(HttpState::new(users, listings, login));
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let api = web::scope("/api/v1")
            .wrap(session)
            .configure(http::configure_api);

        let app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "server listening");
    server.run().await
}
