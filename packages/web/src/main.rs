use dioxus::prelude::*;

use map::MapConfig;
use ui::{AuthModal, AuthModalView, AuthProvider, Header, MapView, ThemeProvider};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Home {},
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        tokio::runtime::Runtime::new()
            .expect("Failed to start tokio runtime")
            .block_on(launch_server());
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
async fn launch_server() {
    use api::config::ServerConfig;
    use api::geocode::Geocoder;
    use api::store::PgUserStore;
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use tower_sessions::cookie::{time::Duration, SameSite};
    use tower_sessions::{Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    // Initialize database pool
    let pool = api::db::get_pool()
        .await
        .expect("Failed to connect to database");

    api::db::run_migrations(pool)
        .await
        .expect("Failed to run migrations");

    // Sessions live in PostgreSQL next to the users
    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .expect("Failed to migrate session store");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.session_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            config.session_ttl_hours,
        )));

    let geocoder = Geocoder::new(&config.nominatim_url).expect("Failed to build HTTP client");

    let router = axum::Router::new()
        // REST API first
        .merge(api::routes::router(PgUserStore::new(pool.clone()), geocoder))
        // Then serve the Dioxus application
        .serve_dioxus_application(ServeConfig::new(), App)
        // Add session layer to all routes
        .layer(session_layer);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router.into_make_service()).await {
        tracing::error!("Server error: {}", e);
    }
}

/// Map settings compiled in from `parkspot.toml`.
fn load_map_config() -> MapConfig {
    MapConfig::from_toml(include_str!("../parkspot.toml")).unwrap_or_else(|e| {
        tracing::warn!("Ignoring invalid {}: {}", MapConfig::filename(), e);
        MapConfig::default()
    })
}

#[component]
fn App() -> Element {
    let map_config = use_hook(load_map_config);
    use_context_provider(|| map_config);

    let auth_modal = use_signal(AuthModal::default);
    use_context_provider(|| auth_modal);

    rsx! {
        // Global app resources
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        document::Link { rel: "stylesheet", href: ui::PARKSPOT_CSS }

        ThemeProvider {
            AuthProvider {
                Router::<Route> {}
            }
        }
    }
}

#[component]
fn Home() -> Element {
    rsx! {
        div {
            class: "app",
            Header {}
            MapView {}
            AuthModalView {}
        }
    }
}

/// Unknown paths show a link back to the map.
#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div {
            class: "not-found",
            h2 { "Nothing at /{path}" }
            Link { to: Route::Home {}, "Back to the map" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_map_config_parses() {
        let config = MapConfig::from_toml(include_str!("../parkspot.toml")).unwrap();
        assert_eq!(config, MapConfig::default());
    }
}
