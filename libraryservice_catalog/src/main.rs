// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
#[cfg(feature = "server")]
fn init_telemetry() {
    use opentelemetry::global;
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use opentelemetry_sdk::runtime::TokioCurrentThread;
    use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{EnvFilter, Registry};

    let app_name = "libraryservice_catalog";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

#[cfg(feature = "server")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use std::sync::Arc;

    use actix_web::{App, HttpServer};
    use paperclip::actix::{web, OpenApiExt};
    use tracing_actix_web::TracingLogger;

    use libraryservice_catalog::app_config::config_app;
    use libraryservice_catalog::catalog_repository::{
        CatalogRepository, InMemoryCatalogRepository, PostgresCatalogRepository,
        PostgresCatalogRepositoryConfig,
    };
    use libraryservice_catalog::favorites_repository::{
        FavoritesRepository, InMemoryFavoritesRepository, PostgresFavoritesRepository,
        PostgresFavoritesRepositoryConfig,
    };
    use libraryservice_catalog::reviews_repository::{
        InMemoryReviewsRepository, PostgresReviewsRepository, PostgresReviewsRepositoryConfig,
        ReviewsRepository,
    };
    use libraryservice_catalog::settings::Settings;
    use libraryservice_catalog::users_repository::{
        InMemoryUsersRepository, PostgresUsersRepository, PostgresUsersRepositoryConfig,
        UsersRepository,
    };

    init_telemetry();

    let settings = Settings::load().expect("Failed to load settings");
    println!(
        "starting HTTP server at http://{}:{}",
        settings.host, settings.port
    );

    let catalog_repository: Arc<dyn CatalogRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryCatalogRepository::default())
    } else {
        Arc::new(
            PostgresCatalogRepository::init(PostgresCatalogRepositoryConfig {
                hostname: settings.db_host.clone(),
                username: settings.db_username.clone(),
                password: settings.db_password.clone(),
            })
            .await
            .expect("Failed to init postgres"),
        )
    };
    let reviews_repository: Arc<dyn ReviewsRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryReviewsRepository::default())
    } else {
        Arc::new(
            PostgresReviewsRepository::init(PostgresReviewsRepositoryConfig {
                hostname: settings.db_host.clone(),
                username: settings.db_username.clone(),
                password: settings.db_password.clone(),
            })
            .await
            .expect("Failed to init postgres"),
        )
    };
    let favorites_repository: Arc<dyn FavoritesRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryFavoritesRepository::default())
    } else {
        Arc::new(
            PostgresFavoritesRepository::init(PostgresFavoritesRepositoryConfig {
                hostname: settings.db_host.clone(),
                username: settings.db_username.clone(),
                password: settings.db_password.clone(),
            })
            .await
            .expect("Failed to init postgres"),
        )
    };
    let users_repository: Arc<dyn UsersRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryUsersRepository::default())
    } else {
        Arc::new(
            PostgresUsersRepository::init(PostgresUsersRepositoryConfig {
                hostname: settings.db_host.clone(),
                username: settings.db_username.clone(),
                password: settings.db_password.clone(),
            })
            .await
            .expect("Failed to init postgres"),
        )
    };

    let bind_addr = (settings.host.clone(), settings.port);
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(catalog_repository.clone()))
            .app_data(web::Data::new(reviews_repository.clone()))
            .app_data(web::Data::new(favorites_repository.clone()))
            .app_data(web::Data::new(users_repository.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(bind_addr)?
    .run()
    .await
}

#[cfg(not(feature = "server"))]
fn main() {
    eprintln!("libraryservice_catalog was built without the server feature");
}
