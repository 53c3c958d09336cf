pub mod handlers;
pub mod static_files;

use crate::{
    config::Config,
    error::{GenError, Result},
    models::ErrorBody,
    providers::GenerationClient,
};
use actix_cors::Cors;
use actix_web::{
    http::StatusCode, middleware, web, App, HttpResponse, HttpServer, ResponseError,
};

pub struct AppState {
    pub client: GenerationClient,
}

impl AppState {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }
}

impl ResponseError for GenError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(GenError::status_code(self)).unwrap_or(StatusCode::BAD_GATEWAY)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self)).json(ErrorBody {
            error: self.to_string(),
            details: self.details().cloned(),
        })
    }
}

/// Malformed JSON bodies get the same error shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        log::warn!("{} rejected malformed body: {}", req.path(), err);
        GenError::InvalidInput(err.to_string()).into()
    })
}

pub fn cors(origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600);
    match origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

/// Registers the API routes. Unknown `/api/*` paths get a JSON 404.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/generate", web::post().to(handlers::generate_text))
        .route("/generate-image", web::post().to(handlers::generate_image))
        .route("/generate-blog", web::post().to(handlers::generate_blog))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .default_service(web::to(handlers::api_not_found)),
        );
}

pub async fn run(config: Config) -> Result<()> {
    let client = GenerationClient::from_config(&config)?;
    let state = web::Data::new(AppState::new(client));
    let static_dir = static_files::resolve(config.static_dir.as_deref());
    let cors_origin = config.cors_origin.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(cors_origin.as_deref()))
            .wrap(middleware::Logger::new("%r -> %s in %Dms"))
            .configure(configure_api)
            .configure(|cfg| static_files::configure(cfg, static_dir.clone()))
    })
    .bind((config.host(), config.port()))
    .map_err(|e| {
        GenError::ServerError(format!(
            "failed to bind {}:{}: {}",
            config.host(),
            config.port(),
            e
        ))
    })?;

    log::info!("🚀 Server running at http://{}:{}", config.host(), config.port());
    server
        .run()
        .await
        .map_err(|e| GenError::ServerError(e.to_string()))
}
