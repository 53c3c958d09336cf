use actix_web::{web, HttpRequest, HttpResponse};

use super::AppState;
use crate::{
    error::GenError,
    models::{
        ErrorBody, GenerateBlogRequest, GenerateImageRequest, GenerateImageResult,
        GenerateTextRequest, GenerateTextResult, HealthReport,
    },
};

/// Logs one line per failed request and hands the error back for rendering.
fn report(route: &str, err: GenError) -> GenError {
    match (err.provider(), err.log_detail()) {
        (Some(provider), Some(detail)) => log::error!(
            "{} failed [{} {} {}]: {}: {}",
            route,
            provider,
            err.status_code(),
            err.kind(),
            err,
            detail
        ),
        (Some(provider), None) => log::error!(
            "{} failed [{} {} {}]: {}",
            route,
            provider,
            err.status_code(),
            err.kind(),
            err
        ),
        (None, _) => log::warn!("{} rejected [{}]: {}", route, err.kind(), err),
    }
    err
}

pub async fn generate_text(
    state: web::Data<AppState>,
    body: web::Json<GenerateTextRequest>,
) -> Result<HttpResponse, GenError> {
    let prompt = body.prompt().map_err(|e| report("/generate", e))?;
    let response = state
        .client
        .generate_text(prompt)
        .await
        .map_err(|e| report("/generate", e))?;

    Ok(HttpResponse::Ok().json(GenerateTextResult { response }))
}

pub async fn generate_image(
    state: web::Data<AppState>,
    body: web::Json<GenerateImageRequest>,
) -> Result<HttpResponse, GenError> {
    let prompt = body.prompt().map_err(|e| report("/generate-image", e))?;
    let image_url = state
        .client
        .generate_image(prompt)
        .await
        .map_err(|e| report("/generate-image", e))?;

    Ok(HttpResponse::Ok().json(GenerateImageResult { image_url }))
}

pub async fn generate_blog(
    state: web::Data<AppState>,
    body: web::Json<GenerateBlogRequest>,
) -> Result<HttpResponse, GenError> {
    let params = body.validate().map_err(|e| report("/generate-blog", e))?;
    let article = state
        .client
        .generate_blog(&params)
        .await
        .map_err(|e| report("/generate-blog", e))?;

    Ok(HttpResponse::Ok().json(article))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthReport {
        status: "ok".to_string(),
        text_provider: state.client.text().name().to_string(),
        image_provider: state.client.image().name().to_string(),
        schema_misses: state.client.schema_misses(),
    })
}

pub async fn api_not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        error: format!("No API route for {} {}", req.method(), req.path()),
        details: None,
    })
}
