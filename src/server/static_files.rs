use actix_files::{Files, NamedFile};
use actix_web::{
    dev::{fn_service, ServiceRequest, ServiceResponse},
    web,
};
use std::path::{Path, PathBuf};

/// Returns the directory only when it holds an `index.html` to fall back to.
pub fn resolve(dir: Option<&Path>) -> Option<PathBuf> {
    let dir = dir?;
    if dir.join("index.html").is_file() {
        log::info!("Serving static files from {}", dir.display());
        Some(dir.to_path_buf())
    } else {
        log::warn!(
            "Static directory {} or its index.html not found, serving the API only",
            dir.display()
        );
        None
    }
}

/// Serves files from `dir`; any path that is not a file gets `index.html`.
/// Must be registered after the API routes.
pub fn configure(cfg: &mut web::ServiceConfig, dir: Option<PathBuf>) {
    let Some(dir) = dir else {
        return;
    };
    let index = dir.join("index.html");

    cfg.service(
        Files::new("/", dir)
            .index_file("index.html")
            .default_handler(fn_service(move |req: ServiceRequest| {
                let index = index.clone();
                async move {
                    let (req, _) = req.into_parts();
                    let file = NamedFile::open_async(&index).await?;
                    let res = file.into_response(&req);
                    Ok::<_, actix_web::Error>(ServiceResponse::new(req, res))
                }
            })),
    );
}
