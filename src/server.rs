use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, warn};

use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::feed::{FeedController, FormState, PostForm};
use crate::metrics::{MetricHandler, MetricSender, MetricWriter};
use crate::query_string::QueryString;

struct AppState {
    controller: FeedController,
    metrics: MetricSender,
    public_dir: PathBuf,
}

fn request_origin(req: &HttpRequest) -> String {
    // Proxy-supplied address first; everything else counts as one origin
    match req.headers().get("x-forwarded-for") {
        Some(v) => v.to_str().unwrap_or("unknown").to_string(),
        None => "unknown".to_string(),
    }
}

fn html_response(body: String) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Page-load trigger: fetch, sort and render the feed, plus the publish
/// form prefilled from the query string (author fields survive a redirect).
#[web::get("/")]
async fn feed_page(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let form = match req.uri().query() {
        Some(query_str) => QueryString::from(query_str).author_prefill(),
        None => FormState::default(),
    };

    state.metrics.feed_view(request_origin(&req)).await;

    match state.controller.render_page(&form, vec![]).await {
        Ok(rendered) => html_response(rendered),
        Err(e) => {
            error!("Error rendering feed page: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering feed page: {}", e))
        }
    }
}

/// Form-submit trigger. On success, redirect back to the feed with only the
/// author fields kept (so the re-fetch shows the new post and the form comes
/// back cleared). On failure, re-render the page with the banner and every
/// field value still in place; the attempt itself is lost.
#[web::post("/posts")]
async fn publish_post(
    req: HttpRequest,
    form: web::types::Form<PostForm>,
    state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let form = form.into_inner();
    let retained = form.cleared();
    let filled = form.filled();
    let new_post = form.into_new_post();

    match state.controller.submit(&new_post).await {
        Ok(_post) => {
            state.metrics.publish(request_origin(&req)).await;

            let query = serde_urlencoded::to_string([
                ("authorName", retained.author_name.as_str()),
                ("authorEmail", retained.author_email.as_str()),
            ]).unwrap_or_default();

            web::HttpResponse::SeeOther()
                .header("Location", format!("/?{}", query))
                .finish()
        }
        Err(err) => {
            error!("Error adding blog post: {}", err);
            let errors = vec![format!("Failed to publish post: {}", err.user_message())];
            match state.controller.render_page(&filled, errors).await {
                Ok(rendered) => html_response(rendered),
                Err(e) => web::HttpResponse::InternalServerError()
                    .body(format!("Error rendering feed page: {}", e)),
            }
        }
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.public_dir.join(path.into_inner());

    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let metrics = match config.metrics {
        Some(ref metrics_cfg) => match metrics_cfg.location {
            Some(ref location) => {
                let slot_size = Duration::seconds(metrics_cfg.time_slot_secs.unwrap_or(60));
                match MetricWriter::new(location, slot_size) {
                    Ok(writer) => Some(MetricHandler::new(writer)),
                    Err(e) => {
                        warn!("Error creating metric writer. Metrics disabled. Desc={}", e);
                        None
                    }
                }
            }
            None => None,
        },
        None => None,
    };

    let metric_sender = match metrics {
        Some(ref handler) => handler.new_sender(),
        None => MetricHandler::no_op(),
    };

    let controller = FeedController::new(
        BackendClient::new(&config.backend.base_url),
        config.paths.template_dir.clone(),
    );

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        controller,
        metrics: metric_sender,
        public_dir: config.paths.public_dir.clone(),
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(feed_page)
            .service(publish_post)
            .service(public_files)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
