use std::sync::Arc;

use log::info;
use tokio::net::TcpListener;

use crate::chart::clear_rendered_images;
use crate::context::AppContext;

pub mod api;
pub mod routes;
pub mod static_files;

/// Clear stale images, bind, and serve until the process is stopped.
pub async fn run_server(ctx: Arc<AppContext>) -> std::io::Result<()> {
    clear_rendered_images(&ctx.config.image_dir);

    let listener = TcpListener::bind(&ctx.config.bind_addr).await?;
    info!("worldpop server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, routes::router(ctx)).await
}
