//! Serve previously rendered chart images from the image directory.

use std::path::Path;

use tower_http::services::ServeDir;

/// `GET /img/<file>` -> `<image_dir>/<file>`. ServeDir rejects `..` traversal.
pub fn image_service(image_dir: &Path) -> ServeDir {
    ServeDir::new(image_dir)
}
