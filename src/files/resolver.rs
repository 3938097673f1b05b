use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::http::response::Response;

/// Extensions that may be served; everything else that exists is forbidden.
const SERVABLE_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Maps request paths to files under a root directory.
///
/// The root is canonicalized once, on construction. No path resolved through
/// this type can produce a file outside of it.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    root: PathBuf,
}

impl StaticResolver {
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Produces the response for `path`.
    ///
    /// Never fails: escaping the root and non-HTML files give 403, missing
    /// files give 404, other filesystem errors give 500.
    pub fn resolve(&self, path: &str) -> Response {
        let relative = path.strip_prefix('/').unwrap_or(path);
        let candidate = normalize(&self.root.join(relative));

        if !candidate.starts_with(&self.root) {
            debug!(path, "request escapes the server root");
            return Response::forbidden();
        }

        // Symlinks inside the root may still point outside of it.
        let target = match candidate.canonicalize() {
            Ok(target) => target,
            Err(e) => return error_response(path, &e),
        };
        if !target.starts_with(&self.root) {
            debug!(path, "request resolves outside the server root");
            return Response::forbidden();
        }

        if !is_servable(&candidate) {
            return Response::forbidden();
        }

        match fs::read(&target) {
            Ok(contents) => Response::html(contents),
            Err(e) => error_response(path, &e),
        }
    }
}

/// One-shot form of [`StaticResolver::resolve`].
pub fn resolve(path: &str, root: impl AsRef<Path>) -> Response {
    match StaticResolver::new(root) {
        Ok(resolver) => resolver.resolve(path),
        Err(e) => error_response(path, &e),
    }
}

fn is_servable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SERVABLE_EXTENSIONS.contains(&ext))
}

fn error_response(path: &str, e: &io::Error) -> Response {
    if e.kind() == io::ErrorKind::NotFound {
        return Response::not_found();
    }
    warn!(path, error = %e, "failed to read static file");
    Response::internal_error()
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
