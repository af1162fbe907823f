//! Static file serving module
//!
//! Maps request paths onto files under the root directory and turns the
//! loaded file into a response (conditional, range or full).

use crate::config::StaticFilesConfig;
use crate::error::ResolveError;
use crate::handler::listing::{DirectoryListing, ListingEntry};
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, RangeParseResult, Validators};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// Outcome of a successful resolution
#[derive(Debug)]
pub enum Resolved {
    /// A readable regular file
    File(StaticFile),
    /// A directory without index file, listing enabled
    Listing(DirectoryListing),
    /// A directory requested without its trailing slash
    DirectoryRedirect,
}

/// File loaded from under the root
#[derive(Debug, Clone)]
pub struct StaticFile {
    pub content: Bytes,
    pub content_type: &'static str,
    pub modified: Option<SystemTime>,
}

impl StaticFile {
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn validators(&self) -> Validators {
        Validators {
            etag: cache::generate_etag(self.size(), self.modified),
            last_modified: self.modified.map(cache::http_date),
        }
    }
}

/// Percent-decoded, normalized request path
///
/// `.` and empty segments are dropped and `..` removes the previous segment.
/// A `..` that would climb above the root is rejected rather than clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    trailing_slash: bool,
}

impl RequestPath {
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| ResolveError::NotFound)?;
        if decoded.contains('\0') {
            return Err(ResolveError::NotFound);
        }

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(ResolveError::Forbidden);
                    }
                }
                name => {
                    // Backslashes and drive prefixes on Windows
                    let mut components = Path::new(name).components();
                    if !matches!(
                        (components.next(), components.next()),
                        (Some(Component::Normal(_)), None)
                    ) {
                        return Err(ResolveError::Forbidden);
                    }
                    segments.push(name.to_string());
                }
            }
        }

        Ok(Self {
            segments,
            trailing_slash: decoded.ends_with('/'),
        })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub const fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Path relative to the root, never absolute and never containing `..`
    pub fn relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

/// Directory-backed responder
///
/// Read-only with respect to the root; one instance is shared by all
/// connections.
#[derive(Debug, Clone)]
pub struct StaticResponder {
    root: PathBuf,
    index_files: Vec<String>,
    directory_listing: bool,
}

impl StaticResponder {
    /// Responder with the default index files and directory listing on
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let defaults = StaticFilesConfig::default();
        Self {
            root: root.into(),
            index_files: defaults.index_files,
            directory_listing: defaults.directory_listing,
        }
    }

    pub fn from_config(config: &StaticFilesConfig) -> Self {
        Self {
            root: config.root.clone(),
            index_files: config.index_files.clone(),
            directory_listing: config.directory_listing,
        }
    }

    #[must_use]
    pub fn with_index_files(mut self, index_files: Vec<String>) -> Self {
        self.index_files = index_files;
        self
    }

    #[must_use]
    pub const fn with_directory_listing(mut self, enabled: bool) -> Self {
        self.directory_listing = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a raw (percent-encoded) URL path against the root
    pub async fn resolve(&self, request_path: &str) -> Result<Resolved, ResolveError> {
        let request = RequestPath::parse(request_path)?;

        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            logger::log_warning(&format!(
                "Root directory not found or inaccessible '{}': {e}",
                self.root.display()
            ));
            ResolveError::from(e)
        })?;

        let requested = root.join(request.relative_path());
        let target = contain(&root, &requested, request_path).await?;
        let metadata = fs::metadata(&target).await?;

        if metadata.is_dir() {
            if !request.has_trailing_slash() && !request.is_root() {
                return Ok(Resolved::DirectoryRedirect);
            }
            return self.resolve_directory(&root, &target, request_path).await;
        }

        // Only directories are addressed with a trailing slash
        if request.has_trailing_slash() || !metadata.is_file() {
            return Err(ResolveError::NotFound);
        }

        load_file(&target, &requested, &metadata)
            .await
            .map(Resolved::File)
    }

    /// Serve the first index file present, else list or refuse
    async fn resolve_directory(
        &self,
        root: &Path,
        dir: &Path,
        request_path: &str,
    ) -> Result<Resolved, ResolveError> {
        for index_file in &self.index_files {
            let candidate = dir.join(index_file);
            match fs::metadata(&candidate).await {
                Ok(metadata) if metadata.is_file() => {
                    let target = contain(root, &candidate, request_path).await?;
                    return load_file(&target, &candidate, &metadata)
                        .await
                        .map(Resolved::File);
                }
                Ok(_) => {}
                Err(e) => match ResolveError::from(e) {
                    ResolveError::NotFound => {}
                    other => return Err(other),
                },
            }
        }

        if !self.directory_listing {
            return Err(ResolveError::NotFound);
        }

        let mut entries = Vec::new();
        let mut dir_entries = fs::read_dir(dir).await?;
        while let Some(entry) = dir_entries.next_entry().await? {
            // Follow symlinks so linked directories get their trailing slash
            let is_dir = fs::metadata(entry.path())
                .await
                .is_ok_and(|m| m.is_dir());
            entries.push(ListingEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }

        Ok(Resolved::Listing(DirectoryListing::new(entries)))
    }
}

/// Canonicalize `candidate` and require it to stay under `root`
///
/// Symlinks are followed, so a link pointing outside the root is refused.
async fn contain(root: &Path, candidate: &Path, request_path: &str) -> Result<PathBuf, ResolveError> {
    let canonical = fs::canonicalize(candidate).await?;
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        Err(ResolveError::Forbidden)
    }
}

/// Read a file; the content type comes from the requested name
async fn load_file(
    path: &Path,
    requested: &Path,
    metadata: &Metadata,
) -> Result<StaticFile, ResolveError> {
    let content = fs::read(path).await?;
    Ok(StaticFile {
        content_type: mime::content_type_for(requested),
        modified: metadata.modified().ok(),
        content: Bytes::from(content),
    })
}

/// Build static file response with conditional and Range support
pub fn build_static_file_response(
    file: StaticFile,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let validators = file.validators();

    if cache::is_not_modified(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
        &validators.etag,
        file.modified,
    ) {
        return http::build_304_response(&validators);
    }

    // Range applies to GET only
    let range_header = if ctx.is_head {
        None
    } else {
        ctx.range_header.as_deref()
    };

    match http::parse_range_header(range_header, file.size()) {
        RangeParseResult::Valid(range) => http::build_partial_response(
            &file.content,
            range,
            file.content_type,
            &validators,
            ctx.is_head,
        ),
        RangeParseResult::NotSatisfiable => http::build_416_response(file.size()),
        RangeParseResult::None => {
            http::build_file_response(file.content, file.content_type, &validators, ctx.is_head)
        }
    }
}
