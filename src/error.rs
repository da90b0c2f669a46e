//! Error types for the registry.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Top-level error type for the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Pool build error: {0}")]
    PoolBuild(#[from] deadpool_postgres::BuildError),

    #[error("Pool runtime error: {0}")]
    PoolRuntime(#[from] deadpool_postgres::PoolError),
}

impl DatabaseError {
    /// `true` when this error is the unique-violation SQLSTATE (`23505`).
    ///
    /// Concurrent publishers and concurrent star/unstar race on unique
    /// indexes; the loser must translate this into `ApiError::Conflict`
    /// rather than a generic 500.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Postgres(e) => e
                .code()
                .is_some_and(|c| c.code() == "23505"),
            _ => false,
        }
    }
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found at key {key}")]
    NotFound { key: String },

    #[error("Upload failed for key {key}: {reason}")]
    UploadFailed { key: String, reason: String },

    #[error("Download failed for key {key}: {reason}")]
    DownloadFailed { key: String, reason: String },

    #[error("Health check failed: {reason}")]
    HealthCheckFailed { reason: String },
}

/// Manifest parsing/validation errors (§4.1 Manifest Parser).
///
/// Each variant's message carries the grep-friendly substring required by
/// boundary-case tests (e.g. `"3-64"`, `"consecutive"`, `"semver"`).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Missing frontmatter: expected '---' delimiters at the top of SKILL.md")]
    MissingFrontmatter,

    #[error("Invalid YAML frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Field 'name' is required")]
    MissingName,

    #[error("Field 'name' must be 3-64 characters, got {0}")]
    NameLength(usize),

    #[error("Field 'name' must match [a-z0-9-]")]
    NameCharset,

    #[error("Field 'name' must not contain consecutive hyphens '--'")]
    NameConsecutiveHyphens,

    #[error("Field 'name' must not start or end with a hyphen")]
    NameHyphenEdge,

    #[error("Field 'version' is required")]
    MissingVersion,

    #[error("Field 'version' must be valid semver, got '{0}'")]
    InvalidSemver(String),

    #[error("Field 'description' is required")]
    MissingDescription,

    #[error("Field 'description' must be 1-256 characters, got {0}")]
    DescriptionLength(usize),

    #[error("Field 'author' is required")]
    MissingAuthor,

    #[error("Field 'tags' allows max 10 items, got {0}")]
    TooManyTags(usize),

    #[error("Tag '{0}' must match [a-z0-9-]{{1,32}}")]
    InvalidTag(String),

    #[error("Skill name '{name}' cannot contain 'anthropic' or 'claude' for Claude-compatible skills")]
    ClaudeNameConstraint { name: String },
}

/// Bundle extraction errors (§4.2 Bundle Extractor).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BundleError {
    #[error("Invalid .tar.gz file")]
    InvalidArchive,

    #[error("Path traversal detected: {0}")]
    PathTraversal(String),

    #[error("Decompressed size exceeds {max} bytes limit")]
    DecompressedTooLarge { max: u64 },

    #[error("No SKILL.md found in bundle")]
    ManifestNotFound,

    #[error("IO error extracting bundle: {0}")]
    Io(String),
}

/// The HTTP-facing error enum. Every handler returns `Result<T, ApiError>`.
///
/// Infrastructure failures collapse to `Internal` — the client never sees
/// internal exception text, only a correlation id to hand to operators.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge,
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Bundle exceeds size limit".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(correlation_id) => {
                tracing::error!(correlation_id, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ManifestError> for ApiError {
    fn from(e: ManifestError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<BundleError> for ApiError {
    fn from(e: BundleError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        if e.is_unique_violation() {
            return ApiError::Conflict("already exists".to_string());
        }
        let correlation_id = uuid::Uuid::new_v4().to_string();
        tracing::error!(correlation_id, error = %e, "database error");
        ApiError::Internal(correlation_id)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        tracing::error!(correlation_id, error = %e, "storage error");
        ApiError::Internal(correlation_id)
    }
}

/// Result type alias for the registry.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingRequired {
            key: "DATABASE_URL".to_string(),
            hint: "Set DATABASE_URL".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Set DATABASE_URL"));
    }

    #[test]
    fn manifest_error_messages_are_grep_friendly() {
        assert!(ManifestError::NameLength(2).to_string().contains("3-64"));
        assert!(
            ManifestError::NameCharset
                .to_string()
                .contains("[a-z0-9-]")
        );
        assert!(
            ManifestError::NameConsecutiveHyphens
                .to_string()
                .contains("consecutive")
        );
        assert!(
            ManifestError::NameHyphenEdge
                .to_string()
                .contains("hyphen")
        );
        assert!(
            ManifestError::InvalidSemver("1.0".to_string())
                .to_string()
                .contains("semver")
        );
    }

    #[test]
    fn bundle_error_messages_are_grep_friendly() {
        assert!(
            BundleError::PathTraversal("../escape".to_string())
                .to_string()
                .contains("traversal")
        );
        assert!(
            BundleError::DecompressedTooLarge { max: 10 }
                .to_string()
                .contains("Decompressed")
        );
    }

    #[test]
    fn claude_constraint_message_contains_claude() {
        let err = ManifestError::ClaudeNameConstraint {
            name: "claude-helper".to_string(),
        };
        assert!(err.to_string().contains("claude"));
    }

    #[test]
    fn database_error_unique_violation_false_for_non_postgres_variants() {
        let err = DatabaseError::Query("oops".to_string());
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn top_level_error_from_conversions() {
        let config_err = ConfigError::MissingEnvVar("TEST".to_string());
        let err: RegistryError = config_err.into();
        assert!(matches!(err, RegistryError::Config(_)));

        let manifest_err = ManifestError::MissingName;
        let err: RegistryError = manifest_err.into();
        assert!(matches!(err, RegistryError::Manifest(_)));
    }
}
