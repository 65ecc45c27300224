use repokit_core::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProfileError>;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Invalid profile '{candidate}'. Valid profiles: {valid}")]
    InvalidProfile { candidate: String, valid: String },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed profile state in {}: {reason}", .path.display())]
    MalformedState { path: PathBuf, reason: String },

    #[error("Invalid hook fragment {}: {reason}", .path.display())]
    InvalidFragment { path: PathBuf, reason: String },

    #[error("Invalid check name '{0}'")]
    InvalidCheckName(String),

    #[error("Project is not initialized (no {})", .0.display())]
    NotInitialized(PathBuf),

    #[error("Refusing to overwrite {}, which repokit did not generate", .0.display())]
    UnmanagedFile(PathBuf),

    #[error("Failed to render merged config: {0}")]
    Render(String),
}

impl ProfileError {
    pub(crate) fn filesystem(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ProfileError::Filesystem {
            action,
            path,
            source,
        }
    }

    /// Shared error code for reporting
    pub fn code(&self) -> ErrorCode {
        match self {
            ProfileError::InvalidProfile { .. } => ErrorCode::InvalidProfile,
            ProfileError::Filesystem { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
                _ => ErrorCode::IoError,
            },
            ProfileError::MalformedState { .. } => ErrorCode::MalformedState,
            ProfileError::InvalidFragment { .. } => ErrorCode::InvalidFragment,
            ProfileError::InvalidCheckName(_) => ErrorCode::InvalidInput,
            ProfileError::NotInitialized(_) => ErrorCode::NotInitialized,
            ProfileError::UnmanagedFile(_) => ErrorCode::UnmanagedFile,
            ProfileError::Render(_) => ErrorCode::Internal,
        }
    }

    /// Recovery hint shown under the error message
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ProfileError::InvalidProfile { valid, .. } => {
                Some(format!("Choose one of: {}", valid))
            }
            ProfileError::MalformedState { .. } => {
                Some("Run `repokit set <profile>` to rewrite the state file".to_string())
            }
            ProfileError::NotInitialized(_) => {
                Some("Run `repokit init` first".to_string())
            }
            ProfileError::UnmanagedFile(path) => Some(format!(
                "Move {} aside, then run `repokit update`",
                path.display()
            )),
            ProfileError::InvalidCheckName(_) => {
                Some("Use the hook id as it appears in .pre-commit-config.yaml".to_string())
            }
            _ => None,
        }
    }
}

impl From<ProfileError> for repokit_core::Error {
    fn from(err: ProfileError) -> Self {
        let mut converted = repokit_core::Error::new(err.code(), err.to_string());
        if let Some(suggestion) = err.suggestion() {
            converted = converted.with_suggestion(suggestion);
        }
        converted.with_source(err)
    }
}
