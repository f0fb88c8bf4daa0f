//! Secret reference resolver.
//!
//! Credential values in `config.toml` can point at secrets stored outside
//! the file:
//!
//! - `env::VAR_NAME` reads `$VAR_NAME` from the environment
//! - `file::/path/to/secret` reads the first line of a file
//! - anything else is returned as-is (plain text)

use std::path::PathBuf;

use thiserror::Error;

/// Errors resolving a secret reference.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("environment variable `{0}` is not set")]
    EnvNotSet(String),

    #[error("failed to read secret file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret file {} is empty", .0.display())]
    EmptyFile(PathBuf),
}

/// Returns true if `value` is a reference rather than a literal secret.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("env::") || value.starts_with("file::")
}

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(var) = value.strip_prefix("env::") {
        resolve_env(var)
    } else if let Some(path) = value.strip_prefix("file::") {
        resolve_file(path)
    } else {
        Ok(value.to_string())
    }
}

fn resolve_env(var: &str) -> Result<String, SecretError> {
    std::env::var(var).map_err(|_| SecretError::EnvNotSet(var.to_string()))
}

/// Reads the first line of a file, without its line terminator.
fn resolve_file(path: &str) -> Result<String, SecretError> {
    let path = PathBuf::from(path);
    let content = std::fs::read_to_string(&path).map_err(|source| SecretError::File {
        path: path.clone(),
        source,
    })?;
    content
        .lines()
        .next()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .ok_or(SecretError::EmptyFile(path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("hello").unwrap(), "hello");
        assert_eq!(resolve("").unwrap(), "");
        assert_eq!(resolve("env:single-colon").unwrap(), "env:single-colon");
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_COASTWATCH_TEST_SECRET", "my-secret-value");
        }
        assert_eq!(
            resolve("env::_COASTWATCH_TEST_SECRET").unwrap(),
            "my-secret-value"
        );
        unsafe {
            std::env::remove_var("_COASTWATCH_TEST_SECRET");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_COASTWATCH_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(matches!(err, SecretError::EnvNotSet(_)));
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn file_prefix_reads_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file-secret  ").unwrap();
        writeln!(file, "ignored").unwrap();

        let reference = format!("file::{}", file.path().display());
        assert_eq!(resolve(&reference).unwrap(), "file-secret");
    }

    #[test]
    fn file_prefix_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let reference = format!("file::{}", dir.path().join("absent").display());
        assert!(matches!(
            resolve(&reference).unwrap_err(),
            SecretError::File { .. }
        ));
    }

    #[test]
    fn file_prefix_empty_file_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let reference = format!("file::{}", file.path().display());
        assert!(matches!(
            resolve(&reference).unwrap_err(),
            SecretError::EmptyFile(_)
        ));
    }

    #[test]
    fn detects_references() {
        assert!(is_reference("env::X"));
        assert!(is_reference("file::/run/secrets/x"));
        assert!(!is_reference("plain"));
    }
}
