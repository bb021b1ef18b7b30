// src/config/validate.rs

use std::path::PathBuf;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile, ServerSection};
use crate::errors::{Result, WaitserveError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WaitserveError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_server(&raw.server)?;
        Ok(ConfigFile::new_unchecked(raw.server))
    }
}

fn validate_server(server: &ServerSection) -> Result<()> {
    if !server.prefix.starts_with('/') {
        return Err(WaitserveError::ConfigError(format!(
            "[server].prefix must start with '/' (got {:?})",
            server.prefix
        )));
    }

    if server.port == 0 {
        return Err(WaitserveError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }

    if server.bind.trim().is_empty() {
        return Err(WaitserveError::ConfigError(
            "[server].bind must not be empty".to_string(),
        ));
    }

    Ok(())
}

impl ConfigFile {
    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(self, args: &CliArgs) -> Result<ConfigFile> {
        let mut server = self.server;

        if let Some(root) = &args.root {
            server.root = Some(root.clone());
        }
        if let Some(bind) = &args.bind {
            server.bind = bind.clone();
        }
        if let Some(port) = args.port {
            server.port = port;
        }
        if let Some(prefix) = &args.prefix {
            server.prefix = prefix.clone();
        }
        if let Some(secs) = args.wait_timeout {
            server.wait_timeout_secs = secs;
        }

        ConfigFile::try_from(RawConfigFile { server })
    }

    /// The served directory, canonicalized.
    ///
    /// Fails if no root was configured or if it is not an existing directory.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        let root = self.server.root.as_ref().ok_or_else(|| {
            WaitserveError::ConfigError(
                "no directory to serve; pass ROOT or set [server].root".to_string(),
            )
        })?;

        let canonical = root.canonicalize().map_err(|e| {
            WaitserveError::ConfigError(format!(
                "root directory {} is not accessible: {e}",
                root.display()
            ))
        })?;

        if !canonical.is_dir() {
            return Err(WaitserveError::ConfigError(format!(
                "root path is not a directory: {}",
                canonical.display()
            )));
        }

        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(server: ServerSection) -> RawConfigFile {
        RawConfigFile { server }
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.prefix, "/");
        assert_eq!(cfg.wait_timeout(), None);
        assert_eq!(cfg.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn prefix_without_leading_slash_is_rejected() {
        let server = ServerSection {
            prefix: "static".to_string(),
            ..ServerSection::default()
        };
        match ConfigFile::try_from(raw(server)) {
            Err(WaitserveError::ConfigError(msg)) => assert!(msg.contains("prefix")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn zero_port_is_rejected() {
        let server = ServerSection {
            port: 0,
            ..ServerSection::default()
        };
        assert!(ConfigFile::try_from(raw(server)).is_err());
    }

    #[test]
    fn missing_root_is_a_config_error() {
        let cfg = ConfigFile::default();
        assert!(matches!(
            cfg.resolve_root(),
            Err(WaitserveError::ConfigError(_))
        ));
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();

        let mut cfg = ConfigFile::default();
        cfg.server.root = Some(file);
        assert!(cfg.resolve_root().is_err());

        cfg.server.root = Some(dir.path().to_path_buf());
        assert_eq!(cfg.resolve_root().unwrap(), dir.path().canonicalize().unwrap());
    }
}
