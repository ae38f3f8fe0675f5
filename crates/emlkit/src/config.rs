//! Message builder configuration.

use emlkit_mime::encoding::MAX_LINE_LENGTH;

/// Prefix of generated multipart boundaries.
pub const DEFAULT_BOUNDARY_PREFIX: &str = "----=";

/// Content type used for attachments that do not declare one.
pub const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// Message builder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Line length of Base64 attachment bodies.
    pub wrap_width: usize,
    /// Prefix prepended to generated boundary tokens.
    pub boundary_prefix: String,
    /// Content type for attachments without one.
    pub default_content_type: String,
    /// Convert bare line feeds in text and HTML bodies to CRLF.
    pub normalize_line_endings: bool,
}

impl Config {
    /// Creates the default configuration (76-column wrapping, `----=`
    /// boundary prefix, CRLF normalization on).
    #[must_use]
    pub fn new() -> Self {
        Self {
            wrap_width: MAX_LINE_LENGTH,
            boundary_prefix: DEFAULT_BOUNDARY_PREFIX.to_string(),
            default_content_type: DEFAULT_ATTACHMENT_TYPE.to_string(),
            normalize_line_endings: true,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for message builder configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    /// Sets the Base64 line length. Zero disables wrapping.
    #[must_use]
    pub const fn wrap_width(mut self, width: usize) -> Self {
        self.config.wrap_width = width;
        self
    }

    /// Sets the prefix of generated boundaries.
    #[must_use]
    pub fn boundary_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.boundary_prefix = prefix.into();
        self
    }

    /// Sets the content type for attachments that do not declare one.
    #[must_use]
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.default_content_type = content_type.into();
        self
    }

    /// Enables or disables CRLF normalization of text and HTML bodies.
    #[must_use]
    pub const fn normalize_line_endings(mut self, enabled: bool) -> Self {
        self.config.normalize_line_endings = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.wrap_width, 76);
        assert_eq!(config.boundary_prefix, "----=");
        assert_eq!(config.default_content_type, "application/octet-stream");
        assert!(config.normalize_line_endings);
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .wrap_width(64)
            .boundary_prefix("=_")
            .default_content_type("application/pdf")
            .normalize_line_endings(false)
            .build();

        assert_eq!(config.wrap_width, 64);
        assert_eq!(config.boundary_prefix, "=_");
        assert_eq!(config.default_content_type, "application/pdf");
        assert!(!config.normalize_line_endings);
    }
}
