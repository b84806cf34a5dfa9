//! Output configuration for change records
//!
//! Two dialects are supported:
//! - **JSON**: one compact JSON object per record
//! - **Plain**: `test_decoding`-style `name[type]:value` text
//!
//! # Example
//!
//! ```rust
//! use pgtext::common::{BeginPolicy, Dialect, FormatterConfig};
//!
//! // JSON records, BEGIN written as soon as the transaction starts
//! let json = FormatterConfig::json();
//! assert_eq!(json.begin_policy, BeginPolicy::Eager);
//!
//! // Plain records with xids, BEGIN deferred until the first change
//! let plain = FormatterConfig::builder()
//!     .dialect(Dialect::Plain)
//!     .include_xids(true)
//!     .build()
//!     .unwrap();
//! assert_eq!(plain.begin_policy, BeginPolicy::Lazy);
//! ```

use crate::common::{DecodingError, Result};
use serde::{Deserialize, Serialize};

/// Output text dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Compact JSON object per record
    #[default]
    Json,
    /// `test_decoding`-compatible key:value text
    Plain,
}

impl Dialect {
    /// Emission policy the dialect has always used.
    pub fn default_begin_policy(&self) -> BeginPolicy {
        match self {
            Self::Json => BeginPolicy::Eager,
            Self::Plain => BeginPolicy::Lazy,
        }
    }

    /// Get the content type for this dialect
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Plain => "text/plain",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "plain" | "text" | "test_decoding" => Ok(Self::Plain),
            _ => Err(DecodingError::config(format!("Unknown dialect: {}", s))),
        }
    }
}

/// When the BEGIN record of a transaction is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeginPolicy {
    /// Write BEGIN as soon as the transaction starts
    Eager,
    /// Hold BEGIN back until the first row change of the transaction
    Lazy,
}

impl std::fmt::Display for BeginPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eager => write!(f, "eager"),
            Self::Lazy => write!(f, "lazy"),
        }
    }
}

impl std::str::FromStr for BeginPolicy {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "lazy" | "skip-empty" | "skip_empty" => Ok(Self::Lazy),
            _ => Err(DecodingError::config(format!("Unknown begin policy: {}", s))),
        }
    }
}

/// Configuration of the change record formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Output dialect
    #[serde(default)]
    pub dialect: Dialect,

    /// BEGIN emission policy
    pub begin_policy: BeginPolicy,

    /// Also drop COMMIT for transactions without row changes.
    ///
    /// Off by default: COMMIT is written for every transaction, even when
    /// the lazy policy never wrote its BEGIN.
    #[serde(default)]
    pub skip_empty_commit: bool,

    /// Plain dialect: print the xid on BEGIN and COMMIT
    #[serde(default)]
    pub include_xids: bool,

    /// Plain dialect: print the commit timestamp on COMMIT
    #[serde(default)]
    pub include_timestamp: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self::json()
    }
}

/// Mirror of [`FormatterConfig`] with every field optional, so a partial
/// YAML file picks its begin policy from the dialect.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFormatterConfig {
    dialect: Option<Dialect>,
    begin_policy: Option<BeginPolicy>,
    #[serde(default)]
    skip_empty_commit: bool,
    #[serde(default)]
    include_xids: bool,
    #[serde(default)]
    include_timestamp: bool,
}

impl FormatterConfig {
    /// Create a new builder.
    pub fn builder() -> FormatterConfigBuilder {
        FormatterConfigBuilder::default()
    }

    /// JSON dialect with eager BEGIN
    pub fn json() -> Self {
        Self {
            dialect: Dialect::Json,
            begin_policy: Dialect::Json.default_begin_policy(),
            skip_empty_commit: false,
            include_xids: false,
            include_timestamp: false,
        }
    }

    /// Plain dialect with lazy BEGIN
    pub fn plain() -> Self {
        Self {
            dialect: Dialect::Plain,
            begin_policy: Dialect::Plain.default_begin_policy(),
            ..Self::json()
        }
    }

    /// Parse a YAML document.
    ///
    /// Missing `begin_policy` follows the dialect default.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: RawFormatterConfig = serde_yaml::from_str(yaml)?;
        let dialect = raw.dialect.unwrap_or_default();
        let config = Self {
            dialect,
            begin_policy: raw
                .begin_policy
                .unwrap_or_else(|| dialect.default_begin_policy()),
            skip_empty_commit: raw.skip_empty_commit,
            include_xids: raw.include_xids,
            include_timestamp: raw.include_timestamp,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.dialect == Dialect::Json && self.include_xids {
            return Err(DecodingError::config(
                "include_xids only applies to the plain dialect",
            ));
        }
        if self.dialect == Dialect::Json && self.include_timestamp {
            return Err(DecodingError::config(
                "include_timestamp only applies to the plain dialect",
            ));
        }
        if self.skip_empty_commit && self.begin_policy == BeginPolicy::Eager {
            return Err(DecodingError::config(
                "skip_empty_commit requires the lazy begin policy",
            ));
        }
        Ok(())
    }
}

/// Builder for FormatterConfig
#[derive(Debug, Default)]
pub struct FormatterConfigBuilder {
    dialect: Dialect,
    begin_policy: Option<BeginPolicy>,
    skip_empty_commit: bool,
    include_xids: bool,
    include_timestamp: bool,
}

impl FormatterConfigBuilder {
    /// Set the output dialect
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Override the dialect's BEGIN policy
    pub fn begin_policy(mut self, policy: BeginPolicy) -> Self {
        self.begin_policy = Some(policy);
        self
    }

    /// Suppress COMMIT for transactions without row changes
    pub fn skip_empty_commit(mut self, enabled: bool) -> Self {
        self.skip_empty_commit = enabled;
        self
    }

    /// Print xids (plain dialect)
    pub fn include_xids(mut self, enabled: bool) -> Self {
        self.include_xids = enabled;
        self
    }

    /// Print commit timestamps (plain dialect)
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.include_timestamp = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<FormatterConfig> {
        let config = FormatterConfig {
            dialect: self.dialect,
            begin_policy: self
                .begin_policy
                .unwrap_or_else(|| self.dialect.default_begin_policy()),
            skip_empty_commit: self.skip_empty_commit,
            include_xids: self.include_xids,
            include_timestamp: self.include_timestamp,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_default() {
        assert_eq!(Dialect::default(), Dialect::Json);
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("json".parse::<Dialect>().unwrap(), Dialect::Json);
        assert_eq!("JSON".parse::<Dialect>().unwrap(), Dialect::Json);
        assert_eq!("plain".parse::<Dialect>().unwrap(), Dialect::Plain);
        assert_eq!("test_decoding".parse::<Dialect>().unwrap(), Dialect::Plain);
        assert!("xml".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_begin_policy_from_str() {
        assert_eq!("Eager".parse::<BeginPolicy>().unwrap(), BeginPolicy::Eager);
        assert_eq!("lazy".parse::<BeginPolicy>().unwrap(), BeginPolicy::Lazy);
        assert!("sometimes".parse::<BeginPolicy>().is_err());
    }

    #[test]
    fn test_presets() {
        let json = FormatterConfig::json();
        assert_eq!(json.dialect, Dialect::Json);
        assert_eq!(json.begin_policy, BeginPolicy::Eager);
        assert!(!json.skip_empty_commit);

        let plain = FormatterConfig::plain();
        assert_eq!(plain.dialect, Dialect::Plain);
        assert_eq!(plain.begin_policy, BeginPolicy::Lazy);
        assert_eq!(FormatterConfig::default(), json);
    }

    #[test]
    fn test_builder_policy_override() {
        let config = FormatterConfig::builder()
            .dialect(Dialect::Json)
            .begin_policy(BeginPolicy::Lazy)
            .skip_empty_commit(true)
            .build()
            .unwrap();
        assert_eq!(config.begin_policy, BeginPolicy::Lazy);
        assert!(config.skip_empty_commit);
    }

    #[test]
    fn test_validate_rejects_plain_options_on_json() {
        let err = FormatterConfig::builder()
            .include_xids(true)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("include_xids"));

        assert!(FormatterConfig::builder()
            .dialect(Dialect::Plain)
            .include_xids(true)
            .include_timestamp(true)
            .build()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_skip_empty_commit_with_eager() {
        let err = FormatterConfig::builder()
            .begin_policy(BeginPolicy::Eager)
            .skip_empty_commit(true)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("skip_empty_commit"));
    }

    #[test]
    fn test_from_yaml() {
        let config = FormatterConfig::from_yaml_str(
            "dialect: plain\ninclude_xids: true\ninclude_timestamp: true\n",
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::Plain);
        assert_eq!(config.begin_policy, BeginPolicy::Lazy);
        assert!(config.include_xids);

        let config = FormatterConfig::from_yaml_str("begin_policy: lazy\n").unwrap();
        assert_eq!(config.dialect, Dialect::Json);
        assert_eq!(config.begin_policy, BeginPolicy::Lazy);
    }

    #[test]
    fn test_from_yaml_errors() {
        assert!(FormatterConfig::from_yaml_str("dialect: xml\n").is_err());
        assert!(FormatterConfig::from_yaml_str("unknown_field: 1\n").is_err());
        assert!(FormatterConfig::from_yaml_str("include_xids: true\n").is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = FormatterConfig::plain();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"dialect\":\"plain\""));
        assert!(json.contains("\"begin_policy\":\"lazy\""));
        let parsed: FormatterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
