//! # Configuration
//!
//! The filter engine is configured once at startup, before the field registry
//! is built. Configuration is plain YAML deserialized with `serde_yaml`; every
//! key is optional and falls back to the SCIM canonical values.
//!
//! ```yaml
//! type_codes:
//!   emails: [work, home, other]
//!   photos: [photo, thumbnail]
//! ```
//!
//! ## Available Settings
//!
//! | Key | Default |
//! |-----|---------|
//! | `type_codes.emails` | `work`, `home`, `other` |
//! | `type_codes.phone_numbers` | `work`, `home`, `mobile`, `fax`, `pager`, `other` |
//! | `type_codes.ims` | `aim`, `gtalk`, `icq`, `xmpp`, `msn`, `skype`, `qq`, `yahoo` |
//! | `type_codes.photos` | `photo`, `thumbnail` |

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::Relation;

fn codes(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Configuration for the filter engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Legal `type` codes per multi-valued relation.
    pub type_codes: TypeCodes,
}

/// Legal enumerated codes for the `type` field of each relation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TypeCodes {
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub ims: Vec<String>,
    pub photos: Vec<String>,
}

impl Default for TypeCodes {
    fn default() -> Self {
        TypeCodes {
            emails: codes(&["work", "home", "other"]),
            phone_numbers: codes(&["work", "home", "mobile", "fax", "pager", "other"]),
            ims: codes(&["aim", "gtalk", "icq", "xmpp", "msn", "skype", "qq", "yahoo"]),
            photos: codes(&["photo", "thumbnail"]),
        }
    }
}

impl TypeCodes {
    /// Codes for a relation. Relations without a `type` field have none.
    pub fn for_relation(&self, relation: Relation) -> &[String] {
        match relation {
            Relation::Emails => &self.emails,
            Relation::PhoneNumbers => &self.phone_numbers,
            Relation::Ims => &self.ims,
            Relation::Photos => &self.photos,
            Relation::Members => &[],
        }
    }
}

impl FilterConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })
    }

    /// Reads and parses a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })
    }

    /// Checks that every code list is non-empty, with no blank or repeated
    /// entries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for relation in [
            Relation::Emails,
            Relation::PhoneNumbers,
            Relation::Ims,
            Relation::Photos,
        ] {
            let codes = self.type_codes.for_relation(relation);
            if codes.is_empty() {
                return Err(ConfigError::EmptyCodes { relation });
            }
            let mut seen = HashSet::new();
            for code in codes {
                if code.trim().is_empty() {
                    return Err(ConfigError::BlankCode { relation });
                }
                if !seen.insert(code.as_str()) {
                    return Err(ConfigError::DuplicateCode {
                        relation,
                        code: code.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FilterConfig::default();
        assert_eq!(config.type_codes.emails, vec!["work", "home", "other"]);
        assert!(config.validate().is_ok());
        assert!(config.type_codes.for_relation(Relation::Members).is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config =
            FilterConfig::from_yaml_str("type_codes:\n  emails: [work, school]\n").unwrap();
        assert_eq!(config.type_codes.emails, vec!["work", "school"]);
        assert_eq!(config.type_codes.photos, vec!["photo", "thumbnail"]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = FilterConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = FilterConfig::from_yaml_str("type_codes: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn test_validate_rejects_empty_list() {
        let mut config = FilterConfig::default();
        config.type_codes.ims.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyCodes {
                relation: Relation::Ims
            })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_and_duplicate() {
        let mut config = FilterConfig::default();
        config.type_codes.photos.push("  ".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BlankCode { .. })
        ));

        let mut config = FilterConfig::default();
        config.type_codes.emails.push("work".into());
        match config.validate() {
            Err(ConfigError::DuplicateCode { relation, code }) => {
                assert_eq!(relation, Relation::Emails);
                assert_eq!(code, "work");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "type_codes:\n  photos: [avatar]").unwrap();

        let config = FilterConfig::from_path(file.path()).unwrap();
        assert_eq!(config.type_codes.photos, vec!["avatar"]);
    }

    #[test]
    fn test_from_missing_path() {
        let err = FilterConfig::from_path("/nonexistent/filter.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
