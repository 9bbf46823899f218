//! Process-wide registry lifecycle. Kept in its own test binary so that no
//! other test observes the installed registry.

use scim_filter::registry::{global, install};
use scim_filter::{ConfigError, FilterConfig, Relation};

#[test]
fn install_once_then_read() {
    let mut config = FilterConfig::default();
    config.type_codes.photos = vec!["avatar".into()];

    let installed = install(&config).unwrap();
    assert_eq!(installed.codes(Relation::Photos), ["avatar".to_string()]);
    assert!(std::ptr::eq(installed, global()));

    let err = install(&FilterConfig::default()).unwrap_err();
    assert!(matches!(err, ConfigError::AlreadyInstalled));
    assert_eq!(global().codes(Relation::Photos), ["avatar".to_string()]);
}
