//! Filter field registry.
//!
//! The registry is the vocabulary of attribute paths a search may filter on,
//! per resource kind. Each [`FilterField`] binds a path to where its value is
//! stored ([`Target`]) and how its literal is typed ([`ValueType`]). Adding a
//! filterable attribute means adding an entry to one of the tables below.
//!
//! A [`FieldRegistry`] is built once from a [`FilterConfig`] and never changes
//! afterwards, so it can be shared between request threads without locking.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use tracing::{info, trace};

use crate::config::{FilterConfig, TypeCodes};
use crate::error::ConfigError;
use crate::resolver::{AttributeResolver, Target};
use crate::schema::{Relation, ResourceKind};
use crate::value::ValueType;

/// One filterable attribute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Lowercase attribute path, e.g. `"emails.type"`.
    pub path: &'static str,
    /// Where the value is stored.
    pub target: Target,
    /// Declared type of the value.
    pub value_type: ValueType,
}

impl FilterField {
    const fn new(path: &'static str, target: Target, value_type: ValueType) -> Self {
        FilterField {
            path,
            target,
            value_type,
        }
    }

    const fn root(path: &'static str, value_type: ValueType) -> Self {
        Self::new(path, Target::Root(path), value_type)
    }

    const fn embedded(
        path: &'static str,
        object: &'static str,
        field: &'static str,
        value_type: ValueType,
    ) -> Self {
        Self::new(path, Target::Embedded(object, field), value_type)
    }

    const fn relation(
        path: &'static str,
        relation: &'static str,
        field: Option<&'static str>,
        value_type: ValueType,
    ) -> Self {
        Self::new(path, Target::Relation(relation, field), value_type)
    }
}

use ValueType::{Boolean, String as Text, Timestamp};

/// Filterable attributes of users.
pub const USER_FIELDS: &[FilterField] = &[
    FilterField::root("externalid", Text),
    FilterField::root("username", Text),
    FilterField::root("displayname", Text),
    FilterField::root("nickname", Text),
    FilterField::root("profileurl", Text),
    FilterField::root("title", Text),
    FilterField::root("usertype", Text),
    FilterField::root("preferredlanguage", Text),
    FilterField::root("locale", Text),
    FilterField::root("timezone", Text),
    FilterField::root("active", Boolean),
    FilterField::embedded("name.formatted", "name", "formatted", Text),
    FilterField::embedded("name.familyname", "name", "familyname", Text),
    FilterField::embedded("name.givenname", "name", "givenname", Text),
    FilterField::embedded("name.middlename", "name", "middlename", Text),
    FilterField::embedded("name.honorificprefix", "name", "honorificprefix", Text),
    FilterField::embedded("name.honorificsuffix", "name", "honorificsuffix", Text),
    FilterField::embedded("meta.created", "meta", "created", Timestamp),
    FilterField::embedded("meta.lastmodified", "meta", "lastmodified", Timestamp),
    FilterField::embedded("meta.location", "meta", "location", Text),
    // Bare relation names address the `value` field
    FilterField::relation("emails", "emails", None, Text),
    FilterField::relation("emails.value", "emails", Some("value"), Text),
    FilterField::relation(
        "emails.type",
        "emails",
        Some("type"),
        ValueType::Code(Relation::Emails),
    ),
    FilterField::relation("emails.primary", "emails", Some("primary"), Boolean),
    FilterField::relation("phonenumbers", "phonenumbers", None, Text),
    FilterField::relation("phonenumbers.value", "phonenumbers", Some("value"), Text),
    FilterField::relation(
        "phonenumbers.type",
        "phonenumbers",
        Some("type"),
        ValueType::Code(Relation::PhoneNumbers),
    ),
    FilterField::relation("ims", "ims", None, Text),
    FilterField::relation("ims.value", "ims", Some("value"), Text),
    FilterField::relation("ims.type", "ims", Some("type"), ValueType::Code(Relation::Ims)),
    FilterField::relation("photos", "photos", None, Text),
    FilterField::relation("photos.value", "photos", Some("value"), Text),
    FilterField::relation(
        "photos.type",
        "photos",
        Some("type"),
        ValueType::Code(Relation::Photos),
    ),
];

/// Filterable attributes of groups.
pub const GROUP_FIELDS: &[FilterField] = &[
    FilterField::root("externalid", Text),
    FilterField::root("displayname", Text),
    FilterField::embedded("meta.created", "meta", "created", Timestamp),
    FilterField::embedded("meta.lastmodified", "meta", "lastmodified", Timestamp),
    FilterField::embedded("meta.location", "meta", "location", Text),
    FilterField::relation("members", "members", None, Text),
    FilterField::relation("members.value", "members", Some("value"), Text),
];

/// Immutable lookup table of filterable fields and their legal codes.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    users: HashMap<&'static str, FilterField>,
    groups: HashMap<&'static str, FilterField>,
    codes: TypeCodes,
}

impl FieldRegistry {
    /// Builds the registry. The configuration is assumed valid; use
    /// [`from_config`](Self::from_config) to validate first.
    pub fn new(config: &FilterConfig) -> Self {
        FieldRegistry {
            users: index(ResourceKind::User, USER_FIELDS),
            groups: index(ResourceKind::Group, GROUP_FIELDS),
            codes: config.type_codes.clone(),
        }
    }

    /// Validates `config` and builds the registry.
    pub fn from_config(config: &FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Looks up a path for a resource kind. Matching is exact.
    ///
    /// `None` is an ordinary outcome; the caller decides what an unknown
    /// attribute means for the search.
    pub fn resolve(&self, kind: ResourceKind, path: &str) -> Option<&FilterField> {
        let field = self.table(kind).get(path);
        trace!(%kind, path, found = field.is_some(), "filter field lookup");
        field
    }

    /// All fields of a resource kind, in declaration order.
    pub fn fields(&self, kind: ResourceKind) -> &'static [FilterField] {
        match kind {
            ResourceKind::User => USER_FIELDS,
            ResourceKind::Group => GROUP_FIELDS,
        }
    }

    /// Legal codes for a relation's `type` field.
    pub fn codes(&self, relation: Relation) -> &[String] {
        self.codes.for_relation(relation)
    }

    fn table(&self, kind: ResourceKind) -> &HashMap<&'static str, FilterField> {
        match kind {
            ResourceKind::User => &self.users,
            ResourceKind::Group => &self.groups,
        }
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

fn index(
    kind: ResourceKind,
    fields: &'static [FilterField],
) -> HashMap<&'static str, FilterField> {
    let resolver = AttributeResolver::new(kind);
    fields
        .iter()
        .map(|f| {
            debug_assert_eq!(resolver.parse(f.path).ok(), Some(f.target), "{}", f.path);
            (f.path, *f)
        })
        .collect()
}

static GLOBAL: OnceCell<FieldRegistry> = OnceCell::new();

/// Installs the process-wide registry. Call once during startup.
pub fn install(config: &FilterConfig) -> Result<&'static FieldRegistry, ConfigError> {
    let registry = FieldRegistry::from_config(config)?;
    let installed = GLOBAL
        .try_insert(registry)
        .map_err(|_| ConfigError::AlreadyInstalled)?;
    info!(
        users = installed.users.len(),
        groups = installed.groups.len(),
        "installed filter field registry"
    );
    Ok(installed)
}

/// The process-wide registry, built from defaults if [`install`] was never
/// called.
pub fn global() -> &'static FieldRegistry {
    GLOBAL.get_or_init(FieldRegistry::default)
}
