//! Storage schema for filterable resources.
//!
//! Each resource kind is stored as a root table with:
//! - plain columns (`user_name`, `active`, ...)
//! - singular embedded objects (`name`, `meta`) whose columns live on the
//!   root row and are reached without a join
//! - multi-valued relations (`emails`, `photos`, ...) stored in child tables
//!   with a back-reference to the owning resource
//!
//! External path segments are the lowercase SCIM attribute names; the schema
//! maps each one to its internal column name.

use std::fmt;

/// A filterable resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Group,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Group => "group",
        }
    }

    /// Root table holding resources of this kind.
    pub fn table(self) -> &'static str {
        match self {
            ResourceKind::User => "scim_user",
            ResourceKind::Group => "scim_group",
        }
    }

    /// Alias of the root table in rendered queries.
    pub fn root_alias(self) -> &'static str {
        match self {
            ResourceKind::User => "u",
            ResourceKind::Group => "g",
        }
    }

    /// Storage schema for this kind.
    pub fn schema(self) -> &'static Schema {
        match self {
            ResourceKind::User => &USER_SCHEMA,
            ResourceKind::Group => &GROUP_SCHEMA,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A singular sub-object embedded in the root row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Embedded {
    Name,
    Meta,
}

impl Embedded {
    pub fn segment(self) -> &'static str {
        match self {
            Embedded::Name => "name",
            Embedded::Meta => "meta",
        }
    }

    /// Prefix of this object's columns on the root table.
    pub fn column_prefix(self) -> &'static str {
        match self {
            Embedded::Name => "name_",
            Embedded::Meta => "meta_",
        }
    }
}

/// A one-to-many relation from a resource to its sub-resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Emails,
    PhoneNumbers,
    Ims,
    Photos,
    Members,
}

impl Relation {
    pub fn segment(self) -> &'static str {
        match self {
            Relation::Emails => "emails",
            Relation::PhoneNumbers => "phonenumbers",
            Relation::Ims => "ims",
            Relation::Photos => "photos",
            Relation::Members => "members",
        }
    }

    /// Join alias for this relation. Distinct per relation.
    pub fn alias(self) -> &'static str {
        self.segment()
    }

    pub fn table(self) -> &'static str {
        match self {
            Relation::Emails => "scim_email",
            Relation::PhoneNumbers => "scim_phonenumber",
            Relation::Ims => "scim_im",
            Relation::Photos => "scim_photo",
            Relation::Members => "scim_group_member",
        }
    }

    /// Column on the child table pointing back at the owning resource.
    pub fn owner_column(self) -> &'static str {
        match self {
            Relation::Members => "group_internal_id",
            _ => "user_internal_id",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Maps an external path segment to an internal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub segment: &'static str,
    pub name: &'static str,
}

const fn col(segment: &'static str, name: &'static str) -> Column {
    Column { segment, name }
}

fn find(columns: &'static [Column], segment: &str) -> Option<&'static Column> {
    columns.iter().find(|c| c.segment == segment)
}

/// Storage layout of one resource kind.
#[derive(Debug)]
pub struct Schema {
    pub kind: ResourceKind,
    pub columns: &'static [Column],
    pub embedded: &'static [(Embedded, &'static [Column])],
    pub relations: &'static [(Relation, &'static [Column])],
}

impl Schema {
    /// Looks up a plain root column by path segment.
    pub fn column(&self, segment: &str) -> Option<&'static Column> {
        find(self.columns, segment)
    }

    /// Looks up an embedded object by path segment.
    pub fn embedded(&self, segment: &str) -> Option<(Embedded, &'static [Column])> {
        self.embedded
            .iter()
            .find(|(object, _)| object.segment() == segment)
            .copied()
    }

    /// Looks up a multi-valued relation by path segment.
    pub fn relation(&self, segment: &str) -> Option<(Relation, &'static [Column])> {
        self.relations
            .iter()
            .find(|(relation, _)| relation.segment() == segment)
            .copied()
    }

    /// Looks up a column of a sub-object or relation by path segment.
    pub fn sub_column(columns: &'static [Column], segment: &str) -> Option<&'static Column> {
        find(columns, segment)
    }
}

const NAME_COLUMNS: &[Column] = &[
    col("formatted", "formatted"),
    col("familyname", "family_name"),
    col("givenname", "given_name"),
    col("middlename", "middle_name"),
    col("honorificprefix", "honorific_prefix"),
    col("honorificsuffix", "honorific_suffix"),
];

const META_COLUMNS: &[Column] = &[
    col("created", "created"),
    col("lastmodified", "last_modified"),
    col("location", "location"),
];

const EMAIL_COLUMNS: &[Column] = &[
    col("value", "value"),
    col("type", "type"),
    col("primary", "is_primary"),
];

const TYPED_VALUE_COLUMNS: &[Column] = &[col("value", "value"), col("type", "type")];

const MEMBER_COLUMNS: &[Column] = &[col("value", "value")];

pub static USER_SCHEMA: Schema = Schema {
    kind: ResourceKind::User,
    columns: &[
        col("externalid", "external_id"),
        col("username", "user_name"),
        col("displayname", "display_name"),
        col("nickname", "nick_name"),
        col("profileurl", "profile_url"),
        col("title", "title"),
        col("usertype", "user_type"),
        col("preferredlanguage", "preferred_language"),
        col("locale", "locale"),
        col("timezone", "timezone"),
        col("active", "active"),
    ],
    embedded: &[(Embedded::Name, NAME_COLUMNS), (Embedded::Meta, META_COLUMNS)],
    relations: &[
        (Relation::Emails, EMAIL_COLUMNS),
        (Relation::PhoneNumbers, TYPED_VALUE_COLUMNS),
        (Relation::Ims, TYPED_VALUE_COLUMNS),
        (Relation::Photos, TYPED_VALUE_COLUMNS),
    ],
};

pub static GROUP_SCHEMA: Schema = Schema {
    kind: ResourceKind::Group,
    columns: &[
        col("externalid", "external_id"),
        col("displayname", "display_name"),
    ],
    embedded: &[(Embedded::Meta, META_COLUMNS)],
    relations: &[(Relation::Members, MEMBER_COLUMNS)],
};
