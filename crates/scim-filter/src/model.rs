//! Relational storage model for users and groups.
//!
//! Compiled predicates address stored columns by their internal names. The
//! [`Row`] trait exposes those columns; [`Resource`] adds the embedded
//! objects and child collections that joins traverse.
//!
//! Multi-valued attributes are [`SubResource`] rows owned by exactly one
//! resource. The collection setters stamp each row with its owner's id, so a
//! row can always be traced back to the resource it was stored under.
//!
//! # Manual Implementation
//!
//! Any type can take part in filtering by implementing [`Row`]:
//!
//! ```
//! use scim_filter::{Row, Value};
//!
//! struct Address {
//!     locality: Option<String>,
//! }
//!
//! impl Row for Address {
//!     fn column_value(&self, column: &str) -> Value<'_> {
//!         match column {
//!             "locality" => self.locality.as_ref().into(),
//!             _ => Value::None,
//!         }
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ModelError;
use crate::schema::{Embedded, Relation, ResourceKind};
use crate::value::Value;

static PHOTO_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\S+\.(jpg|jpeg|png|gif)$").expect("photo value pattern is valid")
});

/// Column access for one stored row.
pub trait Row {
    /// Returns the value of an internal column, or [`Value::None`] if the
    /// column is null or unknown.
    fn column_value(&self, column: &str) -> Value<'_>;
}

/// A filterable root resource.
pub trait Resource: Row {
    /// Resource kind this type is stored as.
    const KIND: ResourceKind;

    /// Internal id, referenced by child rows.
    fn internal_id(&self) -> &str;

    /// The embedded object's columns, if the object is set.
    fn embedded_row(&self, object: Embedded) -> Option<&dyn Row>;

    /// Child rows of a relation. Unknown relations have none.
    fn related_rows(&self, relation: Relation) -> Vec<&dyn Row>;
}

/// Row of a multi-valued attribute (email, phone number, im, photo, member).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubResource {
    pub value: Option<String>,
    /// The `type` code.
    pub kind: Option<String>,
    pub primary: Option<bool>,
    owner: Option<String>,
}

impl SubResource {
    pub fn new(value: impl Into<String>) -> Self {
        SubResource {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Internal id of the owning resource, once the row is attached.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

impl Row for SubResource {
    fn column_value(&self, column: &str) -> Value<'_> {
        match column {
            "value" => self.value.as_ref().into(),
            "type" => self
                .kind
                .as_deref()
                .map_or(Value::None, Value::Code),
            "is_primary" => self.primary.into(),
            _ => Value::None,
        }
    }
}

/// The `name` sub-object of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub formatted: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
    pub honorific_prefix: Option<String>,
    pub honorific_suffix: Option<String>,
}

impl Row for Name {
    fn column_value(&self, column: &str) -> Value<'_> {
        match column {
            "formatted" => self.formatted.as_ref().into(),
            "family_name" => self.family_name.as_ref().into(),
            "given_name" => self.given_name.as_ref().into(),
            "middle_name" => self.middle_name.as_ref().into(),
            "honorific_prefix" => self.honorific_prefix.as_ref().into(),
            "honorific_suffix" => self.honorific_suffix.as_ref().into(),
            _ => Value::None,
        }
    }
}

/// Resource metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl Row for Meta {
    fn column_value(&self, column: &str) -> Value<'_> {
        match column {
            "created" => self.created.into(),
            "last_modified" => self.last_modified.into(),
            "location" => self.location.as_ref().into(),
            _ => Value::None,
        }
    }
}

fn attach(owner: &str, rows: Vec<SubResource>) -> Vec<SubResource> {
    rows.into_iter()
        .map(|mut row| {
            row.owner = Some(owner.to_string());
            row
        })
        .collect()
}

/// A stored user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    internal_id: String,
    pub external_id: Option<String>,
    pub user_name: String,
    pub display_name: Option<String>,
    pub nick_name: Option<String>,
    pub profile_url: Option<String>,
    pub title: Option<String>,
    pub user_type: Option<String>,
    pub preferred_language: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub active: Option<bool>,
    pub name: Option<Name>,
    pub meta: Meta,
    emails: Vec<SubResource>,
    phone_numbers: Vec<SubResource>,
    ims: Vec<SubResource>,
    photos: Vec<SubResource>,
}

impl User {
    pub fn new(internal_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        User {
            internal_id: internal_id.into(),
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    pub fn emails(&self) -> &[SubResource] {
        &self.emails
    }

    pub fn phone_numbers(&self) -> &[SubResource] {
        &self.phone_numbers
    }

    pub fn ims(&self) -> &[SubResource] {
        &self.ims
    }

    pub fn photos(&self) -> &[SubResource] {
        &self.photos
    }

    /// Replaces the emails, attaching each row to this user.
    pub fn set_emails(&mut self, emails: Vec<SubResource>) {
        self.emails = attach(&self.internal_id, emails);
    }

    pub fn set_phone_numbers(&mut self, phone_numbers: Vec<SubResource>) {
        self.phone_numbers = attach(&self.internal_id, phone_numbers);
    }

    pub fn set_ims(&mut self, ims: Vec<SubResource>) {
        self.ims = attach(&self.internal_id, ims);
    }

    /// Replaces the photos. Each non-empty value must name an image file.
    /// Nothing is changed if any value is rejected.
    pub fn set_photos(&mut self, photos: Vec<SubResource>) -> Result<(), ModelError> {
        for photo in &photos {
            match photo.value.as_deref() {
                Some(value) if !value.is_empty() && !PHOTO_VALUE.is_match(value) => {
                    return Err(ModelError::InvalidPhotoUrl(value.to_string()));
                }
                _ => {}
            }
        }
        self.photos = attach(&self.internal_id, photos);
        Ok(())
    }
}

impl Row for User {
    fn column_value(&self, column: &str) -> Value<'_> {
        match column {
            "internal_id" => Value::String(&self.internal_id),
            "external_id" => self.external_id.as_ref().into(),
            "user_name" => Value::String(&self.user_name),
            "display_name" => self.display_name.as_ref().into(),
            "nick_name" => self.nick_name.as_ref().into(),
            "profile_url" => self.profile_url.as_ref().into(),
            "title" => self.title.as_ref().into(),
            "user_type" => self.user_type.as_ref().into(),
            "preferred_language" => self.preferred_language.as_ref().into(),
            "locale" => self.locale.as_ref().into(),
            "timezone" => self.timezone.as_ref().into(),
            "active" => self.active.into(),
            _ => Value::None,
        }
    }
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn embedded_row(&self, object: Embedded) -> Option<&dyn Row> {
        match object {
            Embedded::Name => self.name.as_ref().map(|n| n as &dyn Row),
            Embedded::Meta => Some(&self.meta),
        }
    }

    fn related_rows(&self, relation: Relation) -> Vec<&dyn Row> {
        let rows = match relation {
            Relation::Emails => &self.emails,
            Relation::PhoneNumbers => &self.phone_numbers,
            Relation::Ims => &self.ims,
            Relation::Photos => &self.photos,
            Relation::Members => return Vec::new(),
        };
        rows.iter().map(|r| r as &dyn Row).collect()
    }
}

/// A stored group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    internal_id: String,
    pub external_id: Option<String>,
    pub display_name: String,
    pub meta: Meta,
    members: Vec<SubResource>,
}

impl Group {
    pub fn new(internal_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Group {
            internal_id: internal_id.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub fn members(&self) -> &[SubResource] {
        &self.members
    }

    /// Replaces the members, attaching each row to this group.
    pub fn set_members(&mut self, members: Vec<SubResource>) {
        self.members = attach(&self.internal_id, members);
    }
}

impl Row for Group {
    fn column_value(&self, column: &str) -> Value<'_> {
        match column {
            "internal_id" => Value::String(&self.internal_id),
            "external_id" => self.external_id.as_ref().into(),
            "display_name" => Value::String(&self.display_name),
            _ => Value::None,
        }
    }
}

impl Resource for Group {
    const KIND: ResourceKind = ResourceKind::Group;

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn embedded_row(&self, object: Embedded) -> Option<&dyn Row> {
        match object {
            Embedded::Meta => Some(&self.meta),
            Embedded::Name => None,
        }
    }

    fn related_rows(&self, relation: Relation) -> Vec<&dyn Row> {
        match relation {
            Relation::Members => self.members.iter().map(|r| r as &dyn Row).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_attach_owner() {
        let mut user = User::new("u1", "bjensen");
        user.set_emails(vec![
            SubResource::new("a@example.com").with_kind("work"),
            SubResource::new("b@example.com"),
        ]);
        assert!(user.emails().iter().all(|e| e.owner() == Some("u1")));

        let mut group = Group::new("g1", "admins");
        group.set_members(vec![SubResource::new("u1")]);
        assert_eq!(group.members()[0].owner(), Some("g1"));
    }

    #[test]
    fn detached_row_has_no_owner() {
        assert_eq!(SubResource::new("x").owner(), None);
    }

    #[test]
    fn photo_values_must_be_images() {
        let mut user = User::new("u1", "bjensen");
        user.set_photos(vec![
            SubResource::new("https://example.com/me.JPG"),
            SubResource::new(""),
            SubResource::default(),
        ])
        .unwrap();
        assert_eq!(user.photos().len(), 3);

        let err = user
            .set_photos(vec![SubResource::new("https://example.com/me.bmp")])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidPhotoUrl("https://example.com/me.bmp".into())
        );
        // Rejected update leaves the previous photos in place
        assert_eq!(user.photos().len(), 3);
    }

    #[test]
    fn sub_resource_columns() {
        let row = SubResource::new("a@example.com")
            .with_kind("work")
            .with_primary(true);
        assert_eq!(row.column_value("value"), Value::String("a@example.com"));
        assert_eq!(row.column_value("type"), Value::Code("work"));
        assert_eq!(row.column_value("is_primary"), Value::Bool(true));
        assert_eq!(row.column_value("primary"), Value::None);
    }

    #[test]
    fn user_columns_and_embedded() {
        let mut user = User::new("u1", "bjensen");
        user.active = Some(true);
        user.name = Some(Name {
            family_name: Some("Jensen".into()),
            ..Default::default()
        });

        assert_eq!(user.column_value("user_name"), Value::String("bjensen"));
        assert_eq!(user.column_value("active"), Value::Bool(true));
        assert_eq!(user.column_value("title"), Value::None);

        let name = user.embedded_row(Embedded::Name).unwrap();
        assert_eq!(name.column_value("family_name"), Value::String("Jensen"));
        assert!(user.embedded_row(Embedded::Meta).is_some());
    }

    #[test]
    fn group_has_no_user_relations() {
        let group = Group::new("g1", "admins");
        assert!(group.related_rows(Relation::Emails).is_empty());
        assert!(group.embedded_row(Embedded::Name).is_none());
    }
}
