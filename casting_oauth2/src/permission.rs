//! Permission claims carried by access tokens
//!
//! A permission names one operation the bearer may perform, such as
//! `get:actors` or `delete:movie`. Identity providers publish them either as
//! a JSON array in a `permissions` claim or as a space-delimited string.

use std::collections::{btree_set, BTreeSet};

use aliri_braid::braid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An invalid permission
#[derive(Debug, Error)]
pub enum InvalidPermission {
    /// The permission was the empty string
    #[error("permission cannot be empty")]
    EmptyString,
    /// The permission contained an invalid byte
    #[error("invalid permission byte at position {position}: 0x{value:02x}")]
    InvalidByte {
        /// The index in the permission where the invalid byte was found
        position: usize,
        /// The invalid byte value
        value: u8,
    },
}

impl From<std::convert::Infallible> for InvalidPermission {
    #[inline(always)]
    fn from(x: std::convert::Infallible) -> Self {
        match x {}
    }
}

/// A single permission granted by an access token
///
/// A permission must be composed of printable ASCII characters excluding
/// ` ` (space), `"` (double quote), and `\` (backslash), the same alphabet
/// as an OAuth2 scope token.
#[braid(
    serde,
    validator,
    ref_doc = "A borrowed reference to a [`Permission`]"
)]
pub struct Permission;

impl aliri_braid::Validator for Permission {
    type Error = InvalidPermission;

    fn validate(s: &str) -> Result<(), Self::Error> {
        if s.is_empty() {
            Err(InvalidPermission::EmptyString)
        } else if let Some((position, &value)) = s
            .as_bytes()
            .iter()
            .enumerate()
            .find(|(_, &b)| b <= 0x20 || b == 0x22 || b == 0x5C || 0x7F <= b)
        {
            Err(InvalidPermission::InvalidByte { position, value })
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum PermissionsDto {
    String(String),
    Array(Vec<Permission>),
}

/// The set of permissions granted by a token
///
/// An absent or `null` claim is an empty set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Option<PermissionsDto>", into = "PermissionsDto")]
#[must_use]
pub struct Permissions(BTreeSet<Permission>);

impl Permissions {
    /// An empty permission set
    #[inline]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// A permission set holding a single permission
    #[inline]
    pub fn single(permission: impl Into<Permission>) -> Self {
        Self::empty().and(permission)
    }

    /// Adds an additional permission
    #[inline]
    pub fn and(mut self, permission: impl Into<Permission>) -> Self {
        self.insert(permission);
        self
    }

    /// Adds a permission to the set
    #[inline]
    pub fn insert(&mut self, permission: impl Into<Permission>) {
        self.0.insert(permission.into());
    }

    /// Whether `permission` has been granted
    #[inline]
    #[must_use]
    pub fn contains(&self, permission: &PermissionRef) -> bool {
        self.0.contains(permission)
    }

    /// The number of distinct permissions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no permissions have been granted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the permissions in lexical order
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }
}

impl TryFrom<&'_ str> for Permissions {
    type Error = InvalidPermission;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.split_ascii_whitespace()
            .map(|p| Permission::try_from(p.to_owned()))
            .collect()
    }
}

impl TryFrom<String> for Permissions {
    type Error = InvalidPermission;

    #[inline]
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl TryFrom<Option<PermissionsDto>> for Permissions {
    type Error = InvalidPermission;

    fn try_from(dto: Option<PermissionsDto>) -> Result<Self, Self::Error> {
        match dto {
            Some(PermissionsDto::String(s)) => Self::try_from(s),
            Some(PermissionsDto::Array(arr)) => Ok(arr.into_iter().collect()),
            None => Ok(Self::empty()),
        }
    }
}

impl From<Permissions> for PermissionsDto {
    fn from(p: Permissions) -> Self {
        PermissionsDto::Array(p.0.into_iter().collect())
    }
}

impl FromIterator<Permission> for Permissions {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<P> Extend<P> for Permissions
where
    P: Into<Permission>,
{
    #[inline]
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for Permissions {
    type Item = Permission;
    type IntoIter = btree_set::IntoIter<Permission>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An iterator over a set of borrowed permissions
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    iter: btree_set::Iter<'a, Permission>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PermissionRef;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|x| x.as_ref())
    }
}

impl<'a> IntoIterator for &'a Permissions {
    type Item = &'a PermissionRef;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            iter: self.0.iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;

    #[derive(Deserialize)]
    struct Claims {
        #[serde(default)]
        permissions: Permissions,
    }

    #[test]
    fn validates_permission_alphabet() {
        assert!(Permission::new("get:actors".to_owned()).is_ok());
        assert!(Permission::new("assign:actor".to_owned()).is_ok());
        assert!(matches!(
            Permission::new(String::new()),
            Err(InvalidPermission::EmptyString)
        ));
        assert!(matches!(
            Permission::new("get actors".to_owned()),
            Err(InvalidPermission::InvalidByte {
                position: 3,
                value: b' '
            })
        ));
        assert!(Permission::new("get\"actors".to_owned()).is_err());
        assert!(Permission::new("get\\actors".to_owned()).is_err());
    }

    #[test]
    fn borrowed_permission_validates_and_converts_to_owned() {
        let borrowed = PermissionRef::from_str("delete:movie").unwrap();
        let owned: Permission = borrowed.to_owned();
        assert_eq!(owned.as_str(), "delete:movie");
        assert!(matches!(
            PermissionRef::from_str(""),
            Err(InvalidPermission::EmptyString)
        ));
    }

    #[test]
    fn reads_array_claim() -> Result<()> {
        let claims: Claims =
            serde_json::from_str(r#"{"permissions":["get:actors","add:actor","get:actors"]}"#)?;
        assert_eq!(claims.permissions.len(), 2);
        assert!(claims
            .permissions
            .contains(PermissionRef::from_static("add:actor")));
        Ok(())
    }

    #[test]
    fn reads_space_delimited_claim() -> Result<()> {
        let claims: Claims = serde_json::from_str(r#"{"permissions":"get:movies  add:movie"}"#)?;
        let names: Vec<&str> = claims.permissions.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, ["add:movie", "get:movies"]);
        Ok(())
    }

    #[test]
    fn absent_or_null_claim_is_empty() -> Result<()> {
        let absent: Claims = serde_json::from_str("{}")?;
        let null: Claims = serde_json::from_str(r#"{"permissions":null}"#)?;
        assert!(absent.permissions.is_empty());
        assert!(null.permissions.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_entry_rejects_claim() {
        assert!(serde_json::from_str::<Claims>(r#"{"permissions":["ok",""]}"#).is_err());
        assert!(serde_json::from_str::<Claims>(r#"{"permissions":42}"#).is_err());
    }

    #[test]
    fn serializes_as_array() -> Result<()> {
        let p = Permissions::single(Permission::from_static("patch:movie"))
            .and(Permission::from_static("delete:movie"));
        assert_eq!(
            serde_json::to_string(&p)?,
            r#"["delete:movie","patch:movie"]"#
        );
        Ok(())
    }
}
