//! Failure kinds and their declared ancestor chains.
//!
//! A [`FailureKind`] is a named node with an optional parent. Kinds are
//! declared as statics so a failure can carry `&'static FailureKind` and the
//! exception dispatcher can measure ancestor distance with a plain walk up
//! the chain:
//!
//! ```rust
//! use declarouter::exception::{FailureKind, FAILURE};
//!
//! static STORAGE: FailureKind = FailureKind::extends("Storage", &FAILURE);
//! static STORAGE_TIMEOUT: FailureKind = FailureKind::extends_with_status("StorageTimeout", &STORAGE, 504);
//!
//! assert_eq!(STORAGE_TIMEOUT.distance_to(&STORAGE), Some(1));
//! assert_eq!(STORAGE_TIMEOUT.distance_to(&FAILURE), Some(2));
//! assert_eq!(STORAGE.distance_to(&STORAGE_TIMEOUT), None);
//! assert_eq!(STORAGE.status(), 500);
//! ```

use std::fmt;

/// Node in the failure hierarchy.
///
/// Identity is the kind name; names must be unique across a process.
#[derive(Debug)]
pub struct FailureKind {
    name: &'static str,
    parent: Option<&'static FailureKind>,
    status: Option<u16>,
}

impl FailureKind {
    /// A root kind with its own default status.
    #[must_use]
    pub const fn root(name: &'static str, status: u16) -> Self {
        Self {
            name,
            parent: None,
            status: Some(status),
        }
    }

    /// A child kind inheriting the parent's status.
    #[must_use]
    pub const fn extends(name: &'static str, parent: &'static FailureKind) -> Self {
        Self {
            name,
            parent: Some(parent),
            status: None,
        }
    }

    /// A child kind with its own status.
    #[must_use]
    pub const fn extends_with_status(
        name: &'static str,
        parent: &'static FailureKind,
        status: u16,
    ) -> Self {
        Self {
            name,
            parent: Some(parent),
            status: Some(status),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&'static FailureKind> {
        self.parent
    }

    /// Effective HTTP status: own status, else nearest ancestor's, else 500.
    #[must_use]
    pub fn status(&self) -> u16 {
        if let Some(status) = self.status {
            return status;
        }
        let mut current = self.parent;
        while let Some(kind) = current {
            if let Some(status) = kind.status {
                return status;
            }
            current = kind.parent;
        }
        500
    }

    /// Number of parent hops from `self` to `ancestor`.
    ///
    /// `Some(0)` for the kind itself, `None` when `ancestor` is not on the chain.
    #[must_use]
    pub fn distance_to(&self, ancestor: &FailureKind) -> Option<usize> {
        if self == ancestor {
            return Some(0);
        }
        let mut distance = 1;
        let mut current = self.parent;
        while let Some(kind) = current {
            if kind == ancestor {
                return Some(distance);
            }
            distance += 1;
            current = kind.parent;
        }
        None
    }

    /// Whether `self` equals `ancestor` or descends from it.
    #[must_use]
    pub fn is_a(&self, ancestor: &FailureKind) -> bool {
        self.distance_to(ancestor).is_some()
    }

    /// The chain from this kind up to its root, most specific first.
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static FailureKind> {
        std::iter::successors(Some(self), |kind| kind.parent)
    }
}

impl PartialEq for FailureKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FailureKind {}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Root of every failure kind.
pub static FAILURE: FailureKind = FailureKind::root("Failure", 500);

/// Opaque failure raised from a handler body.
pub static INTERNAL: FailureKind = FailureKind::extends("Internal", &FAILURE);

pub static BAD_REQUEST: FailureKind = FailureKind::extends_with_status("BadRequest", &FAILURE, 400);

/// A non-nullable parameter was absent from the request.
pub static MISSING_PARAMETER: FailureKind = FailureKind::extends("MissingParameter", &BAD_REQUEST);

/// A parameter was present but could not be converted.
pub static PARAMETER_BINDING: FailureKind = FailureKind::extends("ParameterBinding", &BAD_REQUEST);

pub static UNAUTHORIZED: FailureKind = FailureKind::extends_with_status("Unauthorized", &FAILURE, 401);

pub static FORBIDDEN: FailureKind = FailureKind::extends_with_status("Forbidden", &FAILURE, 403);

pub static NOT_FOUND: FailureKind = FailureKind::extends_with_status("NotFound", &FAILURE, 404);

/// No route, or no route for the requested version.
pub static ROUTE_NOT_FOUND: FailureKind = FailureKind::extends("RouteNotFound", &NOT_FOUND);
