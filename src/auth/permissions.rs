// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission checks against verified claims.

use super::{AuthError, Claims};

/// Require `permission` in the claims' `permissions` collection.
///
/// An empty `permission` only requires authentication and always passes.
/// A token without any `permissions` claim points at identity-provider RBAC
/// being switched off, and is reported separately from a plain denial.
pub fn check_permission(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    if permission.is_empty() {
        return Ok(());
    }

    let granted = claims
        .permissions
        .as_deref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if granted.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}
