// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::auth::{AuthGate, RequirePermission};

#[derive(Clone)]
pub struct AppState {
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }

    /// Middleware state for a route that requires `permission`.
    pub fn require(&self, permission: &str) -> RequirePermission {
        RequirePermission::new(self.gate.clone(), permission)
    }
}
