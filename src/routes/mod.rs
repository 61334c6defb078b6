/// Router Module Index
///
/// Splits the HTTP surface by the access level each group requires. Access
/// control for the generic resource routes is decided per action by the
/// viewset permission tables, so those live with the public routes.

/// Routes reachable anonymously (health, setup status, verification preview
/// and the resource dispatcher).
pub mod public;

/// Routes wrapped in the `AuthUser` middleware layer.
pub mod authenticated;

/// Routes restricted to the 'admin' role.
pub mod admin;
