/*!
 * Permission Manager
 * Registration facade, grant mutations and listener dispatch
 */

#[allow(clippy::module_inception)]
mod manager;
mod mutation;

pub use manager::PermissionManager;
