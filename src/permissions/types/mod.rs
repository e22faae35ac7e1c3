/*!
 * Permission Types Module
 * Core types and traits for the permission system
 */

mod core;
mod traits;

pub use self::core::{GrantKey, GrantRecord, Group, Principal, PrincipalKey, TargetRef, User};
pub use traits::{Account, Authorizable, ObjectList, ObjectSource, Target};
