//! # Barkeep RBAC
//!
//! Permissions for the application modules of the Barkeep suite.
//!
//! ## Overview
//!
//! The barkeep-rbac crate handles:
//! - **Apps**: The modules a subscription can unlock (inventory, guest
//!   manager, consumption tracker)
//! - **Actions**: What a user may do inside a module
//! - **Permissions**: App + Action combinations
//! - **Permission Sets**: The permissions attached to an access decision
//!
//! ## Architecture
//!
//! ```text
//! Permission = App + Action
//!
//! Examples:
//!   "inventory:view"        - Browse bottles and storage areas
//!   "guest_manager:export"  - Export the guest list
//!   "consumption:admin"     - Full control of the consumption tracker
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use barkeep_rbac::{Action, AppId, Permission, PermissionSet};
//!
//! let mut set = PermissionSet::new();
//! set.add(Permission::new(AppId::Inventory, Action::Edit));
//!
//! // Edit implies View
//! assert!(set.has(&Permission::new(AppId::Inventory, Action::View)));
//! assert!(!set.has(&Permission::new(AppId::Inventory, Action::Delete)));
//! ```
//!
//! ## Action Implications
//!
//! - `Admin` implies all actions
//! - `Create`, `Edit`, `Delete`, `Export` imply `View`

pub mod actions;
pub mod apps;
pub mod permissions;

pub use actions::Action;
pub use apps::AppId;
pub use permissions::{Permission, PermissionSet};
