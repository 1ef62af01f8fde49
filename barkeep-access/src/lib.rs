//! # Barkeep Access
//!
//! Subscription and permission gating for the Barkeep suite, shared by the
//! inventory, guest manager, and consumption tracker modules.
//!
//! ## Overview
//!
//! The barkeep-access crate handles:
//! - **Access evaluation**: may this user enter this module right now?
//! - **Trials**: per-module and organization-wide trial starts
//! - **Usage limits**: users, items and storage areas per plan
//! - **Team management**: who may invite, re-role, remove, or reset PINs
//! - **PINs**: Argon2id hashes for quick login on shared terminals
//! - **Billing**: applying provider events to stored subscriptions
//!
//! ## Features
//!
//! - `memory` (default): [`MemoryStore`], an in-process [`AccessStore`]
//!
//! ## Access decisions
//!
//! The evaluator is a pure function over loaded records. Platform admins and
//! grandfathered organizations bypass every subscription check; everyone
//! else goes through the trial/subscription state of the module.
//!
//! ```rust
//! use barkeep_access::{AccessEvaluator, AccessStatus};
//! use barkeep_org::{Organization, User, UserRole};
//! use barkeep_rbac::AppId;
//! use chrono::Utc;
//!
//! let org = Organization::new("The Copper Still", "copper-still").grandfathered();
//! let staff = User::new("staff@copperstill.bar", org.id, UserRole::Staff);
//!
//! let decision =
//!     AccessEvaluator::new().evaluate(&staff, Some(&org), AppId::Consumption, None, Utc::now());
//! assert_eq!(decision.status, AccessStatus::Granted);
//! ```
//!
//! ## Failure handling
//!
//! Store failures surface as [`AccessError::EvaluationFailed`]. Nothing in
//! this crate turns an error into a grant; callers that need a decision
//! regardless use [`AccessService::check_access_or_deny`].
//!
//! ## Cross-Crate Integration
//!
//! This crate integrates with:
//! - `barkeep-org`: Organizations, users, roles, plans, subscription records
//! - `barkeep-rbac`: Modules, actions, and permission sets

pub mod config;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod limits;
#[cfg(feature = "memory")]
pub mod memory;
pub mod pin;
pub mod service;
pub mod store;
pub mod team;

// Re-export main types
pub use config::{AccessConfig, ConfigError};
pub use decision::{AccessDecision, AccessStatus, SubscriptionType};
pub use error::{AccessError, AccessResult};
pub use evaluator::{resolve_subscription, role_permissions, AccessEvaluator};
pub use limits::{evaluate_limit, LimitResult};
pub use pin::{hash_pin, validate_pin, verify_pin};
pub use service::AccessService;
pub use store::{AccessStore, Reservation, StoreError, StoreResult};
pub use team::{authorize_invite, authorize_team_action, TeamAction};

#[cfg(feature = "memory")]
pub use memory::MemoryStore;
