//! # Barkeep Organization Management
//!
//! Multi-tenant organization, user and subscription models for the Barkeep
//! suite (liquor inventory, guest manager, consumption tracker).
//!
//! ## Overview
//!
//! The barkeep-org crate handles:
//! - **Organizations**: Tenants (a bar or restaurant group) with their
//!   subscription plan, status, trial and resource limits
//! - **Users**: Staff accounts scoped to one organization at a time
//! - **Roles**: Owner > Manager > Staff > Viewer
//! - **Plans**: Subscription plans and their default resource limits
//! - **Subscriptions**: Organization-wide (bundle) and per-module records
//! - **Billing**: Status transitions driven by billing provider events
//!
//! ## Architecture
//!
//! ```text
//! Organization ── plan, status, trial_ends_at, limits, grandfathered
//!   ├─ Users (role, platform_admin)
//!   └─ AppSubscriptions keyed by (organization_id, app_id)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use barkeep_org::{Organization, SubscriptionPlan, User, UserRole};
//!
//! let mut org = Organization::new("The Copper Still", "copper-still");
//! org.change_plan(SubscriptionPlan::Starter);
//!
//! let owner = User::new("owner@copperstill.bar", org.id, UserRole::Owner);
//! assert!(owner.belongs_to(org.id));
//! ```

pub mod billing;
pub mod organization;
pub mod plans;
pub mod roles;
pub mod subscription;
pub mod user;

// Re-export main types for convenience
pub use billing::{apply_billing_event, BillableSubscription, BillingEvent, StatusChange};
pub use organization::Organization;
pub use plans::{ResourceKind, ResourceLimits, SubscriptionPlan};
pub use roles::UserRole;
pub use subscription::{AppSubscription, Subscription, SubscriptionScope, SubscriptionStatus};
pub use user::User;
