//! # Application Modules
//!
//! The modules of the Barkeep suite. Each module is gated separately by
//! trials and subscriptions; a bundle subscription unlocks all of them.

use serde::{Deserialize, Serialize};

/// Application module identifier.
///
/// # Example
///
/// ```
/// use barkeep_rbac::AppId;
///
/// assert_eq!(AppId::parse("guest-manager"), Some(AppId::GuestManager));
/// assert_eq!(AppId::GuestManager.as_str(), "guest_manager");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppId {
    /// Liquor inventory: bottles, storage areas, counts and orders.
    Inventory,
    /// Guest manager: guest lists, reservations, check-in.
    GuestManager,
    /// Consumption tracker: pours, tabs, and usage reports.
    Consumption,
}

impl AppId {
    /// Get the string representation of the app.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppId::Inventory => "inventory",
            AppId::GuestManager => "guest_manager",
            AppId::Consumption => "consumption",
        }
    }

    /// Parse app from string representation.
    ///
    /// Accepts snake_case, kebab-case and a few legacy names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "inventory" | "liquor_inventory" => Some(AppId::Inventory),
            "guest_manager" | "guests" | "guestmanager" => Some(AppId::GuestManager),
            "consumption" | "consumption_tracker" => Some(AppId::Consumption),
            _ => None,
        }
    }

    /// Human-readable module name.
    pub fn display_name(&self) -> &'static str {
        match self {
            AppId::Inventory => "Liquor Inventory",
            AppId::GuestManager => "Guest Manager",
            AppId::Consumption => "Consumption Tracker",
        }
    }

    /// All modules of the suite.
    pub fn all() -> Vec<Self> {
        vec![AppId::Inventory, AppId::GuestManager, AppId::Consumption]
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
