//! Error types for access operations
//!
//! This module defines every rejection the access layer can produce:
//! identity problems, team-management violations, usage limits, and
//! infrastructure failures during evaluation.

use barkeep_org::ResourceKind;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Access error types.
///
/// Role and cross-tenant violations are always reported as-is; they are
/// never downgraded to another outcome. Infrastructure failures surface as
/// [`AccessError::EvaluationFailed`] and are never read as a grant.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No authenticated user on the request
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// The user has no organization, or it does not exist
    #[error("Organization not found")]
    OrganizationNotFound,

    /// The acting user's role does not allow the action
    #[error("Insufficient role: {0}")]
    InsufficientRole(String),

    /// The target user belongs to a different organization
    #[error("Cannot act on a user from another organization")]
    CrossOrganizationViolation,

    /// The acting user tried to remove or re-role themselves
    #[error("Cannot modify your own account: {0}")]
    SelfModification(String),

    /// The organization is at its plan limit for a resource
    #[error("Limit reached for {resource}: {current} of {limit} used")]
    LimitReached {
        /// Resource that hit the limit
        resource: ResourceKind,
        /// Current count
        current: u64,
        /// Configured limit
        limit: u32,
    },

    /// A trial was already started for this scope
    #[error("Trial already started for {0}")]
    TrialAlreadyStarted(String),

    /// PIN failed validation
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    /// The resource is not counted through reserve/release
    #[error("{0} are managed through member invites and removals")]
    UnsupportedResource(ResourceKind),

    /// Infrastructure failure while evaluating
    #[error("Access evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Result type for access operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        AccessError::EvaluationFailed(err.to_string())
    }
}

impl AccessError {
    /// Check if this error should be logged at error level.
    ///
    /// Rejections are expected outcomes; only infrastructure failures are.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AccessError::EvaluationFailed(_))
    }

    /// Check if the caller should render an upgrade prompt.
    pub fn is_upgrade_required(&self) -> bool {
        matches!(self, AccessError::LimitReached { .. })
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::NotAuthenticated => 401,

            AccessError::UserNotFound(_) | AccessError::OrganizationNotFound => 404,

            AccessError::InsufficientRole(_)
            | AccessError::CrossOrganizationViolation
            | AccessError::SelfModification(_) => 403,

            AccessError::LimitReached { .. } => 402,
            AccessError::TrialAlreadyStarted(_) => 409,
            AccessError::InvalidPin(_) | AccessError::UnsupportedResource(_) => 400,
            AccessError::EvaluationFailed(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::NotAuthenticated => "NOT_AUTHENTICATED",
            AccessError::UserNotFound(_) => "USER_NOT_FOUND",
            AccessError::OrganizationNotFound => "ORGANIZATION_NOT_FOUND",
            AccessError::InsufficientRole(_) => "INSUFFICIENT_ROLE",
            AccessError::CrossOrganizationViolation => "CROSS_ORGANIZATION",
            AccessError::SelfModification(_) => "SELF_MODIFICATION",
            AccessError::LimitReached { .. } => "LIMIT_REACHED",
            AccessError::TrialAlreadyStarted(_) => "TRIAL_ALREADY_STARTED",
            AccessError::InvalidPin(_) => "INVALID_PIN",
            AccessError::UnsupportedResource(_) => "UNSUPPORTED_RESOURCE",
            AccessError::EvaluationFailed(_) => "EVALUATION_FAILED",
        }
    }
}
