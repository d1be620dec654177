//! Route Messages
//!
//! Per-route wording used when normalizing upstream failures. Only the
//! strings differ between routes; the precedence rules live in
//! [`crate::domain::failure`].

/// Message used for every 401, whatever the route
pub const AUTH_FAILED: &str = "Authentication failed. Please sign in again.";

/// Route-specific failure wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMessages {
    /// Used when the upstream body carries no usable message
    pub fallback: &'static str,
    /// 403 wording
    pub forbidden: &'static str,
    /// 404 wording
    pub not_found: &'static str,
    /// 413 wording; upload routes only
    pub too_large: Option<&'static str>,
}

impl RouteMessages {
    pub const fn new(fallback: &'static str) -> Self {
        Self {
            fallback,
            forbidden: "Access denied.",
            not_found: "Resource not found.",
            too_large: None,
        }
    }

    pub const fn forbidden(self, forbidden: &'static str) -> Self {
        Self { forbidden, ..self }
    }

    pub const fn not_found(self, not_found: &'static str) -> Self {
        Self { not_found, ..self }
    }

    pub const fn too_large(self, too_large: &'static str) -> Self {
        Self {
            too_large: Some(too_large),
            ..self
        }
    }
}

// Community categories

pub const CATEGORY_LIST: RouteMessages = RouteMessages::new("Failed to fetch community categories");

pub const CATEGORY_CREATE: RouteMessages = RouteMessages::new("Failed to create community category")
    .forbidden("You do not have permission to create categories.");

// Communities

pub const COMMUNITY_LIST: RouteMessages = RouteMessages::new("Failed to fetch communities");

pub const COMMUNITY_CREATE: RouteMessages = RouteMessages::new("Failed to create community")
    .forbidden("You do not have permission to create communities.");

pub const COMMUNITY_GET: RouteMessages =
    RouteMessages::new("Failed to fetch community").not_found("Community not found.");

pub const COMMUNITY_UPDATE: RouteMessages = RouteMessages::new("Failed to update community")
    .forbidden("You do not have permission to update this community.")
    .not_found("Community not found.");

pub const COMMUNITY_DELETE: RouteMessages = RouteMessages::new("Failed to delete community")
    .forbidden("You do not have permission to delete this community.")
    .not_found("Community not found.");

// Posts

pub const POST_LIST: RouteMessages = RouteMessages::new("Failed to fetch posts");

pub const POST_CREATE: RouteMessages = RouteMessages::new("Failed to create post")
    .forbidden("You must be a member of this community to post.");

pub const POST_GET: RouteMessages =
    RouteMessages::new("Failed to fetch post").not_found("Post not found.");

pub const POST_UPDATE: RouteMessages = RouteMessages::new("Failed to update post")
    .forbidden("You can only edit your own posts.")
    .not_found("Post not found.");

pub const POST_DELETE: RouteMessages = RouteMessages::new("Failed to delete post")
    .forbidden("You can only delete your own posts.")
    .not_found("Post not found.");

// Join requests

pub const JOIN_REQUEST_LIST: RouteMessages = RouteMessages::new("Failed to fetch join requests")
    .forbidden("Only community moderators can view join requests.");

pub const JOIN_REQUEST_SUBMIT: RouteMessages = RouteMessages::new("Failed to submit join request")
    .not_found("Community not found.");

pub const JOIN_REQUEST_GET: RouteMessages =
    RouteMessages::new("Failed to fetch join request").not_found("Join request not found.");

pub const JOIN_REQUEST_APPROVE: RouteMessages = RouteMessages::new("Failed to approve join request")
    .forbidden("Only community moderators can approve join requests.")
    .not_found("Join request not found.");

pub const JOIN_REQUEST_REJECT: RouteMessages = RouteMessages::new("Failed to reject join request")
    .forbidden("Only community moderators can reject join requests.")
    .not_found("Join request not found.");

pub const MEMBERSHIP_ADD: RouteMessages = RouteMessages::new("Failed to add user to community")
    .forbidden("You do not have permission to add members.")
    .not_found("Community not found.");

// Datasets

pub const DATASET_UPLOAD: RouteMessages = RouteMessages::new("Failed to upload dataset")
    .forbidden("You do not have permission to upload datasets.")
    .too_large("File is too large. Maximum upload size is 5 GB.");

// Auth

pub const AUTH_LOGIN: RouteMessages = RouteMessages::new("Failed to sign in");

pub const AUTH_REFRESH: RouteMessages = RouteMessages::new("Failed to refresh session");
