//! # Newsdesk
//!
//! Content-management backend for a personal journalism website. The service
//! stores articles, photos, timeline entries, archive books, advertisements
//! and site configuration in `PostgreSQL`, and exposes an admin-authenticated
//! CRUD surface plus a public search endpoint.
//!
//! ## Session Authority
//!
//! Admin access is gated by short-lived HS256 access tokens (15 minutes) and
//! long-lived refresh tokens (7 days) carried only in an `HttpOnly` cookie.
//! Revocation is handled through an expiring Redis denylist; login attempts
//! and admin mutations are throttled by fixed-window counters shared across
//! server instances. Every login, logout and admin mutation appends an audit
//! record.

pub mod cli;
pub mod newsdesk;
