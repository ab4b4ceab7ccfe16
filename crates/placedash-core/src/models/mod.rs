//! Data models for upstream records.
//!
//! This module contains the four record shapes served by the upstream API:
//!
//! - `User`: identity, login, address and optional company details
//! - `Post`: article metadata and content
//! - `Comment`: a comment on a post
//! - `Album`: a titled album owned by a user
//!
//! `Record` wraps all four so list and detail handling can be generic, and
//! `ResourceKind` names the collection each record comes from.

pub mod album;
pub mod comment;
pub mod post;
pub mod record;
pub mod user;

pub use album::Album;
pub use comment::Comment;
pub use post::Post;
pub use record::{Record, ResourceKind};
pub use user::{Address, Company, Geo, Login, User};
