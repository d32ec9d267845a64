//! HTTP handlers for the Teams domain

pub mod invites;
pub mod memberships;
pub mod teams;
pub mod users;
