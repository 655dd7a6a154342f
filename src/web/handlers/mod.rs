//! HTTP request handlers for the taskdesk pages.

pub mod auth;
pub mod feedback;
pub mod home;
pub mod tasks;
