//! HTTP request handlers.

pub(crate) mod cache;
pub(crate) mod listing;
pub(crate) mod navigation;
pub(crate) mod pages;
pub(crate) mod search;
