//! Meal logging core: a per-user meal store adapter, an observable meal
//! list, form validators and email verification codes, served over HTTP.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod meals;
pub mod state;
pub mod store;
pub mod validation;
pub mod verification;

#[cfg(test)]
mod test_support;
