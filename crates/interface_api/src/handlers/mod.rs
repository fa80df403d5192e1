//! Request handlers

pub mod health;
pub mod trial_balance;
