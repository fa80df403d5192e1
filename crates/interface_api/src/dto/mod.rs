//! Request and response bodies

pub mod trial_balance;
