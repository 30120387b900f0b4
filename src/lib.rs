//! Personal finance ledger: users own accounts, categories and tags, and
//! record income, expense and transfer entries against them. Balances are
//! always derived from the entries, never stored.

pub mod balance;
pub mod classify;
pub mod config;
mod db;
pub mod error;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod notify;
pub mod run;

pub use db::Database;
pub use error::{LedgerError, LedgerResult, Violation};
pub use ledger::Ledger;
