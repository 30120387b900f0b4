mod account;
mod category;
mod contact;
mod entry;
mod filter;
mod report;
mod user;

use std::sync::OnceLock;

use regex::Regex;

pub use account::{Account, AccountDetails, AccountDraft, AccountSummary};
pub use category::{
    Category, LabelDraft, Tag, CATEGORY_BLACKLIST, SYSTEM_CATEGORY_ID, SYSTEM_CATEGORY_NAME,
};
pub use contact::{Contact, ContactDraft};
pub use entry::{Entry, EntryDraft, EntryKind, LabelRef, MAX_DESCRIPTION_LEN, MAX_LOCATION_LEN};
pub use filter::{parse_date, parse_month, DateWindow, EntryFilter, DATE_FORMAT};
pub use report::{
    CashFlowRow, DateValue, DayCount, EvolutionParams, LabelValue, Report, TopEntriesParams,
};
pub use user::User;

pub(crate) use filter::day_bounds;

fn is_hex_color(s: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}

fn is_currency_code(s: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}
