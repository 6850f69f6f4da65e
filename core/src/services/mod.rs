//! Per-endpoint dispatch, grouped by upstream domain.
//!
//! # Design
//! Each service is a borrowed handle over a [`DooTaskClient`]: it owns no
//! state and every method is one `build request -> transport -> decode`
//! call through [`DooTaskClient::call`]. Verbs and paths mirror the upstream
//! exactly, including its habit of reading a JSON body on GET requests.
//! Required arguments are checked before anything is sent.
//!
//! [`DooTaskClient`]: crate::DooTaskClient
//! [`DooTaskClient::call`]: crate::DooTaskClient::call

mod dialog;
mod file;
mod project;
mod report;
mod users;

pub use dialog::DialogService;
pub use file::FileService;
pub use project::ProjectService;
pub use report::ReportService;
pub use users::UsersService;

/// The upstream's `0`/`1` encoding for boolean request flags.
pub(crate) fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// The upstream's `yes`/`no` encoding for boolean request options.
pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
