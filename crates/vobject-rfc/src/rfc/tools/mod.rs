//! Whole-calendar rewrites built on the public API.

mod change_tz;

pub use change_tz::change_tz;
