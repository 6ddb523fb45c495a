//! Process exit codes, following BSD sysexits.h

/// Bad arguments or no command
pub const USAGE: i32 = 64;

/// Rejected input: missing names, bad paging, inconsistent tree
pub const DATAERR: i32 = 65;

/// Node not found
pub const NOINPUT: i32 = 66;

/// Store could not be opened or queried
pub const UNAVAILABLE: i32 = 69;

pub const SOFTWARE: i32 = 70;

pub const IOERR: i32 = 74;

/// Insertion lost too many write races; retrying may succeed
pub const TEMPFAIL: i32 = 75;

/// Not authenticated
pub const NOPERM: i32 = 77;

pub const CONFIG: i32 = 78;
