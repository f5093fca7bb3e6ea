//! Application SQL functions registered on every connection.
//!
//! # Invariants
//! - `unicode_lower(text)` folds case with Unicode rules; SQLite's built-in
//!   `lower()` only folds ASCII.
//! - `unicode_lower(NULL)` is `NULL`.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// SQL name of the Unicode lowercase function.
pub const UNICODE_LOWER: &str = "unicode_lower";

pub(super) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
}
