//! Request timestamps in the layout ESIA signs and checks for freshness:
//! `YYYY.MM.DD HH:MM:SS ±HHMM`.

// crates.io
use time::{error::Format, format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::_prelude::*;

const LAYOUT: &[BorrowedFormatItem<'static>] = format_description!(
	"[year].[month].[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
);

/// Formats the current local time.
///
/// Falls back to UTC when the local offset cannot be determined (for example inside a
/// multi-threaded process on platforms where reading the offset is unsound).
pub fn now() -> Result<String, Format> {
	let moment = OffsetDateTime::now_local().unwrap_or_else(|_err| {
		#[cfg(feature = "tracing")]
		tracing::warn!(error = %_err, "Local offset is unavailable; timestamp falls back to UTC.");

		OffsetDateTime::now_utc()
	});

	format(moment)
}

/// Formats `moment` in its own offset.
pub fn format(moment: OffsetDateTime) -> Result<String, Format> {
	moment.format(LAYOUT)
}
