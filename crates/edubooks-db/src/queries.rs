//! Query modules, one per table

pub mod bibliographies;
pub mod books;
pub mod loans;
pub mod penalties;
pub mod reservations;
pub mod users;

/// Wraps `value` for a `LIKE ? ESCAPE '\'` substring match
pub(crate) fn like_pattern(value: &str) -> String {
	let mut pattern = String::with_capacity(value.len() + 2);
	pattern.push('%');
	for c in value.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
		}
		pattern.push(c);
	}
	pattern.push('%');
	pattern
}
