//! Derivation of form keys from model field identifiers.

use std::borrow::Cow;

/// Suffix marking a multi-valued field name, e.g. `tags[]`.
pub const MULTIPLICITY_MARKER: &str = "[]";

/// Convert a model field identifier into its canonical form key.
///
/// The identifier is split into words at case boundaries and at
/// underscores, then the words are joined with `_` and lowercased. A run of
/// uppercase letters stays a single word (an acronym) unless it is followed
/// by a lowercase letter, in which case its last letter opens the next word.
///
/// # Examples
///
/// ```
/// use formbind_forms::naming::to_form_key;
///
/// assert_eq!(to_form_key("UserEmailAddress"), "user_email_address");
/// assert_eq!(to_form_key("ID"), "id");
/// assert_eq!(to_form_key("HTTPStatus"), "http_status");
/// assert_eq!(to_form_key("already_snake"), "already_snake");
/// ```
pub fn to_form_key(identifier: &str) -> String {
	let chars: Vec<char> = identifier.chars().collect();
	let mut words: Vec<String> = Vec::new();
	let mut current = String::new();

	for (i, &ch) in chars.iter().enumerate() {
		if ch == '_' {
			if !current.is_empty() {
				words.push(std::mem::take(&mut current));
			}
			continue;
		}

		if ch.is_uppercase() && !current.is_empty() {
			let prev_upper = chars[i - 1].is_uppercase();
			let next_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
			if !prev_upper || next_lower {
				words.push(std::mem::take(&mut current));
			}
		}

		current.push(ch);
	}

	if !current.is_empty() {
		words.push(current);
	}

	words.join("_").to_lowercase()
}

/// Remove every multiplicity marker from a submitted key or element name.
///
/// # Examples
///
/// ```
/// use formbind_forms::naming::strip_multiplicity;
///
/// assert_eq!(strip_multiplicity("tags[]"), "tags");
/// assert_eq!(strip_multiplicity("email"), "email");
/// ```
pub fn strip_multiplicity(key: &str) -> Cow<'_, str> {
	if key.contains(MULTIPLICITY_MARKER) {
		Cow::Owned(key.replace(MULTIPLICITY_MARKER, ""))
	} else {
		Cow::Borrowed(key)
	}
}
