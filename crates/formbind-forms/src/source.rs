//! Inbound request data.
//!
//! The transport layer parses the request; the binding engine only sees two
//! maps, submitted strings and uploaded files, both keyed by field key.

use crate::file::UploadedFile;
use std::collections::HashMap;

pub type ValueMap = HashMap<String, Vec<String>>;
pub type FileMap = HashMap<String, Vec<UploadedFile>>;

/// Source of submitted values and files.
pub trait BindingSource {
	fn values(&self) -> &ValueMap;

	fn files(&self) -> &FileMap;
}

/// Plain in-memory submission.
///
/// # Examples
///
/// ```
/// use formbind_forms::source::{BindingSource, RawSubmission};
///
/// let submission = RawSubmission::from_urlencoded("tags[]=a&tags[]=b&name=J%C3%BCrgen+M");
/// assert_eq!(submission.values()["tags[]"], ["a", "b"]);
/// assert_eq!(submission.values()["name"], ["Jürgen M"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
	values: ValueMap,
	files: FileMap,
}

impl RawSubmission {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse an `application/x-www-form-urlencoded` body or query string.
	/// Repeated keys accumulate in submission order.
	pub fn from_urlencoded(input: &str) -> Self {
		let mut submission = Self::new();
		let input = input.strip_prefix('?').unwrap_or(input);
		for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
			submission
				.values
				.entry(key.into_owned())
				.or_default()
				.push(value.into_owned());
		}
		submission
	}

	pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.values.entry(key.into()).or_default().push(value.into());
		self
	}

	pub fn with_values<I, S>(mut self, key: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.values
			.entry(key.into())
			.or_default()
			.extend(values.into_iter().map(Into::into));
		self
	}

	pub fn with_file(mut self, key: impl Into<String>, file: UploadedFile) -> Self {
		self.files.entry(key.into()).or_default().push(file);
		self
	}
}

impl BindingSource for RawSubmission {
	fn values(&self) -> &ValueMap {
		&self.values
	}

	fn files(&self) -> &FileMap {
		&self.files
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::FileStream;
	use rstest::rstest;

	#[rstest]
	#[case("?a=1&b=2")]
	#[case("a=1&b=2")]
	fn test_from_urlencoded_accepts_leading_question_mark(#[case] input: &str) {
		let submission = RawSubmission::from_urlencoded(input);

		assert_eq!(submission.values()["a"], ["1"]);
		assert_eq!(submission.values()["b"], ["2"]);
	}

	#[rstest]
	fn test_empty_value_is_kept() {
		let submission = RawSubmission::from_urlencoded("note=&flag");

		assert_eq!(submission.values()["note"], [""]);
		assert_eq!(submission.values()["flag"], [""]);
	}

	#[rstest]
	fn test_builders_accumulate() {
		let submission = RawSubmission::new()
			.with_value("a", "1")
			.with_values("a", ["2", "3"])
			.with_file("f", UploadedFile::new("x.txt", FileStream::from_bytes(vec![])));

		assert_eq!(submission.values()["a"], ["1", "2", "3"]);
		assert_eq!(submission.files()["f"].len(), 1);
	}
}
