//! Validators attached to form elements.
//!
//! A validator inspects the [`Snapshot`] its element last pushed to it and
//! either passes or returns one [`Message`]. Validators that compare against
//! another element declare a [`reference`](Validator::reference); the form
//! resolves it by name at validation time.

use crate::element::Snapshot;
use crate::kind::DATE_LAYOUT;
use crate::message::{Message, codes};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

// Addresses of the form local@domain.tld: no whitespace, exactly one `@`,
// at least one dot in the domain with non-empty labels around it.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// Live state of an element referenced by another element's validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedElement {
	pub label: String,
	pub value: String,
}

/// A check run against an element snapshot.
pub trait Validator: Send + Sync {
	/// Short identifier used in logs and debug output.
	fn name(&self) -> &'static str;

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message>;

	/// Name of another element this validator compares against.
	fn reference(&self) -> Option<&str> {
		None
	}

	/// Receive the referenced element's state, or `None` when the form has
	/// no element under that name.
	fn resolve_reference(&mut self, _target: Option<ReferencedElement>) {}
}

/// Requires a value, values or an attached file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Validator for Required {
	fn name(&self) -> &'static str {
		"required"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		let present = !snapshot.value.is_empty()
			|| snapshot.values.iter().any(|v| !v.is_empty())
			|| snapshot.file.is_some();
		if present {
			Ok(())
		} else {
			Err(Message::new(codes::REQUIRED))
		}
	}
}

fn parse_decimal(value: &str) -> Option<f64> {
	value.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Numeric lower bound (inclusive).
#[derive(Debug, Clone, Copy)]
pub struct MinValue {
	min: f64,
}

impl MinValue {
	pub fn new(min: f64) -> Self {
		Self { min }
	}
}

impl Validator for MinValue {
	fn name(&self) -> &'static str {
		"min_value"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		match parse_decimal(&snapshot.value) {
			Some(v) if v >= self.min => Ok(()),
			_ => Err(Message::new(codes::MIN_VALUE).with_arg(self.min)),
		}
	}
}

/// Numeric upper bound (inclusive).
#[derive(Debug, Clone, Copy)]
pub struct MaxValue {
	max: f64,
}

impl MaxValue {
	pub fn new(max: f64) -> Self {
		Self { max }
	}
}

impl Validator for MaxValue {
	fn name(&self) -> &'static str {
		"max_value"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		match parse_decimal(&snapshot.value) {
			Some(v) if v <= self.max => Ok(()),
			_ => Err(Message::new(codes::MAX_VALUE).with_arg(self.max)),
		}
	}
}

fn parse_date(value: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(value.trim(), DATE_LAYOUT).ok()
}

/// Earliest accepted date (inclusive).
#[derive(Debug, Clone, Copy)]
pub struct MinDate {
	min: NaiveDate,
}

impl MinDate {
	pub fn new(min: NaiveDate) -> Self {
		Self { min }
	}
}

impl Validator for MinDate {
	fn name(&self) -> &'static str {
		"min_date"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		match parse_date(&snapshot.value) {
			Some(d) if d >= self.min => Ok(()),
			_ => Err(Message::new(codes::MIN_DATE).with_arg(self.min.format(DATE_LAYOUT).to_string())),
		}
	}
}

/// Latest accepted date (inclusive).
#[derive(Debug, Clone, Copy)]
pub struct MaxDate {
	max: NaiveDate,
}

impl MaxDate {
	pub fn new(max: NaiveDate) -> Self {
		Self { max }
	}
}

impl Validator for MaxDate {
	fn name(&self) -> &'static str {
		"max_date"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		match parse_date(&snapshot.value) {
			Some(d) if d <= self.max => Ok(()),
			_ => Err(Message::new(codes::MAX_DATE).with_arg(self.max.format(DATE_LAYOUT).to_string())),
		}
	}
}

/// Minimum length of the value in characters.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
	min: usize,
}

impl MinLength {
	pub fn new(min: usize) -> Self {
		Self { min }
	}
}

impl Validator for MinLength {
	fn name(&self) -> &'static str {
		"min_length"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		let len = snapshot.value.chars().count();
		if len >= self.min {
			Ok(())
		} else {
			Err(Message::new(codes::MIN_LENGTH).with_arg(self.min))
		}
	}
}

/// Maximum length of the value in characters.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
	max: usize,
}

impl MaxLength {
	pub fn new(max: usize) -> Self {
		Self { max }
	}
}

impl Validator for MaxLength {
	fn name(&self) -> &'static str {
		"max_length"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		if snapshot.value.chars().count() <= self.max {
			Ok(())
		} else {
			Err(Message::new(codes::MAX_LENGTH).with_arg(self.max))
		}
	}
}

/// E-mail address format check. The domain is not resolved.
///
/// # Examples
///
/// ```
/// use formbind_forms::element::Snapshot;
/// use formbind_forms::validators::{EmailAddress, Validator};
///
/// let snapshot = |v: &str| Snapshot { value: v.to_string(), ..Snapshot::default() };
/// assert!(EmailAddress.validate(&snapshot("alice@example.com")).is_ok());
/// assert!(EmailAddress.validate(&snapshot("alice@localhost")).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailAddress;

impl Validator for EmailAddress {
	fn name(&self) -> &'static str {
		"email"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		if EMAIL_REGEX.is_match(snapshot.value.trim()) {
			Ok(())
		} else {
			Err(Message::new(codes::EMAIL))
		}
	}
}

/// Requires the value to equal the value of another named element.
///
/// The target is looked up when the form validates, so it may be added to
/// the form after this validator is attached. When no element with that
/// name exists at validation time the check fails with
/// [`codes::IDENTICAL_TARGET_MISSING`].
#[derive(Debug, Clone)]
pub struct Identical {
	target: String,
	resolved: Option<ReferencedElement>,
}

impl Identical {
	pub fn new(target: impl Into<String>) -> Self {
		Self {
			target: target.into(),
			resolved: None,
		}
	}
}

impl Validator for Identical {
	fn name(&self) -> &'static str {
		"identical"
	}

	fn validate(&self, snapshot: &Snapshot) -> Result<(), Message> {
		let Some(target) = &self.resolved else {
			return Err(Message::new(codes::IDENTICAL_TARGET_MISSING).with_arg(self.target.as_str()));
		};

		if snapshot.value == target.value {
			Ok(())
		} else {
			let label = if target.label.is_empty() {
				self.target.as_str()
			} else {
				target.label.as_str()
			};
			Err(Message::new(codes::IDENTICAL).with_arg(label))
		}
	}

	fn reference(&self) -> Option<&str> {
		Some(&self.target)
	}

	fn resolve_reference(&mut self, target: Option<ReferencedElement>) {
		self.resolved = target;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::FileRef;
	use crate::message::MessageArg;
	use rstest::rstest;

	fn snapshot(value: &str) -> Snapshot {
		Snapshot {
			value: value.to_string(),
			..Snapshot::default()
		}
	}

	#[rstest]
	fn test_required_accepts_values_or_file() {
		let values = Snapshot {
			values: vec!["a".to_string()],
			..Snapshot::default()
		};
		let file = Snapshot {
			file: Some(FileRef::stored("a.png")),
			..Snapshot::default()
		};

		assert!(Required.validate(&values).is_ok());
		assert!(Required.validate(&file).is_ok());
		assert_eq!(
			Required.validate(&snapshot("")),
			Err(Message::new(codes::REQUIRED))
		);
	}

	#[rstest]
	#[case("5", true)]
	#[case("4.99", false)]
	#[case(" 10 ", true)]
	#[case("", false)]
	#[case("five", false)]
	fn test_min_value(#[case] value: &str, #[case] valid: bool) {
		assert_eq!(MinValue::new(5.0).validate(&snapshot(value)).is_ok(), valid);
	}

	#[rstest]
	fn test_max_value_message_carries_bound() {
		let err = MaxValue::new(10.0).validate(&snapshot("11")).unwrap_err();

		assert_eq!(err.args, vec![MessageArg::Float(10.0)]);
	}

	#[rstest]
	#[case("2024-01-01", true)]
	#[case("2023-12-31", false)]
	#[case("01/01/2024", false)]
	fn test_min_date(#[case] value: &str, #[case] valid: bool) {
		let validator = MinDate::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

		assert_eq!(validator.validate(&snapshot(value)).is_ok(), valid);
	}

	#[rstest]
	fn test_max_date_inclusive() {
		let validator = MaxDate::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());

		assert!(validator.validate(&snapshot("2024-06-30")).is_ok());
		assert!(validator.validate(&snapshot("2024-07-01")).is_err());
	}

	#[rstest]
	#[case(3, "", false)]
	#[case(3, "abc", true)]
	#[case(3, "ab", false)]
	#[case(3, "日本語", true)]
	#[case(0, "", true)]
	fn test_min_length_counts_characters(
		#[case] min: usize,
		#[case] value: &str,
		#[case] valid: bool,
	) {
		assert_eq!(MinLength::new(min).validate(&snapshot(value)).is_ok(), valid);
	}

	#[rstest]
	fn test_max_length_counts_characters() {
		assert!(MaxLength::new(2).validate(&snapshot("éé")).is_ok());
		assert!(MaxLength::new(2).validate(&snapshot("abc")).is_err());
	}

	#[rstest]
	#[case("user@example.com", true)]
	#[case("first.last@sub.example.org", true)]
	#[case("user@@example.com", false)]
	#[case("user example@x.com", false)]
	#[case("@example.com", false)]
	#[case("user@example.", false)]
	fn test_email_format(#[case] value: &str, #[case] valid: bool) {
		assert_eq!(EmailAddress.validate(&snapshot(value)).is_ok(), valid);
	}

	#[rstest]
	fn test_identical_unresolved_fails_with_missing_target() {
		let validator = Identical::new("password");

		let err = validator.validate(&snapshot("secret")).unwrap_err();

		assert_eq!(err.code, codes::IDENTICAL_TARGET_MISSING);
		assert_eq!(err.args, vec![MessageArg::Text("password".to_string())]);
	}

	#[rstest]
	fn test_identical_compares_against_resolved_value() {
		// Arrange
		let mut validator = Identical::new("password");
		validator.resolve_reference(Some(ReferencedElement {
			label: "Password".to_string(),
			value: "secret".to_string(),
		}));

		// Act
		let same = validator.validate(&snapshot("secret"));
		let different = validator.validate(&snapshot("other"));

		// Assert
		assert!(same.is_ok());
		assert_eq!(different.unwrap_err().to_string(), "Value does not match Password");
	}
}
