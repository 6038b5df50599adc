//! Error taxonomy for form lookup, value coercion, filters and settings.
//!
//! Validation failures are deliberately absent here: they are collected as
//! [`Message`](crate::message::Message) lists on each element and never
//! travel through `Result`.

use std::fmt;
use std::io;
use std::sync::Arc;

/// Failure to convert between a form string and a typed model value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
	#[error("'{0}' is not a valid integer")]
	InvalidInteger(String),
	#[error("'{0}' is not a valid number")]
	InvalidFloat(String),
	#[error("'{0}' is not a valid boolean")]
	InvalidBool(String),
	#[error("'{value}' is not a valid date (expected layout {layout})")]
	InvalidDate { value: String, layout: &'static str },
	#[error("'{value}' is out of range for {target}")]
	OutOfRange { value: String, target: &'static str },
	#[error("type mismatch: expected {expected}, found {found}")]
	TypeMismatch {
		expected: &'static str,
		found: &'static str,
	},
}

pub type CoercionResult<T> = Result<T, CoercionError>;

/// Failure raised by a filter while transforming an element.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FilterError {
	#[error("I/O error: {0}")]
	Io(#[source] Arc<io::Error>),
	#[error("image processing failed: {0}")]
	Image(String),
	#[error("file has no storage location; run a rename filter first")]
	MissingLocation,
}

impl From<io::Error> for FilterError {
	fn from(err: io::Error) -> Self {
		FilterError::Io(Arc::new(err))
	}
}

impl From<image::ImageError> for FilterError {
	fn from(err: image::ImageError) -> Self {
		FilterError::Image(err.to_string())
	}
}

/// A filter failure tagged with the element and filter that produced it.
#[derive(Debug, Clone)]
pub struct FilterFailure {
	pub element: String,
	pub filter: &'static str,
	pub error: FilterError,
}

impl fmt::Display for FilterFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"filter '{}' on element '{}' failed: {}",
			self.filter, self.element, self.error
		)
	}
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
	#[error("invalid value '{value}' for {setting}")]
	InvalidValue { setting: &'static str, value: String },
}

/// Errors returned by form-level operations.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("element not found: {0}")]
	ElementNotFound(String),
	#[error("element attribute not found: {0}")]
	AttributeNotFound(String),
	#[error("an element named '{0}' already exists in the form")]
	DuplicateElement(String),
	#[error("cannot bind field '{field}' (key '{key}'): {source}")]
	Coercion {
		field: String,
		key: String,
		#[source]
		source: CoercionError,
	},
	#[error("{0}")]
	Filter(FilterFailure),
	#[error(transparent)]
	Settings(#[from] SettingsError),
}

pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_coercion_error_display() {
		// Arrange
		let err = CoercionError::OutOfRange {
			value: "300".to_string(),
			target: "u8",
		};

		// Act
		let text = err.to_string();

		// Assert
		assert_eq!(text, "'300' is out of range for u8");
	}

	#[rstest]
	fn test_filter_failure_display_names_element_and_filter() {
		let failure = FilterFailure {
			element: "avatar".to_string(),
			filter: "persist",
			error: FilterError::MissingLocation,
		};

		let text = FormError::Filter(failure).to_string();

		assert!(text.contains("'persist'"));
		assert!(text.contains("'avatar'"));
	}
}
