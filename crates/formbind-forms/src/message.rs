//! Validation messages as a code plus positional arguments.
//!
//! Messages are not pre-formatted so that callers can translate them; the
//! [`Display`](std::fmt::Display) impl renders the built-in English text.

use serde::Serialize;
use std::fmt;

/// Message codes emitted by the built-in validators.
pub mod codes {
	pub const REQUIRED: &str = "required";
	pub const MIN_VALUE: &str = "min_value";
	pub const MAX_VALUE: &str = "max_value";
	pub const MIN_DATE: &str = "min_date";
	pub const MAX_DATE: &str = "max_date";
	pub const MIN_LENGTH: &str = "min_length";
	pub const MAX_LENGTH: &str = "max_length";
	pub const EMAIL: &str = "email";
	pub const IDENTICAL: &str = "identical";
	pub const IDENTICAL_TARGET_MISSING: &str = "identical_target_missing";
	/// Free text supplied by application code; the text is argument 0.
	pub const CUSTOM: &str = "custom";
}

/// Positional message argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageArg {
	Int(i64),
	Float(f64),
	Text(String),
}

impl fmt::Display for MessageArg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MessageArg::Int(v) => write!(f, "{}", v),
			MessageArg::Float(v) => write!(f, "{}", v),
			MessageArg::Text(v) => f.write_str(v),
		}
	}
}

impl From<i64> for MessageArg {
	fn from(v: i64) -> Self {
		MessageArg::Int(v)
	}
}

impl From<usize> for MessageArg {
	fn from(v: usize) -> Self {
		MessageArg::Int(i64::try_from(v).unwrap_or(i64::MAX))
	}
}

impl From<f64> for MessageArg {
	fn from(v: f64) -> Self {
		MessageArg::Float(v)
	}
}

impl From<String> for MessageArg {
	fn from(v: String) -> Self {
		MessageArg::Text(v)
	}
}

impl From<&str> for MessageArg {
	fn from(v: &str) -> Self {
		MessageArg::Text(v.to_string())
	}
}

/// A validation message.
///
/// # Examples
///
/// ```
/// use formbind_forms::message::{Message, codes};
///
/// let msg = Message::new(codes::MIN_LENGTH).with_arg(8usize);
/// assert_eq!(msg.code, "min_length");
/// assert_eq!(msg.to_string(), "Value length must be at least 8");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
	pub code: String,
	pub args: Vec<MessageArg>,
}

impl Message {
	pub fn new(code: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			args: Vec::new(),
		}
	}

	/// A free-text message, rendered verbatim.
	pub fn text(text: impl Into<String>) -> Self {
		Self::new(codes::CUSTOM).with_arg(text.into())
	}

	pub fn with_arg(mut self, arg: impl Into<MessageArg>) -> Self {
		self.args.push(arg.into());
		self
	}

	/// English template for the message code, with `{n}` placeholders.
	fn template(&self) -> Option<&'static str> {
		let template = match self.code.as_str() {
			codes::REQUIRED => "This field is required",
			codes::MIN_VALUE => "Value must be greater than or equal to {0}",
			codes::MAX_VALUE => "Value must be lower than or equal to {0}",
			codes::MIN_DATE => "Date must be on or after {0}",
			codes::MAX_DATE => "Date must be on or before {0}",
			codes::MIN_LENGTH => "Value length must be at least {0}",
			codes::MAX_LENGTH => "Value length must be at most {0}",
			codes::EMAIL => "Value must be a valid email address",
			codes::IDENTICAL => "Value does not match {0}",
			codes::IDENTICAL_TARGET_MISSING => "Field {0} to compare against does not exist",
			codes::CUSTOM => "{0}",
			_ => return None,
		};
		Some(template)
	}
}

impl fmt::Display for Message {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Some(template) = self.template() else {
			// Unknown code: show it with its arguments.
			f.write_str(&self.code)?;
			for arg in &self.args {
				write!(f, " {}", arg)?;
			}
			return Ok(());
		};

		let mut rendered = template.to_string();
		for (i, arg) in self.args.iter().enumerate() {
			rendered = rendered.replace(&format!("{{{}}}", i), &arg.to_string());
		}
		f.write_str(&rendered)
	}
}
