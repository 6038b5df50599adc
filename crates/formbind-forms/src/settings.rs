//! Form behaviour policies.
//!
//! ## Environment variables
//!
//! - `FORMBIND_COERCION_POLICY`: `strict` or `lenient` (default `lenient`)
//! - `FORMBIND_FILTER_ERROR_POLICY`: `continue` or `halt` (default `continue`)
//! - `FORMBIND_ERROR_FLAG_POLICY`: `sticky` or `reset_on_validate`
//!   (default `sticky`)

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

pub const COERCION_POLICY_VAR: &str = "FORMBIND_COERCION_POLICY";
pub const FILTER_ERROR_POLICY_VAR: &str = "FORMBIND_FILTER_ERROR_POLICY";
pub const ERROR_FLAG_POLICY_VAR: &str = "FORMBIND_ERROR_FLAG_POLICY";

/// What `map_to` does when a field fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
	/// Fail the whole mapping without writing to the model.
	Strict,
	/// Write the fields that decoded and report the rest.
	#[default]
	Lenient,
}

impl fmt::Display for CoercionPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CoercionPolicy::Strict => write!(f, "strict"),
			CoercionPolicy::Lenient => write!(f, "lenient"),
		}
	}
}

impl FromStr for CoercionPolicy {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"strict" => Ok(CoercionPolicy::Strict),
			"lenient" => Ok(CoercionPolicy::Lenient),
			_ => Err(SettingsError::InvalidValue {
				setting: COERCION_POLICY_VAR,
				value: s.to_string(),
			}),
		}
	}
}

/// What the filter pipeline does after a filter fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterErrorPolicy {
	/// Record the failure and keep running the remaining filters.
	#[default]
	Continue,
	/// Stop at the first failure.
	Halt,
}

impl fmt::Display for FilterErrorPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FilterErrorPolicy::Continue => write!(f, "continue"),
			FilterErrorPolicy::Halt => write!(f, "halt"),
		}
	}
}

impl FromStr for FilterErrorPolicy {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"continue" => Ok(FilterErrorPolicy::Continue),
			"halt" => Ok(FilterErrorPolicy::Halt),
			_ => Err(SettingsError::InvalidValue {
				setting: FILTER_ERROR_POLICY_VAR,
				value: s.to_string(),
			}),
		}
	}
}

/// Lifetime of the form-level error flag across repeated validations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFlagPolicy {
	/// Once set, the flag stays set and the form never validates again.
	#[default]
	Sticky,
	/// The flag is recomputed on every validation.
	ResetOnValidate,
}

impl fmt::Display for ErrorFlagPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ErrorFlagPolicy::Sticky => write!(f, "sticky"),
			ErrorFlagPolicy::ResetOnValidate => write!(f, "reset_on_validate"),
		}
	}
}

impl FromStr for ErrorFlagPolicy {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().replace('-', "_").as_str() {
			"sticky" => Ok(ErrorFlagPolicy::Sticky),
			"reset_on_validate" | "reset" => Ok(ErrorFlagPolicy::ResetOnValidate),
			_ => Err(SettingsError::InvalidValue {
				setting: ERROR_FLAG_POLICY_VAR,
				value: s.to_string(),
			}),
		}
	}
}

/// Policies attached to a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
	pub coercion: CoercionPolicy,
	pub filter_errors: FilterErrorPolicy,
	pub error_flag: ErrorFlagPolicy,
}

impl FormSettings {
	/// Load settings from `FORMBIND_*` environment variables. Unset
	/// variables keep their defaults.
	pub fn from_env() -> Result<Self, SettingsError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Load settings through an arbitrary key lookup.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::settings::{CoercionPolicy, FormSettings};
	///
	/// let settings = FormSettings::from_lookup(|key| {
	///     (key == "FORMBIND_COERCION_POLICY").then(|| "strict".to_string())
	/// })
	/// .unwrap();
	/// assert_eq!(settings.coercion, CoercionPolicy::Strict);
	/// ```
	pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut settings = Self::default();

		if let Some(value) = lookup(COERCION_POLICY_VAR) {
			settings.coercion = value.parse()?;
		}
		if let Some(value) = lookup(FILTER_ERROR_POLICY_VAR) {
			settings.filter_errors = value.parse()?;
		}
		if let Some(value) = lookup(ERROR_FLAG_POLICY_VAR) {
			settings.error_flag = value.parse()?;
		}

		Ok(settings)
	}

	pub fn with_coercion(mut self, policy: CoercionPolicy) -> Self {
		self.coercion = policy;
		self
	}

	pub fn with_filter_errors(mut self, policy: FilterErrorPolicy) -> Self {
		self.filter_errors = policy;
		self
	}

	pub fn with_error_flag(mut self, policy: ErrorFlagPolicy) -> Self {
		self.error_flag = policy;
		self
	}
}
