//! Value kinds and their string encode/decode strategies.
//!
//! [`FieldKind`] is the closed set of shapes a model field can take when it
//! is bound to a form element. [`TypedValue`] is the dynamic carrier that
//! crosses the model boundary; conversions to and from plain Rust types are
//! provided through `From`/`TryFrom`.

use crate::error::{CoercionError, CoercionResult};
use crate::file::FileRef;
use chrono::NaiveDate;
use std::num::IntErrorKind;

/// Layout used for calendar dates, e.g. `2025-01-15`.
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Integer width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
	W8,
	W16,
	W32,
	W64,
}

impl IntWidth {
	fn signed_bounds(self) -> (i64, i64) {
		match self {
			IntWidth::W8 => (i64::from(i8::MIN), i64::from(i8::MAX)),
			IntWidth::W16 => (i64::from(i16::MIN), i64::from(i16::MAX)),
			IntWidth::W32 => (i64::from(i32::MIN), i64::from(i32::MAX)),
			IntWidth::W64 => (i64::MIN, i64::MAX),
		}
	}

	fn unsigned_max(self) -> u64 {
		match self {
			IntWidth::W8 => u64::from(u8::MAX),
			IntWidth::W16 => u64::from(u16::MAX),
			IntWidth::W32 => u64::from(u32::MAX),
			IntWidth::W64 => u64::MAX,
		}
	}

	fn signed_name(self) -> &'static str {
		match self {
			IntWidth::W8 => "i8",
			IntWidth::W16 => "i16",
			IntWidth::W32 => "i32",
			IntWidth::W64 => "i64",
		}
	}

	fn unsigned_name(self) -> &'static str {
		match self {
			IntWidth::W8 => "u8",
			IntWidth::W16 => "u16",
			IntWidth::W32 => "u32",
			IntWidth::W64 => "u64",
		}
	}
}

/// Floating point width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
	W32,
	W64,
}

/// Shape of a model field as seen by the binding engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
	String,
	SignedInt(IntWidth),
	UnsignedInt(IntWidth),
	Float(FloatWidth),
	Bool,
	/// Whitespace-delimited list of tokens.
	StringList,
	/// Calendar date in [`DATE_LAYOUT`].
	Date,
	/// A value object whose meaning is carried by its first field.
	ScalarWrapper(Box<FieldKind>),
	FileRef,
	/// Absent when the submitted value is empty and no file is attached.
	Optional(Box<FieldKind>),
}

/// Raw element state handed to [`FieldKind::decode`].
#[derive(Debug, Clone, Copy)]
pub struct RawInput<'a> {
	pub value: &'a str,
	pub file: Option<&'a FileRef>,
}

impl<'a> RawInput<'a> {
	pub fn new(value: &'a str, file: Option<&'a FileRef>) -> Self {
		Self { value, file }
	}

	pub fn value(value: &'a str) -> Self {
		Self { value, file: None }
	}
}

impl FieldKind {
	pub fn optional(inner: FieldKind) -> Self {
		FieldKind::Optional(Box::new(inner))
	}

	pub fn wrapper(inner: FieldKind) -> Self {
		FieldKind::ScalarWrapper(Box::new(inner))
	}

	pub fn name(&self) -> &'static str {
		match self {
			FieldKind::String => "string",
			FieldKind::SignedInt(w) => w.signed_name(),
			FieldKind::UnsignedInt(w) => w.unsigned_name(),
			FieldKind::Float(FloatWidth::W32) => "f32",
			FieldKind::Float(FloatWidth::W64) => "f64",
			FieldKind::Bool => "bool",
			FieldKind::StringList => "string list",
			FieldKind::Date => "date",
			FieldKind::ScalarWrapper(_) => "scalar wrapper",
			FieldKind::FileRef => "file",
			FieldKind::Optional(_) => "optional",
		}
	}

	/// The innermost kind once optional and wrapper layers are removed.
	pub fn base(&self) -> &FieldKind {
		match self {
			FieldKind::Optional(inner) | FieldKind::ScalarWrapper(inner) => inner.base(),
			other => other,
		}
	}

	pub fn is_optional(&self) -> bool {
		matches!(self, FieldKind::Optional(_))
	}

	/// Decode raw element state into a typed value.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::kind::{FieldKind, IntWidth, RawInput, TypedValue};
	///
	/// let kind = FieldKind::SignedInt(IntWidth::W8);
	/// assert_eq!(kind.decode(RawInput::value("42")), Ok(TypedValue::Int(42)));
	/// assert!(kind.decode(RawInput::value("300")).is_err());
	///
	/// let maybe = FieldKind::optional(FieldKind::String);
	/// assert_eq!(maybe.decode(RawInput::value("")), Ok(TypedValue::Absent));
	/// ```
	pub fn decode(&self, input: RawInput<'_>) -> CoercionResult<TypedValue> {
		match self {
			FieldKind::String => Ok(TypedValue::String(input.value.to_string())),
			FieldKind::SignedInt(width) => decode_signed(input.value, *width),
			FieldKind::UnsignedInt(width) => decode_unsigned(input.value, *width),
			FieldKind::Float(width) => decode_float(input.value, *width),
			FieldKind::Bool => parse_bool(input.value).map(TypedValue::Bool),
			FieldKind::StringList => Ok(TypedValue::List(
				input.value.split_whitespace().map(str::to_string).collect(),
			)),
			FieldKind::Date => {
				let trimmed = input.value.trim();
				NaiveDate::parse_from_str(trimmed, DATE_LAYOUT)
					.map(TypedValue::Date)
					.map_err(|_| CoercionError::InvalidDate {
						value: input.value.to_string(),
						layout: DATE_LAYOUT,
					})
			}
			FieldKind::ScalarWrapper(inner) => inner.decode(input).map(TypedValue::wrap),
			FieldKind::FileRef => Ok(input
				.file
				.map(|file| TypedValue::File(file.clone()))
				.unwrap_or(TypedValue::Absent)),
			FieldKind::Optional(inner) => {
				if input.value.is_empty() && input.file.is_none() {
					Ok(TypedValue::Absent)
				} else {
					inner.decode(input)
				}
			}
		}
	}

	/// Encode a typed value into its form string.
	///
	/// Returns `Ok(None)` for an absent value: the element is left as it is
	/// rather than being set to an empty string. File kinds encode to the
	/// stored location (or name), never to binary content.
	pub fn encode(&self, value: &TypedValue) -> CoercionResult<Option<String>> {
		if matches!(value, TypedValue::Absent) {
			return Ok(None);
		}

		let encoded = match (self, value) {
			(FieldKind::Optional(inner), v) => return inner.encode(v),
			(FieldKind::ScalarWrapper(inner), TypedValue::Wrapped(v)) => return inner.encode(v),
			(FieldKind::ScalarWrapper(inner), v) => return inner.encode(v),
			(FieldKind::String, TypedValue::String(s)) => s.clone(),
			(FieldKind::SignedInt(_), TypedValue::Int(v)) => v.to_string(),
			(FieldKind::SignedInt(_), TypedValue::UInt(v)) => v.to_string(),
			(FieldKind::UnsignedInt(_), TypedValue::UInt(v)) => v.to_string(),
			(FieldKind::UnsignedInt(_), TypedValue::Int(v)) if *v >= 0 => v.to_string(),
			(FieldKind::Float(FloatWidth::W64), TypedValue::Float(v)) => v.to_string(),
			(FieldKind::Float(FloatWidth::W32), TypedValue::Float(v)) => (*v as f32).to_string(),
			(FieldKind::Float(_), TypedValue::Int(v)) => v.to_string(),
			(FieldKind::Bool, TypedValue::Bool(b)) => b.to_string(),
			(FieldKind::StringList, TypedValue::List(items)) => items.join(" "),
			(FieldKind::Date, TypedValue::Date(d)) => d.format(DATE_LAYOUT).to_string(),
			(FieldKind::FileRef, TypedValue::File(file)) => {
				file.location.clone().unwrap_or_else(|| file.name.clone())
			}
			(FieldKind::FileRef, TypedValue::String(location)) => location.clone(),
			(kind, v) => {
				return Err(CoercionError::TypeMismatch {
					expected: kind.name(),
					found: v.kind_name(),
				});
			}
		};

		Ok(Some(encoded))
	}
}

fn decode_signed(raw: &str, width: IntWidth) -> CoercionResult<TypedValue> {
	let trimmed = raw.trim();
	let out_of_range = || CoercionError::OutOfRange {
		value: raw.to_string(),
		target: width.signed_name(),
	};

	let parsed = trimmed.parse::<i64>().map_err(|e| match e.kind() {
		IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(),
		_ => CoercionError::InvalidInteger(raw.to_string()),
	})?;

	let (min, max) = width.signed_bounds();
	if parsed < min || parsed > max {
		return Err(out_of_range());
	}
	Ok(TypedValue::Int(parsed))
}

fn decode_unsigned(raw: &str, width: IntWidth) -> CoercionResult<TypedValue> {
	let trimmed = raw.trim();
	let out_of_range = || CoercionError::OutOfRange {
		value: raw.to_string(),
		target: width.unsigned_name(),
	};

	let parsed = trimmed.parse::<u64>().map_err(|e| match e.kind() {
		IntErrorKind::PosOverflow => out_of_range(),
		_ => CoercionError::InvalidInteger(raw.to_string()),
	})?;

	if parsed > width.unsigned_max() {
		return Err(out_of_range());
	}
	Ok(TypedValue::UInt(parsed))
}

fn decode_float(raw: &str, width: FloatWidth) -> CoercionResult<TypedValue> {
	let trimmed = raw.trim();
	let invalid = || CoercionError::InvalidFloat(raw.to_string());

	let (value, target) = match width {
		FloatWidth::W32 => (
			f64::from(trimmed.parse::<f32>().map_err(|_| invalid())?),
			"f32",
		),
		FloatWidth::W64 => (trimmed.parse::<f64>().map_err(|_| invalid())?, "f64"),
	};

	// Overflowing literals parse to infinity.
	if !value.is_finite() && !is_non_finite_literal(trimmed) {
		return Err(CoercionError::OutOfRange {
			value: raw.to_string(),
			target,
		});
	}
	Ok(TypedValue::Float(value))
}

fn is_non_finite_literal(text: &str) -> bool {
	let unsigned = text.trim_start_matches(['+', '-']);
	["inf", "infinity", "nan"]
		.iter()
		.any(|literal| unsigned.eq_ignore_ascii_case(literal))
}

/// Parse a submitted boolean.
///
/// An empty value is `false` (an unchecked checkbox is simply not
/// submitted). Accepted spellings are `1`/`0`, `t`/`f`, `true`/`false` and
/// `on`/`off`, case-insensitively.
pub fn parse_bool(raw: &str) -> CoercionResult<bool> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Ok(false);
	}

	const TRUTHY: [&str; 4] = ["1", "t", "true", "on"];
	const FALSY: [&str; 4] = ["0", "f", "false", "off"];

	if TRUTHY.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
		Ok(true)
	} else if FALSY.iter().any(|f| trimmed.eq_ignore_ascii_case(f)) {
		Ok(false)
	} else {
		Err(CoercionError::InvalidBool(raw.to_string()))
	}
}

/// A typed field value crossing the model boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
	String(String),
	Int(i64),
	UInt(u64),
	Float(f64),
	Bool(bool),
	List(Vec<String>),
	Date(NaiveDate),
	/// Value of a scalar wrapper's first field.
	Wrapped(Box<TypedValue>),
	File(FileRef),
	/// No value: an empty optional or a file field without a file.
	Absent,
}

impl TypedValue {
	pub fn wrap(inner: impl Into<TypedValue>) -> Self {
		TypedValue::Wrapped(Box::new(inner.into()))
	}

	pub fn kind_name(&self) -> &'static str {
		match self {
			TypedValue::String(_) => "string",
			TypedValue::Int(_) => "signed integer",
			TypedValue::UInt(_) => "unsigned integer",
			TypedValue::Float(_) => "float",
			TypedValue::Bool(_) => "bool",
			TypedValue::List(_) => "string list",
			TypedValue::Date(_) => "date",
			TypedValue::Wrapped(_) => "scalar wrapper",
			TypedValue::File(_) => "file",
			TypedValue::Absent => "absent",
		}
	}

	pub fn is_absent(&self) -> bool {
		matches!(self, TypedValue::Absent)
	}

	/// Remove one wrapper layer, if any.
	pub fn into_inner(self) -> TypedValue {
		match self {
			TypedValue::Wrapped(inner) => *inner,
			other => other,
		}
	}

	/// Convert into an optional Rust value; [`TypedValue::Absent`] becomes
	/// `None`.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::kind::TypedValue;
	///
	/// let none: Option<String> = TypedValue::Absent.into_option().unwrap();
	/// assert_eq!(none, None);
	/// let some: Option<u32> = TypedValue::UInt(7).into_option().unwrap();
	/// assert_eq!(some, Some(7));
	/// ```
	pub fn into_option<T>(self) -> CoercionResult<Option<T>>
	where
		T: TryFrom<TypedValue, Error = CoercionError>,
	{
		match self {
			TypedValue::Absent => Ok(None),
			other => T::try_from(other).map(Some),
		}
	}

	fn mismatch(self, expected: &'static str) -> CoercionError {
		CoercionError::TypeMismatch {
			expected,
			found: self.kind_name(),
		}
	}
}

macro_rules! impl_integer_conversions {
	($variant:ident, $wide:ty; $($t:ty),*) => {$(
		impl From<$t> for TypedValue {
			fn from(v: $t) -> Self {
				TypedValue::$variant(<$wide>::from(v))
			}
		}

		impl TryFrom<TypedValue> for $t {
			type Error = CoercionError;

			fn try_from(value: TypedValue) -> CoercionResult<Self> {
				let raw = match value {
					TypedValue::Int(v) => i128::from(v),
					TypedValue::UInt(v) => i128::from(v),
					TypedValue::Wrapped(inner) => return Self::try_from(*inner),
					other => return Err(other.mismatch(stringify!($t))),
				};
				<$t>::try_from(raw).map_err(|_| CoercionError::OutOfRange {
					value: raw.to_string(),
					target: stringify!($t),
				})
			}
		}
	)*};
}

impl_integer_conversions!(Int, i64; i8, i16, i32, i64);
impl_integer_conversions!(UInt, u64; u8, u16, u32, u64);

impl From<f64> for TypedValue {
	fn from(v: f64) -> Self {
		TypedValue::Float(v)
	}
}

impl From<f32> for TypedValue {
	fn from(v: f32) -> Self {
		TypedValue::Float(f64::from(v))
	}
}

impl TryFrom<TypedValue> for f64 {
	type Error = CoercionError;

	fn try_from(value: TypedValue) -> CoercionResult<Self> {
		match value {
			TypedValue::Float(v) => Ok(v),
			TypedValue::Int(v) => Ok(v as f64),
			TypedValue::UInt(v) => Ok(v as f64),
			TypedValue::Wrapped(inner) => f64::try_from(*inner),
			other => Err(other.mismatch("f64")),
		}
	}
}

impl TryFrom<TypedValue> for f32 {
	type Error = CoercionError;

	fn try_from(value: TypedValue) -> CoercionResult<Self> {
		f64::try_from(value).map(|v| v as f32)
	}
}

impl From<bool> for TypedValue {
	fn from(v: bool) -> Self {
		TypedValue::Bool(v)
	}
}

impl TryFrom<TypedValue> for bool {
	type Error = CoercionError;

	fn try_from(value: TypedValue) -> CoercionResult<Self> {
		match value {
			TypedValue::Bool(v) => Ok(v),
			TypedValue::Wrapped(inner) => bool::try_from(*inner),
			other => Err(other.mismatch("bool")),
		}
	}
}

impl From<String> for TypedValue {
	fn from(v: String) -> Self {
		TypedValue::String(v)
	}
}

impl From<&str> for TypedValue {
	fn from(v: &str) -> Self {
		TypedValue::String(v.to_string())
	}
}

impl TryFrom<TypedValue> for String {
	type Error = CoercionError;

	fn try_from(value: TypedValue) -> CoercionResult<Self> {
		match value {
			TypedValue::String(v) => Ok(v),
			TypedValue::Wrapped(inner) => String::try_from(*inner),
			other => Err(other.mismatch("string")),
		}
	}
}

impl From<Vec<String>> for TypedValue {
	fn from(v: Vec<String>) -> Self {
		TypedValue::List(v)
	}
}

impl TryFrom<TypedValue> for Vec<String> {
	type Error = CoercionError;

	fn try_from(value: TypedValue) -> CoercionResult<Self> {
		match value {
			TypedValue::List(v) => Ok(v),
			TypedValue::Wrapped(inner) => Vec::<String>::try_from(*inner),
			other => Err(other.mismatch("string list")),
		}
	}
}

impl From<NaiveDate> for TypedValue {
	fn from(v: NaiveDate) -> Self {
		TypedValue::Date(v)
	}
}

impl TryFrom<TypedValue> for NaiveDate {
	type Error = CoercionError;

	fn try_from(value: TypedValue) -> CoercionResult<Self> {
		match value {
			TypedValue::Date(v) => Ok(v),
			TypedValue::Wrapped(inner) => NaiveDate::try_from(*inner),
			other => Err(other.mismatch("date")),
		}
	}
}

impl From<FileRef> for TypedValue {
	fn from(v: FileRef) -> Self {
		TypedValue::File(v)
	}
}

impl TryFrom<TypedValue> for FileRef {
	type Error = CoercionError;

	fn try_from(value: TypedValue) -> CoercionResult<Self> {
		match value {
			TypedValue::File(v) => Ok(v),
			other => Err(other.mismatch("file")),
		}
	}
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
	fn from(v: Option<T>) -> Self {
		v.map(Into::into).unwrap_or(TypedValue::Absent)
	}
}
