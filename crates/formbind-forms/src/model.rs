//! Model-side binding contract.
//!
//! A model describes its fields once, in declaration order, and exposes
//! typed getters and setters keyed by field name. The binding engine never
//! inspects the model in any other way.

use crate::error::CoercionResult;
use crate::kind::{FieldKind, TypedValue};
use crate::naming::to_form_key;

/// Descriptor of one model field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelField {
	/// Field identifier as declared on the model, e.g. `UserEmail`.
	pub name: String,
	pub kind: FieldKind,
	/// Explicit form key, overriding the derived one.
	pub key: Option<String>,
}

impl ModelField {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			key: None,
		}
	}

	/// Override the derived form key.
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Key under which this field is looked up in a form.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::kind::FieldKind;
	/// use formbind_forms::model::ModelField;
	///
	/// let field = ModelField::new("UserEmail", FieldKind::String);
	/// assert_eq!(field.form_key(), "user_email");
	///
	/// let field = ModelField::new("UserEmail", FieldKind::String).with_key("mail");
	/// assert_eq!(field.form_key(), "mail");
	/// ```
	pub fn form_key(&self) -> String {
		self.key
			.clone()
			.unwrap_or_else(|| to_form_key(&self.name))
	}
}

/// A record type that can be populated from and projected into a form.
///
/// # Examples
///
/// ```
/// use formbind_forms::error::{CoercionError, CoercionResult};
/// use formbind_forms::kind::{FieldKind, IntWidth, TypedValue};
/// use formbind_forms::model::{FormModel, ModelField};
///
/// #[derive(Default)]
/// struct Signup {
///     email: String,
///     age: u8,
/// }
///
/// impl FormModel for Signup {
///     fn fields() -> Vec<ModelField> {
///         vec![
///             ModelField::new("Email", FieldKind::String),
///             ModelField::new("Age", FieldKind::UnsignedInt(IntWidth::W8)),
///         ]
///     }
///
///     fn get_field(&self, name: &str) -> Option<TypedValue> {
///         match name {
///             "Email" => Some(self.email.clone().into()),
///             "Age" => Some(self.age.into()),
///             _ => None,
///         }
///     }
///
///     fn set_field(&mut self, name: &str, value: TypedValue) -> CoercionResult<()> {
///         match name {
///             "Email" => self.email = value.try_into()?,
///             "Age" => self.age = value.try_into()?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
///
/// let mut signup = Signup::default();
/// signup.set_field("Age", TypedValue::UInt(30)).unwrap();
/// assert_eq!(signup.age, 30);
/// assert_eq!(Signup::fields()[0].form_key(), "email");
/// ```
pub trait FormModel {
	/// Field descriptors in declaration order.
	fn fields() -> Vec<ModelField>;

	/// Current value of a field, or `None` when the name is unknown.
	fn get_field(&self, name: &str) -> Option<TypedValue>;

	/// Assign a decoded value to a field.
	fn set_field(&mut self, name: &str, value: TypedValue) -> CoercionResult<()>;
}
