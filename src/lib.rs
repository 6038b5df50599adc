//! # Formbind
//!
//! Form description and data binding for web request handling.
//!
//! A form is an ordered, name-keyed collection of typed elements. Request
//! data is bound into it, validated element by element, transformed by
//! filters once the whole form is valid, and finally mapped into an
//! application model. The same mapping runs in reverse to seed a form from a
//! model before rendering.
//!
//! ## Quick Example
//!
//! ```
//! use formbind::prelude::*;
//!
//! #[derive(Default)]
//! struct Login {
//!     email: String,
//!     remember_me: bool,
//! }
//!
//! impl FormModel for Login {
//!     fn fields() -> Vec<ModelField> {
//!         vec![
//!             ModelField::new("Email", FieldKind::String),
//!             ModelField::new("RememberMe", FieldKind::Bool),
//!         ]
//!     }
//!
//!     fn get_field(&self, name: &str) -> Option<TypedValue> {
//!         match name {
//!             "Email" => Some(self.email.clone().into()),
//!             "RememberMe" => Some(self.remember_me.into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set_field(&mut self, name: &str, value: TypedValue) -> CoercionResult<()> {
//!         match name {
//!             "Email" => self.email = value.try_into()?,
//!             "RememberMe" => self.remember_me = value.try_into()?,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut form = Form::new();
//! form.add(
//!     Element::email("email")
//!         .with_validator(Required)
//!         .with_validator(EmailAddress),
//! )
//! .unwrap();
//! form.add(Element::checkbox("remember_me")).unwrap();
//!
//! form.bind_source(&RawSubmission::from_urlencoded(
//!     "email=ada%40example.com&remember_me=on",
//! ));
//! assert!(form.is_valid());
//!
//! let mut login = Login::default();
//! form.map_to(&mut login).unwrap();
//! assert_eq!(login.email, "ada@example.com");
//! assert!(login.remember_me);
//! ```
//!
//! ## Configuration
//!
//! Coercion, filter error and error flag policies are set per form through
//! [`FormSettings`], either in code or from `FORMBIND_*` environment
//! variables with [`FormSettings::from_env`].

pub use formbind_forms::*;

/// Commonly used types in one import.
pub mod prelude {
	pub use formbind_forms::{
		BindingSource, CoercionPolicy, CoercionResult, Element, ElementKind, EmailAddress,
		ErrorFlagPolicy, FieldKind, FileRef, FilterErrorPolicy, Form, FormError, FormModel,
		FormResult, FormSettings, Identical, IntWidth, MaxLength, MinLength, ModelField,
		RawSubmission, Required, TypedValue, ValueOption,
	};
}
