//! Form description, request binding and model mapping
//!
//! This crate provides:
//! - Forms as ordered, name-keyed collections of typed elements
//! - Binding of submitted values and uploaded files into elements
//! - Two-way mapping between elements and application models through an
//!   explicit set of field kinds
//! - Per-element validation with message codes and positional arguments
//! - Filters (trim, rename, image resize, persist) run only after the whole
//!   form validates
//!
//! ## Example
//!
//! ```
//! use formbind_forms::{Element, Form, MinLength, RawSubmission, Required};
//!
//! let mut form = Form::new();
//! form.add(
//!     Element::text("username")
//!         .with_validator(Required)
//!         .with_validator(MinLength::new(3)),
//! )
//! .unwrap();
//!
//! form.bind_source(&RawSubmission::from_urlencoded("username=al"));
//! assert!(!form.is_valid());
//! assert_eq!(
//!     form.get("username").unwrap().errors()[0].to_string(),
//!     "Value length must be at least 3"
//! );
//! ```

pub mod binding;
pub mod element;
pub mod error;
pub mod file;
pub mod filters;
pub mod form;
pub mod kind;
pub mod message;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod settings;
pub mod source;
pub mod validators;

pub use binding::{BindingReport, CoercionFailure};
pub use element::{Attribute, Element, ElementKind, Snapshot, ValueOption};
pub use error::{
	CoercionError, CoercionResult, FilterError, FilterFailure, FormError, FormResult,
	SettingsError,
};
pub use file::{FileRef, FileStream, UploadedFile};
pub use filters::{
	Filter, ImageResizeFilter, PersistFilter, RenameFilter, ResizeConversion, TrimFilter,
};
pub use form::Form;
pub use kind::{FieldKind, FloatWidth, IntWidth, TypedValue};
pub use message::{Message, MessageArg};
pub use metadata::{ElementMetadata, FormMetadata};
pub use model::{FormModel, ModelField};
pub use naming::to_form_key;
pub use settings::{CoercionPolicy, ErrorFlagPolicy, FilterErrorPolicy, FormSettings};
pub use source::{BindingSource, RawSubmission};
pub use validators::{
	EmailAddress, Identical, MaxDate, MaxLength, MaxValue, MinDate, MinLength, MinValue,
	Required, Validator,
};
