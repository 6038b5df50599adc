//! The binding engine.
//!
//! Three independent directions:
//!
//! - [`bind_source`]: submitted values and files into elements
//! - [`bind_model`]: a model's current values into elements, for display
//! - [`map_to`]: element values decoded into a model
//!
//! None of them creates elements. Keys with no matching element and model
//! fields with no matching element are skipped without error.

use crate::element::Element;
use crate::error::{CoercionError, FormError, FormResult};
use crate::file::FileRef;
use crate::form::Form;
use crate::kind::{FieldKind, RawInput, TypedValue};
use crate::model::{FormModel, ModelField};
use crate::naming::strip_multiplicity;
use crate::settings::CoercionPolicy;
use crate::source::BindingSource;

/// A field that could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionFailure {
	/// Model field name.
	pub field: String,
	/// Form key the field was bound through.
	pub key: String,
	pub error: CoercionError,
}

/// Outcome of a binding call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingReport {
	/// Keys of elements that received a value.
	pub bound: Vec<String>,
	/// Submitted keys or model fields with no matching element.
	pub unmatched: Vec<String>,
	/// Fields skipped because their value could not be converted.
	pub failures: Vec<CoercionFailure>,
}

impl BindingReport {
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Copy submitted values and files into the form's elements.
///
/// Multi-valued elements take every submitted value, others the first one.
/// File elements only take uploads; among several uploads with a non-empty
/// filename the last one wins. Elements absent from both maps are left as
/// they were.
///
/// # Examples
///
/// ```
/// use formbind_forms::element::Element;
/// use formbind_forms::form::Form;
/// use formbind_forms::source::RawSubmission;
///
/// let mut form = Form::new();
/// form.add(Element::multi_checkbox("tags[]")).unwrap();
/// form.add(Element::text("title")).unwrap();
///
/// let report = form.bind_source(&RawSubmission::from_urlencoded("tags[]=a&tags[]=b&other=1"));
/// assert_eq!(form.get("tags").unwrap().values(), ["a", "b"]);
/// assert_eq!(report.unmatched, ["other"]);
/// ```
pub fn bind_source(form: &mut Form, source: &impl BindingSource) -> BindingReport {
	let mut report = BindingReport::default();

	let mut value_keys: Vec<&String> = source.values().keys().collect();
	value_keys.sort();

	for raw_key in value_keys {
		let key = strip_multiplicity(raw_key);
		let Ok(element) = form.get_mut(&key) else {
			tracing::debug!(key = %raw_key, "submitted key has no element");
			report.unmatched.push(key.into_owned());
			continue;
		};

		if element.kind().is_file() {
			tracing::debug!(key = %raw_key, "skipping string value for file element");
			continue;
		}

		let submitted = &source.values()[raw_key];
		if element.kind().is_multi_valued() {
			element.set_values(submitted.clone());
		} else {
			element.set_value(submitted.first().cloned().unwrap_or_default());
		}
		report.bound.push(key.into_owned());
	}

	let mut file_keys: Vec<&String> = source.files().keys().collect();
	file_keys.sort();

	for raw_key in file_keys {
		let key = strip_multiplicity(raw_key);
		let Ok(element) = form.get_mut(&key) else {
			tracing::debug!(key = %raw_key, "uploaded file has no element");
			report.unmatched.push(key.into_owned());
			continue;
		};

		let mut attached = false;
		for upload in source.files()[raw_key].iter().filter(|u| !u.filename.is_empty()) {
			element.set_file(Some(FileRef::from_upload(upload)));
			attached = true;
		}
		if attached {
			report.bound.push(key.into_owned());
		}
	}

	report
}

fn find_element<'f>(form: &'f Form, field: &ModelField, key: &str) -> Option<&'f Element> {
	let element = form.get(key).ok();
	if element.is_none() {
		tracing::debug!(field = %field.name, key = %key, "model field has no element");
	}
	element
}

/// Seed the form's elements from a model's current values.
///
/// Absent values leave the element untouched. String lists go to `values`
/// on multi-valued elements and are space-joined otherwise. File fields
/// produce a display-only file whose name is the last segment of the stored
/// location.
pub fn bind_model<M: FormModel>(form: &mut Form, model: &M) -> BindingReport {
	let mut report = BindingReport::default();

	for field in M::fields() {
		let key = field.form_key();
		let Ok(element) = form.get_mut(&key) else {
			tracing::debug!(field = %field.name, key = %key, "model field has no element");
			report.unmatched.push(field.name.clone());
			continue;
		};

		let Some(value) = model.get_field(&field.name) else {
			tracing::debug!(field = %field.name, "model returned no value");
			continue;
		};

		match write_element(element, &field.kind, value) {
			Ok(true) => report.bound.push(key),
			Ok(false) => {}
			Err(error) => {
				tracing::warn!(field = %field.name, key = %key, error = %error, "cannot encode model field");
				report.failures.push(CoercionFailure {
					field: field.name.clone(),
					key,
					error,
				});
			}
		}
	}

	report
}

/// Write one typed value into an element. Returns whether the element
/// changed.
fn write_element(
	element: &mut Element,
	kind: &FieldKind,
	value: TypedValue,
) -> Result<bool, CoercionError> {
	let value = value.into_inner();
	if value.is_absent() {
		return Ok(false);
	}

	let base = kind.base();

	if *base == FieldKind::FileRef || element.kind().is_file() {
		let file = match value {
			TypedValue::File(file) => match file.location {
				Some(location) => FileRef::stored(location),
				None => FileRef {
					stream: None,
					..file
				},
			},
			TypedValue::String(location) if !location.is_empty() => FileRef::stored(location),
			TypedValue::String(_) => return Ok(false),
			other => {
				return Err(CoercionError::TypeMismatch {
					expected: "file",
					found: other.kind_name(),
				});
			}
		};
		element.set_file(Some(file));
		return Ok(true);
	}

	if element.kind().is_multi_valued()
		&& let TypedValue::List(items) = &value
	{
		element.set_values(items.clone());
		return Ok(true);
	}

	match kind.encode(&value)? {
		Some(encoded) if element.kind().is_multi_valued() => {
			element.set_values(encoded.split_whitespace().map(str::to_string).collect());
			Ok(true)
		}
		Some(encoded) => {
			element.set_value(encoded);
			Ok(true)
		}
		None => Ok(false),
	}
}

/// Read an element's current state as the raw string for decoding.
fn read_element(element: &Element) -> String {
	if element.kind().is_multi_valued() {
		element.values().join(" ")
	} else {
		element.value().to_string()
	}
}

/// Decode element values into the model.
///
/// Fields are visited in the model's declaration order. Under
/// [`CoercionPolicy::Strict`] every field is decoded before anything is
/// written, and the first failure is returned as
/// [`FormError::Coercion`] with the model untouched. A value the model
/// rejects during the write pass fails the same way; fields written before
/// it are set back to their prior values. Under
/// [`CoercionPolicy::Lenient`] decoded fields are written and failures are
/// listed in the report.
///
/// An absent decoded value is only written to optional fields; other fields
/// keep their prior value.
///
/// # Examples
///
/// ```
/// use formbind_forms::element::Element;
/// use formbind_forms::error::CoercionResult;
/// use formbind_forms::form::Form;
/// use formbind_forms::kind::{FieldKind, TypedValue};
/// use formbind_forms::model::{FormModel, ModelField};
///
/// #[derive(Default)]
/// struct Search {
///     query: String,
///     page: Option<String>,
/// }
///
/// impl FormModel for Search {
///     fn fields() -> Vec<ModelField> {
///         vec![
///             ModelField::new("Query", FieldKind::String),
///             ModelField::new("Page", FieldKind::optional(FieldKind::String)),
///         ]
///     }
///
///     fn get_field(&self, name: &str) -> Option<TypedValue> {
///         match name {
///             "Query" => Some(self.query.clone().into()),
///             "Page" => Some(self.page.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn set_field(&mut self, name: &str, value: TypedValue) -> CoercionResult<()> {
///         match name {
///             "Query" => self.query = value.try_into()?,
///             "Page" => self.page = value.into_option()?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
///
/// let mut form = Form::new();
/// form.add(Element::search("query")).unwrap();
/// form.add(Element::hidden("page")).unwrap();
/// form.get_mut("query").unwrap().set_value("rust");
///
/// let mut search = Search { page: Some("3".into()), ..Search::default() };
/// form.map_to(&mut search).unwrap();
/// assert_eq!(search.query, "rust");
/// assert_eq!(search.page, None);
/// ```
pub fn map_to<M: FormModel>(form: &Form, model: &mut M) -> FormResult<BindingReport> {
	let policy = form.settings().coercion;
	let mut report = BindingReport::default();
	let mut decoded = Vec::new();

	for field in M::fields() {
		let key = field.form_key();
		let Some(element) = find_element(form, &field, &key) else {
			report.unmatched.push(field.name.clone());
			continue;
		};

		let raw = read_element(element);
		let input = RawInput::new(&raw, element.file());

		match field.kind.decode(input) {
			Ok(value) if value.is_absent() && !field.kind.is_optional() => {
				tracing::debug!(field = %field.name, "no value; keeping model default");
			}
			Ok(value) => decoded.push((field, key, value)),
			Err(error) => match policy {
				CoercionPolicy::Strict => {
					return Err(FormError::Coercion {
						field: field.name,
						key,
						source: error,
					});
				}
				CoercionPolicy::Lenient => {
					tracing::warn!(field = %field.name, key = %key, error = %error, "skipping field that failed to decode");
					report.failures.push(CoercionFailure {
						field: field.name,
						key,
						error,
					});
				}
			},
		}
	}

	let mut written = Vec::new();

	for (field, key, value) in decoded {
		let prior = match policy {
			CoercionPolicy::Strict => model.get_field(&field.name),
			CoercionPolicy::Lenient => None,
		};

		match model.set_field(&field.name, value) {
			Ok(()) => {
				if let Some(prior) = prior {
					written.push((field.name, prior));
				}
				report.bound.push(key);
			}
			Err(error) => match policy {
				CoercionPolicy::Strict => {
					restore(model, written);
					return Err(FormError::Coercion {
						field: field.name,
						key,
						source: error,
					});
				}
				CoercionPolicy::Lenient => {
					tracing::warn!(field = %field.name, key = %key, error = %error, "model rejected decoded value");
					report.failures.push(CoercionFailure {
						field: field.name,
						key,
						error,
					});
				}
			},
		}
	}

	Ok(report)
}

/// Put back the values captured before a strict write pass, newest first.
fn restore<M: FormModel>(model: &mut M, written: Vec<(String, TypedValue)>) {
	for (name, prior) in written.into_iter().rev() {
		if let Err(error) = model.set_field(&name, prior) {
			tracing::warn!(field = %name, error = %error, "cannot restore field after rejected write");
		}
	}
}
