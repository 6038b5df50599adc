//! The form container.
//!
//! A [`Form`] is an ordered collection of elements, unique by key (the name
//! with any multiplicity marker stripped). It orchestrates binding,
//! validation and filtering across its elements. A form serves a single
//! request; binding and validation mutate element state in place.

use crate::binding::{self, BindingReport};
use crate::element::Element;
use crate::error::{FilterFailure, FormError, FormResult};
use crate::model::FormModel;
use crate::naming::{MULTIPLICITY_MARKER, strip_multiplicity};
use crate::settings::{ErrorFlagPolicy, FilterErrorPolicy, FormSettings};
use crate::source::BindingSource;
use crate::validators::ReferencedElement;
use std::collections::{HashMap, HashSet};
use url::form_urlencoded::byte_serialize;

const DEFAULT_THEME: &str = "default";

/// An HTML form description bound to one request.
#[derive(Debug)]
pub struct Form {
	action: String,
	elements: Vec<Element>,
	has_error: bool,
	settings: FormSettings,
	theme: String,
	context: HashMap<String, serde_json::Value>,
	filter_failures: Vec<FilterFailure>,
}

impl Default for Form {
	fn default() -> Self {
		Self::new()
	}
}

impl Form {
	pub fn new() -> Self {
		Self::with_settings(FormSettings::default())
	}

	pub fn with_settings(settings: FormSettings) -> Self {
		Self {
			action: String::new(),
			elements: Vec::new(),
			has_error: false,
			settings,
			theme: DEFAULT_THEME.to_string(),
			context: HashMap::new(),
			filter_failures: Vec::new(),
		}
	}

	pub fn settings(&self) -> &FormSettings {
		&self.settings
	}

	pub fn action(&self) -> &str {
		&self.action
	}

	pub fn set_action(&mut self, action: impl Into<String>) {
		self.action = action.into();
	}

	pub fn theme(&self) -> &str {
		&self.theme
	}

	pub fn set_theme(&mut self, theme: impl Into<String>) {
		self.theme = theme.into();
	}

	/// Opaque values passed through to renderers.
	pub fn context(&self) -> &HashMap<String, serde_json::Value> {
		&self.context
	}

	pub fn set_context(&mut self, key: impl Into<String>, value: serde_json::Value) {
		self.context.insert(key.into(), value);
	}

	fn position(&self, key: &str) -> Option<usize> {
		let key = strip_multiplicity(key);
		self.elements.iter().position(|e| e.key() == key)
	}

	/// Whether an element exists under `key`; a multiplicity marker on
	/// `key` is ignored.
	pub fn has(&self, key: &str) -> bool {
		self.position(key).is_some()
	}

	pub fn get(&self, key: &str) -> FormResult<&Element> {
		self.position(key)
			.map(|i| &self.elements[i])
			.ok_or_else(|| FormError::ElementNotFound(key.to_string()))
	}

	pub fn get_mut(&mut self, key: &str) -> FormResult<&mut Element> {
		match self.position(key) {
			Some(i) => Ok(&mut self.elements[i]),
			None => Err(FormError::ElementNotFound(key.to_string())),
		}
	}

	/// Add an element at the end.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::element::Element;
	/// use formbind_forms::form::Form;
	///
	/// let mut form = Form::new();
	/// form.add(Element::multi_checkbox("tags[]")).unwrap();
	/// assert!(form.has("tags"));
	/// assert!(form.add(Element::text("tags")).is_err());
	/// ```
	pub fn add(&mut self, element: Element) -> FormResult<()> {
		if self.has(element.name()) {
			return Err(FormError::DuplicateElement(element.key().into_owned()));
		}
		self.elements.push(element);
		Ok(())
	}

	/// Check that `incoming` keys are unique among themselves and, unless
	/// replacing, against the current elements.
	fn check_unique(&self, incoming: &[Element], replacing: bool) -> FormResult<()> {
		let mut seen: HashSet<String> = if replacing {
			HashSet::new()
		} else {
			self.elements.iter().map(|e| e.key().into_owned()).collect()
		};
		for element in incoming {
			let key = element.key().into_owned();
			if !seen.insert(key.clone()) {
				return Err(FormError::DuplicateElement(key));
			}
		}
		Ok(())
	}

	/// Add elements at the end. Nothing is added if any key is taken.
	pub fn append(&mut self, elements: Vec<Element>) -> FormResult<()> {
		self.check_unique(&elements, false)?;
		self.elements.extend(elements);
		Ok(())
	}

	/// Add elements at the front, keeping their order. Nothing is added if
	/// any key is taken.
	pub fn prepend(&mut self, elements: Vec<Element>) -> FormResult<()> {
		self.check_unique(&elements, false)?;
		self.elements.splice(0..0, elements);
		Ok(())
	}

	/// Replace all elements.
	pub fn set_elements(&mut self, elements: Vec<Element>) -> FormResult<()> {
		self.check_unique(&elements, true)?;
		self.elements = elements;
		Ok(())
	}

	pub fn elements(&self) -> &[Element] {
		&self.elements
	}

	pub fn remove(&mut self, key: &str) -> FormResult<Element> {
		let index = self
			.position(key)
			.ok_or_else(|| FormError::ElementNotFound(key.to_string()))?;
		Ok(self.elements.remove(index))
	}

	pub fn has_error(&self) -> bool {
		self.has_error
	}

	pub fn set_error(&mut self, has_error: bool) {
		self.has_error = has_error;
	}

	/// Failures recorded by the last filter run.
	pub fn filter_failures(&self) -> &[FilterFailure] {
		&self.filter_failures
	}

	fn resolve_references(&mut self) {
		let mut resolutions = Vec::new();

		for (element_index, element) in self.elements.iter().enumerate() {
			for (validator_index, target) in element.references() {
				let resolved = self.position(&target).map(|i| {
					let target = &self.elements[i];
					ReferencedElement {
						label: target.label().to_string(),
						value: target.value().to_string(),
					}
				});
				if resolved.is_none() {
					tracing::debug!(element = element.name(), target = %target, "referenced element not found");
				}
				resolutions.push((element_index, validator_index, resolved));
			}
		}

		for (element_index, validator_index, resolved) in resolutions {
			self.elements[element_index].resolve_reference(validator_index, resolved);
		}
	}

	/// Validate every element and, when all pass, run the filters.
	///
	/// Each element's error list is replaced with the messages of its
	/// failing validators. Under [`ErrorFlagPolicy::Sticky`] a form that
	/// failed once keeps reporting failure; filter failures are recorded in
	/// [`filter_failures`](Self::filter_failures) and do not change the
	/// result.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::element::Element;
	/// use formbind_forms::form::Form;
	/// use formbind_forms::validators::Required;
	///
	/// let mut form = Form::new();
	/// form.add(Element::text("name").with_validator(Required)).unwrap();
	/// assert!(!form.is_valid());
	/// assert_eq!(form.get("name").unwrap().errors().len(), 1);
	/// ```
	pub fn is_valid(&mut self) -> bool {
		self.resolve_references();

		let mut valid = true;
		for element in &mut self.elements {
			if !element.validate() {
				tracing::debug!(element = element.name(), errors = element.errors().len(), "element failed validation");
				valid = false;
			}
		}

		match self.settings.error_flag {
			ErrorFlagPolicy::Sticky => self.has_error |= !valid,
			ErrorFlagPolicy::ResetOnValidate => self.has_error = !valid,
		}

		if self.has_error {
			return false;
		}

		self.run_filters();
		true
	}

	fn run_filters(&mut self) {
		let halt = self.settings.filter_errors == FilterErrorPolicy::Halt;
		self.filter_failures.clear();

		for element in &mut self.elements {
			let failures = element.run_filters(halt);
			for failure in &failures {
				tracing::warn!(
					element = %failure.element,
					filter = failure.filter,
					error = %failure.error,
					"filter failed"
				);
			}
			self.filter_failures.extend(failures);
			if halt && !self.filter_failures.is_empty() {
				break;
			}
		}
	}

	/// Run the filters of every element without validating.
	///
	/// Failures are recorded in [`filter_failures`](Self::filter_failures)
	/// under both policies. Under [`FilterErrorPolicy::Halt`] the first
	/// failure also stops the run and is returned.
	pub fn apply_filters(&mut self) -> FormResult<()> {
		self.run_filters();
		match self.settings.filter_errors {
			FilterErrorPolicy::Halt => match self.filter_failures.first() {
				Some(failure) => Err(FormError::Filter(failure.clone())),
				None => Ok(()),
			},
			FilterErrorPolicy::Continue => Ok(()),
		}
	}

	/// Render element values as a query string.
	///
	/// Values are form-urlencoded. Multi-valued elements repeat their key
	/// with a `[]` suffix.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::element::Element;
	/// use formbind_forms::form::Form;
	///
	/// let mut form = Form::new();
	/// form.add(Element::text("q")).unwrap();
	/// form.add(Element::multi_checkbox("tags[]")).unwrap();
	/// form.get_mut("q").unwrap().set_value("rust & go");
	/// form.get_mut("tags").unwrap().set_values(vec!["a".into(), "b".into()]);
	/// assert_eq!(form.build_query(), "q=rust+%26+go&tags[]=a&tags[]=b");
	/// ```
	pub fn build_query(&self) -> String {
		let mut pairs = Vec::new();

		for element in &self.elements {
			let key: String = byte_serialize(element.key().as_bytes()).collect();
			if element.kind().is_multi_valued() {
				for value in element.values() {
					let value: String = byte_serialize(value.as_bytes()).collect();
					pairs.push(format!("{}{}={}", key, MULTIPLICITY_MARKER, value));
				}
			} else {
				let value: String = byte_serialize(element.value().as_bytes()).collect();
				pairs.push(format!("{}={}", key, value));
			}
		}

		pairs.join("&")
	}

	/// Populate elements from submitted values and files.
	pub fn bind_source(&mut self, source: &impl BindingSource) -> BindingReport {
		binding::bind_source(self, source)
	}

	/// Populate elements from a model's current field values.
	pub fn bind_model<M: FormModel>(&mut self, model: &M) -> BindingReport {
		binding::bind_model(self, model)
	}

	/// Decode element values into a model, following the coercion policy.
	pub fn map_to<M: FormModel>(&self, model: &mut M) -> FormResult<BindingReport> {
		binding::map_to(self, model)
	}
}
