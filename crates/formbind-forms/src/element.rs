//! Form elements.
//!
//! An [`Element`] is one form field: its identity, current value(s), an
//! attached file, rendering attributes and the validators and filters that
//! act on it. Validators and filters never look at the element directly;
//! each holds its own [`Snapshot`], refreshed every time the element's value,
//! values or file change.

use crate::error::{FilterError, FilterFailure, FormError, FormResult};
use crate::file::FileRef;
use crate::filters::Filter;
use crate::message::Message;
use crate::naming::strip_multiplicity;
use crate::validators::{ReferencedElement, Validator};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
	Text,
	Textarea,
	Select,
	Radio,
	Checkbox,
	MultiCheckbox,
	Hidden,
	Password,
	Email,
	Number,
	Search,
	Tel,
	File,
	Button,
	Submit,
	/// Image submit button.
	Image,
	Captcha,
}

impl ElementKind {
	/// Kind tag used by renderers.
	pub fn as_str(&self) -> &'static str {
		match self {
			ElementKind::Text => "text",
			ElementKind::Textarea => "textarea",
			ElementKind::Select => "select",
			ElementKind::Radio => "radio",
			ElementKind::Checkbox => "checkbox",
			ElementKind::MultiCheckbox => "multicheckbox",
			ElementKind::Hidden => "hidden",
			ElementKind::Password => "password",
			ElementKind::Email => "email",
			ElementKind::Number => "number",
			ElementKind::Search => "search",
			ElementKind::Tel => "tel",
			ElementKind::File => "file",
			ElementKind::Button => "button",
			ElementKind::Submit => "submit",
			ElementKind::Image => "image",
			ElementKind::Captcha => "captcha",
		}
	}

	/// Whether the element binds to `values` instead of `value`.
	pub fn is_multi_valued(&self) -> bool {
		matches!(self, ElementKind::MultiCheckbox)
	}

	/// Whether the element binds to an uploaded file.
	pub fn is_file(&self) -> bool {
		matches!(self, ElementKind::File)
	}
}

impl fmt::Display for ElementKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Rendering attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
	pub key: String,
	pub value: String,
}

/// One choice of an enumerable element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueOption {
	pub value: String,
	pub label: String,
	/// Default selection, used only while the element has no live value.
	pub selected: bool,
	pub disabled: bool,
}

impl ValueOption {
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			label: label.into(),
			selected: false,
			disabled: false,
		}
	}

	pub fn selected(mut self) -> Self {
		self.selected = true;
		self
	}

	pub fn disabled(mut self) -> Self {
		self.disabled = true;
		self
	}
}

/// Point-in-time copy of an element's value state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
	pub value: String,
	pub values: Vec<String>,
	pub file: Option<FileRef>,
}

struct ValidatorSlot {
	validator: Box<dyn Validator>,
	snapshot: Snapshot,
}

struct FilterSlot {
	filter: Box<dyn Filter>,
	snapshot: Snapshot,
}

/// A single form field.
pub struct Element {
	name: String,
	label: String,
	kind: ElementKind,
	value: String,
	values: Vec<String>,
	file: Option<FileRef>,
	attributes: Vec<Attribute>,
	options: Vec<ValueOption>,
	validators: Vec<ValidatorSlot>,
	filters: Vec<FilterSlot>,
	errors: Vec<Message>,
}

macro_rules! kind_constructors {
	($($fn_name:ident => $kind:ident),* $(,)?) => {$(
		pub fn $fn_name(name: impl Into<String>) -> Self {
			Self::new(ElementKind::$kind, name)
		}
	)*};
}

impl Element {
	/// Create an empty element.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::element::{Element, ElementKind};
	///
	/// let tags = Element::new(ElementKind::MultiCheckbox, "tags[]");
	/// assert_eq!(tags.name(), "tags[]");
	/// assert_eq!(tags.key(), "tags");
	/// assert!(tags.kind().is_multi_valued());
	/// ```
	pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			label: String::new(),
			kind,
			value: String::new(),
			values: Vec::new(),
			file: None,
			attributes: Vec::new(),
			options: Vec::new(),
			validators: Vec::new(),
			filters: Vec::new(),
			errors: Vec::new(),
		}
	}

	kind_constructors! {
		text => Text,
		textarea => Textarea,
		select => Select,
		radio => Radio,
		checkbox => Checkbox,
		multi_checkbox => MultiCheckbox,
		hidden => Hidden,
		password => Password,
		email => Email,
		number => Number,
		search => Search,
		tel => Tel,
		file_input => File,
		button => Button,
		submit => Submit,
		image => Image,
		captcha => Captcha,
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.add_attribute(key, value);
		self
	}

	pub fn with_option(mut self, option: ValueOption) -> Self {
		self.add_value_option(option);
		self
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.add_validator(validator);
		self
	}

	pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
		self.add_filter(filter);
		self
	}

	/// Name as declared, including any multiplicity marker.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Name with the multiplicity marker stripped; unique within a form.
	pub fn key(&self) -> Cow<'_, str> {
		strip_multiplicity(&self.name)
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn set_label(&mut self, label: impl Into<String>) {
		self.label = label.into();
	}

	pub fn kind(&self) -> ElementKind {
		self.kind
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	pub fn values(&self) -> &[String] {
		&self.values
	}

	pub fn file(&self) -> Option<&FileRef> {
		self.file.as_ref()
	}

	pub fn set_value(&mut self, value: impl Into<String>) {
		self.value = value.into();

		if self.kind == ElementKind::Select {
			let mut marked = false;
			for option in &mut self.options {
				option.selected = !marked && option.value == self.value;
				marked |= option.selected;
			}
		}

		self.push_snapshot();
	}

	pub fn set_values(&mut self, values: Vec<String>) {
		self.values = values;
		self.push_snapshot();
	}

	/// Attach a file, replacing any previous one. `None` detaches.
	pub fn set_file(&mut self, file: Option<FileRef>) {
		self.file = file;
		self.push_snapshot();
	}

	/// Current value state as a snapshot.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot {
			value: self.value.clone(),
			values: self.values.clone(),
			file: self.file.clone(),
		}
	}

	fn push_snapshot(&mut self) {
		let snapshot = self.snapshot();
		for slot in &mut self.validators {
			slot.snapshot = snapshot.clone();
		}
		for slot in &mut self.filters {
			slot.snapshot = snapshot.clone();
		}
	}

	fn adopt(&mut self, snapshot: Snapshot) {
		self.value = snapshot.value;
		self.values = snapshot.values;
		self.file = snapshot.file;
		self.push_snapshot();
	}

	/// Set an attribute. An existing key keeps its position and takes the
	/// new value.
	pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		let value = value.into();
		match self.attributes.iter_mut().find(|attr| attr.key == key) {
			Some(attr) => attr.value = value,
			None => self.attributes.push(Attribute { key, value }),
		}
	}

	pub fn has_attribute(&self, key: &str) -> bool {
		self.attributes.iter().any(|attr| attr.key == key)
	}

	pub fn attribute(&self, key: &str) -> FormResult<&str> {
		self.attributes
			.iter()
			.find(|attr| attr.key == key)
			.map(|attr| attr.value.as_str())
			.ok_or_else(|| FormError::AttributeNotFound(key.to_string()))
	}

	/// Replace the value of an existing attribute.
	pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) -> FormResult<()> {
		let attr = self
			.attributes
			.iter_mut()
			.find(|attr| attr.key == key)
			.ok_or_else(|| FormError::AttributeNotFound(key.to_string()))?;
		attr.value = value.into();
		Ok(())
	}

	pub fn attributes(&self) -> &[Attribute] {
		&self.attributes
	}

	pub fn add_value_option(&mut self, option: ValueOption) {
		self.options.push(option);
	}

	pub fn value_options(&self) -> &[ValueOption] {
		&self.options
	}

	/// Live selection state of `option`: membership in the current value(s)
	/// once any are set, else the option's default.
	pub fn is_option_selected(&self, option: &ValueOption) -> bool {
		if self.kind.is_multi_valued() {
			if self.values.is_empty() {
				option.selected
			} else {
				self.is_checked_in_values(&option.value)
			}
		} else if self.value.is_empty() {
			option.selected
		} else {
			self.value == option.value
		}
	}

	/// True when the value is non-empty and not `"false"`.
	pub fn is_checked(&self) -> bool {
		!self.value.is_empty() && self.value != "false"
	}

	pub fn is_checked_in_values(&self, value: &str) -> bool {
		self.values.iter().any(|v| v == value)
	}

	pub fn add_validator(&mut self, validator: impl Validator + 'static) {
		self.validators.push(ValidatorSlot {
			validator: Box::new(validator),
			snapshot: self.snapshot(),
		});
	}

	pub fn validators(&self) -> impl Iterator<Item = &dyn Validator> {
		self.validators.iter().map(|slot| slot.validator.as_ref())
	}

	pub fn clear_validators(&mut self) {
		self.validators.clear();
	}

	pub fn add_filter(&mut self, filter: impl Filter + 'static) {
		self.filters.push(FilterSlot {
			filter: Box::new(filter),
			snapshot: self.snapshot(),
		});
	}

	pub fn filters(&self) -> impl Iterator<Item = &dyn Filter> {
		self.filters.iter().map(|slot| slot.filter.as_ref())
	}

	pub fn clear_filters(&mut self) {
		self.filters.clear();
	}

	pub fn errors(&self) -> &[Message] {
		&self.errors
	}

	pub fn add_error(&mut self, message: Message) {
		self.errors.push(message);
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	/// Names of elements referenced by this element's validators, with the
	/// validator's position.
	pub(crate) fn references(&self) -> Vec<(usize, String)> {
		self.validators
			.iter()
			.enumerate()
			.filter_map(|(i, slot)| slot.validator.reference().map(|r| (i, r.to_string())))
			.collect()
	}

	pub(crate) fn resolve_reference(&mut self, index: usize, target: Option<ReferencedElement>) {
		if let Some(slot) = self.validators.get_mut(index) {
			slot.validator.resolve_reference(target);
		}
	}

	/// Run every validator against its snapshot. The error list is replaced
	/// with the messages of the failing validators.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::element::Element;
	/// use formbind_forms::validators::{MinLength, Required};
	///
	/// let mut password = Element::password("password")
	///     .with_validator(Required)
	///     .with_validator(MinLength::new(8));
	/// assert!(!password.validate());
	/// assert_eq!(password.errors().len(), 2);
	///
	/// password.set_value("correct horse");
	/// assert!(password.validate());
	/// assert!(password.errors().is_empty());
	/// ```
	pub fn validate(&mut self) -> bool {
		self.errors = self
			.validators
			.iter()
			.filter_map(|slot| slot.validator.validate(&slot.snapshot).err())
			.collect();
		self.errors.is_empty()
	}

	/// Apply the attached filters in order. Each filter sees the result of
	/// the previous ones. With `halt` set, the first failure stops the run.
	pub(crate) fn run_filters(&mut self, halt: bool) -> Vec<FilterFailure> {
		let mut failures = Vec::new();

		for i in 0..self.filters.len() {
			let slot = &mut self.filters[i];
			let mut snapshot = slot.snapshot.clone();
			let name = slot.filter.name();

			match slot.filter.apply(&mut snapshot) {
				Ok(()) => {
					tracing::debug!(element = %self.name, filter = name, "filter applied");
					self.adopt(snapshot);
				}
				Err(error) => {
					failures.push(self.failure(name, error));
					if halt {
						break;
					}
				}
			}
		}

		failures
	}

	fn failure(&self, filter: &'static str, error: FilterError) -> FilterFailure {
		FilterFailure {
			element: self.name.clone(),
			filter,
			error,
		}
	}
}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Element")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("value", &self.value)
			.field("values", &self.values)
			.field("file", &self.file)
			.field(
				"validators",
				&self.validators().map(|v| v.name()).collect::<Vec<_>>(),
			)
			.field("filters", &self.filters().map(|v| v.name()).collect::<Vec<_>>())
			.field("errors", &self.errors)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filters::TrimFilter;
	use crate::message::codes;
	use crate::validators::{MaxLength, Required};
	use rstest::rstest;

	#[rstest]
	fn test_attribute_last_write_wins_and_keeps_order() {
		// Arrange
		let mut el = Element::text("name");

		// Act
		el.add_attribute("class", "a");
		el.add_attribute("id", "x");
		el.add_attribute("class", "b");

		// Assert
		let keys: Vec<_> = el.attributes().iter().map(|a| a.key.as_str()).collect();
		assert_eq!(keys, ["class", "id"]);
		assert_eq!(el.attribute("class").unwrap(), "b");
	}

	#[rstest]
	fn test_missing_attribute_is_an_error() {
		let mut el = Element::text("name");

		assert!(matches!(
			el.attribute("placeholder"),
			Err(FormError::AttributeNotFound(key)) if key == "placeholder"
		));
		assert!(el.set_attribute("placeholder", "x").is_err());
		assert!(!el.has_attribute("placeholder"));
	}

	#[rstest]
	fn test_select_marks_first_matching_option() {
		// Arrange
		let mut el = Element::select("color")
			.with_option(ValueOption::new("red", "Red").selected())
			.with_option(ValueOption::new("blue", "Blue"))
			.with_option(ValueOption::new("blue", "Also blue"));

		// Act
		el.set_value("blue");

		// Assert
		let selected: Vec<_> = el.value_options().iter().map(|o| o.selected).collect();
		assert_eq!(selected, [false, true, false]);
	}

	#[rstest]
	fn test_option_selection_prefers_live_value() {
		let mut el = Element::multi_checkbox("tags[]")
			.with_option(ValueOption::new("a", "A").selected())
			.with_option(ValueOption::new("b", "B"));
		let (a, b) = (el.value_options()[0].clone(), el.value_options()[1].clone());
		assert!(el.is_option_selected(&a));

		el.set_values(vec!["b".to_string()]);

		assert!(!el.is_option_selected(&a));
		assert!(el.is_option_selected(&b));
	}

	#[rstest]
	#[case("", false)]
	#[case("false", false)]
	#[case("on", true)]
	#[case("0", true)]
	fn test_is_checked(#[case] value: &str, #[case] expected: bool) {
		let mut el = Element::checkbox("agree");

		el.set_value(value);

		assert_eq!(el.is_checked(), expected);
	}

	#[rstest]
	fn test_validators_see_value_set_after_attachment() {
		let mut el = Element::text("title").with_validator(Required);

		el.set_value("hello");

		assert!(el.validate());
	}

	#[rstest]
	fn test_error_list_is_replaced_on_each_validation() {
		// Arrange
		let mut el = Element::text("title")
			.with_validator(Required)
			.with_validator(MaxLength::new(3));
		el.add_error(Message::text("stale"));

		// Act
		let valid = el.validate();

		// Assert
		assert!(!valid);
		let codes: Vec<_> = el.errors().iter().map(|m| m.code.as_str()).collect();
		assert_eq!(codes, [codes::REQUIRED]);
	}

	#[rstest]
	fn test_filters_chain_through_element_state() {
		let mut el = Element::text("title")
			.with_filter(TrimFilter)
			.with_filter(TrimFilter);
		el.set_value("  padded  ");

		let failures = el.run_filters(false);

		assert!(failures.is_empty());
		assert_eq!(el.value(), "padded");
	}

	#[rstest]
	fn test_debug_lists_attached_names() {
		let el = Element::text("title").with_validator(Required);

		let text = format!("{:?}", el);

		assert!(text.contains("required"));
	}
}
