//! Serializable read-only view of a form for renderers.
//!
//! A [`Form`] holds trait objects and byte streams; [`FormMetadata`] is plain
//! data that a template engine or a client-side renderer can consume as
//! JSON.

use crate::element::{Attribute, Element, ElementKind};
use crate::form::Form;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormMetadata {
	pub action: String,
	pub theme: String,
	pub has_error: bool,
	pub context: HashMap<String, serde_json::Value>,
	pub elements: Vec<ElementMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementMetadata {
	pub name: String,
	pub label: String,
	pub kind: ElementKind,
	pub value: String,
	pub values: Vec<String>,
	pub attributes: Vec<Attribute>,
	pub options: Vec<OptionMetadata>,
	pub file: Option<FileMetadata>,
	/// Rendered error texts.
	pub errors: Vec<String>,
	pub checked: bool,
}

/// A value option with its live selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionMetadata {
	pub value: String,
	pub label: String,
	pub selected: bool,
	pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
	pub name: String,
	pub location: Option<String>,
}

impl From<&Element> for ElementMetadata {
	fn from(element: &Element) -> Self {
		Self {
			name: element.name().to_string(),
			label: element.label().to_string(),
			kind: element.kind(),
			value: element.value().to_string(),
			values: element.values().to_vec(),
			attributes: element.attributes().to_vec(),
			options: element
				.value_options()
				.iter()
				.map(|option| OptionMetadata {
					value: option.value.clone(),
					label: option.label.clone(),
					selected: element.is_option_selected(option),
					disabled: option.disabled,
				})
				.collect(),
			file: element.file().map(|file| FileMetadata {
				name: file.name.clone(),
				location: file.location.clone(),
			}),
			errors: element.errors().iter().map(ToString::to_string).collect(),
			checked: element.is_checked(),
		}
	}
}

impl Form {
	/// Export the form as plain data.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::element::Element;
	/// use formbind_forms::form::Form;
	///
	/// let mut form = Form::new();
	/// form.set_action("/signup");
	/// form.add(Element::email("email").with_label("E-mail")).unwrap();
	///
	/// let json = serde_json::to_value(form.to_metadata()).unwrap();
	/// assert_eq!(json["action"], "/signup");
	/// assert_eq!(json["elements"][0]["kind"], "email");
	/// ```
	pub fn to_metadata(&self) -> FormMetadata {
		FormMetadata {
			action: self.action().to_string(),
			theme: self.theme().to_string(),
			has_error: self.has_error(),
			context: self.context().clone(),
			elements: self.elements().iter().map(ElementMetadata::from).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::element::ValueOption;
	use crate::file::FileRef;
	use crate::validators::Required;
	use rstest::rstest;

	#[rstest]
	fn test_metadata_carries_live_selection_and_errors() {
		// Arrange
		let mut form = Form::new();
		form.add(
			Element::radio("plan")
				.with_option(ValueOption::new("free", "Free").selected())
				.with_option(ValueOption::new("pro", "Pro")),
		)
		.unwrap();
		form.add(Element::text("name").with_validator(Required))
			.unwrap();
		form.get_mut("plan").unwrap().set_value("pro");
		form.is_valid();

		// Act
		let metadata = form.to_metadata();

		// Assert
		assert!(metadata.has_error);
		let plan = &metadata.elements[0];
		assert_eq!(
			plan.options.iter().map(|o| o.selected).collect::<Vec<_>>(),
			[false, true]
		);
		assert_eq!(metadata.elements[1].errors, ["This field is required"]);
	}

	#[rstest]
	fn test_metadata_file_has_no_content() {
		let mut form = Form::new();
		form.add(Element::file_input("avatar")).unwrap();
		form.get_mut("avatar")
			.unwrap()
			.set_file(Some(FileRef::stored("media/a.png")));

		let json = serde_json::to_value(form.to_metadata()).unwrap();

		assert_eq!(
			json["elements"][0]["file"],
			serde_json::json!({"name": "a.png", "location": "media/a.png"})
		);
		assert_eq!(json["elements"][0]["kind"], "file");
	}

	#[rstest]
	fn test_multicheckbox_kind_tag() {
		let element = Element::multi_checkbox("tags[]");

		let metadata = ElementMetadata::from(&element);

		assert_eq!(serde_json::to_value(metadata.kind).unwrap(), "multicheckbox");
	}
}
