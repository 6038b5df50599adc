//! Binding integration tests
//!
//! Request data into forms, forms into models and back, including the
//! coercion policies and partial correspondence between form and model.

use formbind_forms::{
	CoercionError, CoercionPolicy, CoercionResult, Element, FieldKind, Form, FormError,
	FormModel, FormSettings, IntWidth, ModelField, RawSubmission, TypedValue,
};
use rstest::{fixture, rstest};

/// Three-state flag carried as a wrapped optional bool.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Bool3 {
	#[default]
	Undefined,
	Yes,
	No,
}

impl Bool3 {
	fn to_typed(self) -> TypedValue {
		let inner = match self {
			Bool3::Undefined => TypedValue::Absent,
			Bool3::Yes => TypedValue::Bool(true),
			Bool3::No => TypedValue::Bool(false),
		};
		TypedValue::wrap(inner)
	}

	fn from_typed(value: TypedValue) -> CoercionResult<Self> {
		Ok(match value.into_inner().into_option::<bool>()? {
			None => Bool3::Undefined,
			Some(true) => Bool3::Yes,
			Some(false) => Bool3::No,
		})
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Account {
	user_email: String,
	display_name: Option<String>,
	age: u8,
	newsletter: Bool3,
	roles: Vec<String>,
	internal_note: String,
}

impl FormModel for Account {
	fn fields() -> Vec<ModelField> {
		vec![
			ModelField::new("UserEmail", FieldKind::String),
			ModelField::new("DisplayName", FieldKind::optional(FieldKind::String)).with_key("nick"),
			ModelField::new("Age", FieldKind::UnsignedInt(IntWidth::W8)),
			ModelField::new(
				"Newsletter",
				FieldKind::wrapper(FieldKind::optional(FieldKind::Bool)),
			),
			ModelField::new("Roles", FieldKind::StringList),
			ModelField::new("InternalNote", FieldKind::String),
		]
	}

	fn get_field(&self, name: &str) -> Option<TypedValue> {
		match name {
			"UserEmail" => Some(self.user_email.clone().into()),
			"DisplayName" => Some(self.display_name.clone().into()),
			"Age" => Some(self.age.into()),
			"Newsletter" => Some(self.newsletter.to_typed()),
			"Roles" => Some(self.roles.clone().into()),
			"InternalNote" => Some(self.internal_note.clone().into()),
			_ => None,
		}
	}

	fn set_field(&mut self, name: &str, value: TypedValue) -> CoercionResult<()> {
		match name {
			"UserEmail" => self.user_email = value.try_into()?,
			"DisplayName" => self.display_name = value.into_option()?,
			"Age" => self.age = value.try_into()?,
			"Newsletter" => self.newsletter = Bool3::from_typed(value)?,
			"Roles" => self.roles = value.try_into()?,
			"InternalNote" => self.internal_note = value.try_into()?,
			_ => {}
		}
		Ok(())
	}
}

fn account_form(settings: FormSettings) -> Form {
	let mut form = Form::with_settings(settings);
	form.append(vec![
		Element::email("user_email"),
		Element::text("nick"),
		Element::number("age"),
		Element::select("newsletter"),
		Element::multi_checkbox("roles[]"),
	])
	.unwrap();
	form
}

#[fixture]
fn lenient_form() -> Form {
	account_form(FormSettings::default())
}

#[rstest]
fn test_multi_valued_binding_and_query(mut lenient_form: Form) {
	// Arrange
	let mut form = Form::new();
	form.add(Element::multi_checkbox("tags[]")).unwrap();
	let source = RawSubmission::new().with_values("tags[]", ["a", "b"]);

	// Act
	form.bind_source(&source);
	lenient_form.bind_source(&RawSubmission::from_urlencoded("roles[]=admin&roles[]=staff"));

	// Assert
	assert_eq!(form.get("tags").unwrap().values(), ["a", "b"]);
	assert_eq!(form.build_query(), "tags[]=a&tags[]=b");
	assert_eq!(lenient_form.get("roles[]").unwrap().values(), ["admin", "staff"]);
}

#[rstest]
fn test_unmatched_model_field_keeps_prior_value(mut lenient_form: Form) {
	// Arrange
	lenient_form.bind_source(&RawSubmission::from_urlencoded("age=20"));
	let mut account = Account {
		internal_note: "keep me".to_string(),
		..Account::default()
	};

	// Act
	let report = lenient_form.map_to(&mut account).unwrap();

	// Assert
	assert_eq!(account.internal_note, "keep me");
	assert_eq!(report.unmatched, ["InternalNote"]);
	assert!(report.is_clean());
}

#[rstest]
fn test_empty_optional_string_maps_to_none(mut lenient_form: Form) {
	// Arrange
	lenient_form.bind_source(&RawSubmission::from_urlencoded("nick=&age=20"));
	let mut account = Account {
		display_name: Some("before".to_string()),
		..Account::default()
	};

	// Act
	let report = lenient_form.map_to(&mut account).unwrap();

	// Assert
	assert_eq!(account.display_name, None);
	assert!(report.is_clean());
}

#[rstest]
#[case("", Bool3::Undefined)]
#[case("1", Bool3::Yes)]
#[case("0", Bool3::No)]
fn test_wrapped_tri_state(mut lenient_form: Form, #[case] raw: &str, #[case] expected: Bool3) {
	// Arrange
	lenient_form.get_mut("newsletter").unwrap().set_value(raw);
	let mut account = Account {
		newsletter: Bool3::No,
		..Account::default()
	};

	// Act
	lenient_form.map_to(&mut account).unwrap();

	// Assert
	assert_eq!(account.newsletter, expected);
}

#[rstest]
fn test_undefined_wrapper_leaves_element_untouched(mut lenient_form: Form) {
	lenient_form.get_mut("newsletter").unwrap().set_value("1");

	lenient_form.bind_model(&Account::default());

	assert_eq!(lenient_form.get("newsletter").unwrap().value(), "1");
}

#[rstest]
fn test_key_override_is_used_in_both_directions(mut lenient_form: Form) {
	// Arrange
	let account = Account {
		display_name: Some("ada".to_string()),
		..Account::default()
	};

	// Act
	lenient_form.bind_model(&account);
	let mut restored = Account::default();
	lenient_form.map_to(&mut restored).unwrap();

	// Assert
	assert_eq!(lenient_form.get("nick").unwrap().value(), "ada");
	assert_eq!(restored.display_name.as_deref(), Some("ada"));
}

#[rstest]
fn test_lenient_reports_and_continues(mut lenient_form: Form) {
	// Arrange
	lenient_form.bind_source(&RawSubmission::from_urlencoded(
		"user_email=a%40b.io&age=old&newsletter=maybe",
	));
	let mut account = Account {
		age: 30,
		..Account::default()
	};

	// Act
	let report = lenient_form.map_to(&mut account).unwrap();

	// Assert
	assert_eq!(account.user_email, "a@b.io");
	assert_eq!(account.age, 30);
	let failed: Vec<_> = report.failures.iter().map(|f| f.field.as_str()).collect();
	assert_eq!(failed, ["Age", "Newsletter"]);
	assert_eq!(
		report.failures[1].error,
		CoercionError::InvalidBool("maybe".to_string())
	);
}

#[rstest]
fn test_strict_fails_without_writing() {
	// Arrange
	let mut form = account_form(FormSettings::default().with_coercion(CoercionPolicy::Strict));
	form.bind_source(&RawSubmission::from_urlencoded("user_email=a%40b.io&age=-3"));
	let mut account = Account::default();

	// Act
	let result = form.map_to(&mut account);

	// Assert
	match result {
		Err(FormError::Coercion { field, key, source }) => {
			assert_eq!(field, "Age");
			assert_eq!(key, "age");
			assert_eq!(source, CoercionError::InvalidInteger("-3".to_string()));
		}
		other => panic!("expected coercion error, got {:?}", other),
	}
	assert_eq!(account, Account::default());
}

#[rstest]
fn test_bind_source_then_map_round_trip(mut lenient_form: Form) {
	// Arrange
	let source = RawSubmission::new()
		.with_value("user_email", "x@example.com")
		.with_value("nick", "X")
		.with_value("age", "41")
		.with_value("newsletter", "true")
		.with_values("roles[]", ["editor", "viewer"]);

	// Act
	lenient_form.bind_source(&source);
	let mut account = Account::default();
	let report = lenient_form.map_to(&mut account).unwrap();

	// Assert
	assert!(report.is_clean());
	assert_eq!(
		account,
		Account {
			user_email: "x@example.com".to_string(),
			display_name: Some("X".to_string()),
			age: 41,
			newsletter: Bool3::Yes,
			roles: vec!["editor".to_string(), "viewer".to_string()],
			internal_note: String::new(),
		}
	);
}
