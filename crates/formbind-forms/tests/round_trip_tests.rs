//! Model to form to model round trip
//!
//! A model seeded into an empty form and mapped back into a fresh model
//! must come out unchanged for every representable field kind.

use chrono::NaiveDate;
use formbind_forms::{
	CoercionResult, Element, FieldKind, FloatWidth, Form, FormModel, IntWidth, ModelField,
	TypedValue,
};
use proptest::prelude::*;
use rstest::rstest;

/// Value object carried by its single field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Score(u16);

#[derive(Debug, Clone, Default, PartialEq)]
struct Everything {
	text: String,
	tiny: i8,
	small: i16,
	medium: i32,
	large: i64,
	utiny: u8,
	usmall: u16,
	umedium: u32,
	ularge: u64,
	single: f32,
	double: f64,
	flag: bool,
	born_on: Option<NaiveDate>,
	started_on: NaiveDate,
	score: Score,
	tags: Vec<String>,
}

impl FormModel for Everything {
	fn fields() -> Vec<ModelField> {
		vec![
			ModelField::new("Text", FieldKind::String),
			ModelField::new("Tiny", FieldKind::SignedInt(IntWidth::W8)),
			ModelField::new("Small", FieldKind::SignedInt(IntWidth::W16)),
			ModelField::new("Medium", FieldKind::SignedInt(IntWidth::W32)),
			ModelField::new("Large", FieldKind::SignedInt(IntWidth::W64)),
			ModelField::new("UTiny", FieldKind::UnsignedInt(IntWidth::W8)),
			ModelField::new("USmall", FieldKind::UnsignedInt(IntWidth::W16)),
			ModelField::new("UMedium", FieldKind::UnsignedInt(IntWidth::W32)),
			ModelField::new("ULarge", FieldKind::UnsignedInt(IntWidth::W64)),
			ModelField::new("Single", FieldKind::Float(FloatWidth::W32)),
			ModelField::new("Double", FieldKind::Float(FloatWidth::W64)),
			ModelField::new("Flag", FieldKind::Bool),
			ModelField::new("BornOn", FieldKind::optional(FieldKind::Date)),
			ModelField::new("StartedOn", FieldKind::Date),
			ModelField::new("Score", FieldKind::wrapper(FieldKind::UnsignedInt(IntWidth::W16))),
			ModelField::new("Tags", FieldKind::StringList),
		]
	}

	fn get_field(&self, name: &str) -> Option<TypedValue> {
		let value: TypedValue = match name {
			"Text" => self.text.clone().into(),
			"Tiny" => self.tiny.into(),
			"Small" => self.small.into(),
			"Medium" => self.medium.into(),
			"Large" => self.large.into(),
			"UTiny" => self.utiny.into(),
			"USmall" => self.usmall.into(),
			"UMedium" => self.umedium.into(),
			"ULarge" => self.ularge.into(),
			"Single" => self.single.into(),
			"Double" => self.double.into(),
			"Flag" => self.flag.into(),
			"BornOn" => self.born_on.into(),
			"StartedOn" => self.started_on.into(),
			"Score" => TypedValue::wrap(self.score.0),
			"Tags" => self.tags.clone().into(),
			_ => return None,
		};
		Some(value)
	}

	fn set_field(&mut self, name: &str, value: TypedValue) -> CoercionResult<()> {
		match name {
			"Text" => self.text = value.try_into()?,
			"Tiny" => self.tiny = value.try_into()?,
			"Small" => self.small = value.try_into()?,
			"Medium" => self.medium = value.try_into()?,
			"Large" => self.large = value.try_into()?,
			"UTiny" => self.utiny = value.try_into()?,
			"USmall" => self.usmall = value.try_into()?,
			"UMedium" => self.umedium = value.try_into()?,
			"ULarge" => self.ularge = value.try_into()?,
			"Single" => self.single = value.try_into()?,
			"Double" => self.double = value.try_into()?,
			"Flag" => self.flag = value.try_into()?,
			"BornOn" => self.born_on = value.into_option()?,
			"StartedOn" => self.started_on = value.try_into()?,
			"Score" => self.score = Score(value.try_into()?),
			"Tags" => self.tags = value.try_into()?,
			_ => {}
		}
		Ok(())
	}
}

fn empty_form() -> Form {
	let mut form = Form::new();
	form.append(vec![
		Element::textarea("text"),
		Element::number("tiny"),
		Element::number("small"),
		Element::number("medium"),
		Element::number("large"),
		Element::number("u_tiny"),
		Element::number("u_small"),
		Element::number("u_medium"),
		Element::number("u_large"),
		Element::number("single"),
		Element::number("double"),
		Element::checkbox("flag"),
		Element::text("born_on"),
		Element::text("started_on"),
		Element::number("score"),
		Element::multi_checkbox("tags[]"),
	])
	.unwrap();
	form
}

fn round_trip(model: &Everything) -> Everything {
	let mut form = empty_form();
	let seeded = form.bind_model(model);
	assert!(seeded.unmatched.is_empty(), "unmatched: {:?}", seeded.unmatched);
	assert!(seeded.is_clean());

	let mut restored = Everything::default();
	let report = form.map_to(&mut restored).unwrap();
	assert!(report.is_clean(), "failures: {:?}", report.failures);
	restored
}

#[rstest]
fn test_round_trip_extremes() {
	// Arrange
	let model = Everything {
		text: "  keeps surrounding space\nand lines ".to_string(),
		tiny: i8::MIN,
		small: i16::MAX,
		medium: -1,
		large: i64::MIN,
		utiny: u8::MAX,
		usmall: 0,
		umedium: u32::MAX,
		ularge: u64::MAX,
		single: 0.1,
		double: -1.5e300,
		flag: true,
		born_on: NaiveDate::from_ymd_opt(1999, 12, 31),
		started_on: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
		score: Score(u16::MAX),
		tags: vec!["alpha".to_string(), "beta".to_string()],
	};

	// Act
	let restored = round_trip(&model);

	// Assert
	assert_eq!(restored, model);
}

#[rstest]
fn test_round_trip_defaults() {
	let model = Everything::default();

	assert_eq!(round_trip(&model), model);
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
	(700_000i32..800_000)
		.prop_map(|days| NaiveDate::from_num_days_from_ce_opt(days).unwrap_or_default())
}

fn everything_strategy() -> impl Strategy<Value = Everything> {
	(
		(
			".*",
			any::<i8>(),
			any::<i16>(),
			any::<i32>(),
			any::<i64>(),
			any::<u8>(),
			any::<u16>(),
		),
		(
			any::<u32>(),
			any::<u64>(),
			any::<f32>().prop_filter("finite", |v| v.is_finite()),
			any::<f64>().prop_filter("finite", |v| v.is_finite()),
			any::<bool>(),
			prop::option::of(date_strategy()),
			date_strategy(),
			any::<u16>().prop_map(Score),
			prop::collection::vec("[a-z0-9]{1,8}", 0..5),
		),
	)
		.prop_map(
			|(
				(text, tiny, small, medium, large, utiny, usmall),
				(umedium, ularge, single, double, flag, born_on, started_on, score, tags),
			)| Everything {
				text,
				tiny,
				small,
				medium,
				large,
				utiny,
				usmall,
				umedium,
				ularge,
				single,
				double,
				flag,
				born_on,
				started_on,
				score,
				tags,
			},
		)
}

proptest! {
	/// Every field survives bind_model followed by map_to.
	#[test]
	fn prop_model_form_model_round_trip(model in everything_strategy()) {
		let restored = round_trip(&model);

		prop_assert_eq!(restored, model);
	}
}
