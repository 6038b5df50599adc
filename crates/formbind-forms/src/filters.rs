//! Filters: ordered transforms applied after a form validates.
//!
//! A filter works on the [`Snapshot`] handed to it by its element and may
//! change the value, values or file; the element adopts the changed snapshot
//! before the next filter runs. Filters that need a file do nothing when
//! none is attached.

use crate::element::Snapshot;
use crate::error::FilterError;
use image::GenericImageView;
use image::imageops::FilterType;
use std::fs;
use std::path::Path;

/// A transform applied to an element snapshot.
pub trait Filter: Send + Sync {
	/// Short identifier used in logs and failure reports.
	fn name(&self) -> &'static str;

	fn apply(&mut self, snapshot: &mut Snapshot) -> Result<(), FilterError>;
}

/// Trims surrounding whitespace from the value and each of the values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimFilter;

impl Filter for TrimFilter {
	fn name(&self) -> &'static str {
		"trim"
	}

	fn apply(&mut self, snapshot: &mut Snapshot) -> Result<(), FilterError> {
		snapshot.value = snapshot.value.trim().to_string();
		for value in &mut snapshot.values {
			*value = value.trim().to_string();
		}
		Ok(())
	}
}

/// Lowercase ASCII slug: runs of anything other than `a-z0-9` collapse into
/// a single `-`, with none at either end.
fn slugify(text: &str) -> String {
	text.to_lowercase()
		.chars()
		.map(|ch| match ch {
			'a'..='z' | '0'..='9' => ch,
			_ => '-',
		})
		.collect::<String>()
		.split('-')
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join("-")
}

/// Assigns a storage location to the uploaded file.
///
/// The location is `<directory><slug of the name without extension>`,
/// followed by `-<uuid>` when randomised. The generated part is lowercase;
/// the directory is used as given. The extension is kept separately on the
/// file.
///
/// # Examples
///
/// ```
/// use formbind_forms::element::Snapshot;
/// use formbind_forms::file::FileRef;
/// use formbind_forms::filters::{Filter, RenameFilter};
///
/// let mut file = FileRef::stored("ignored");
/// file.name = "Holiday Photo.JPG".to_string();
/// file.extension = "JPG".to_string();
/// let mut snapshot = Snapshot { file: Some(file), ..Snapshot::default() };
///
/// RenameFilter::new("media/").apply(&mut snapshot).unwrap();
/// let location = snapshot.file.unwrap().location.unwrap();
/// assert_eq!(location, "media/holiday-photo");
/// ```
#[derive(Debug, Clone)]
pub struct RenameFilter {
	directory: String,
	randomize: bool,
}

impl RenameFilter {
	pub fn new(directory: impl Into<String>) -> Self {
		Self {
			directory: directory.into(),
			randomize: false,
		}
	}

	/// Append a random UUID to every generated location.
	pub fn randomized(mut self) -> Self {
		self.randomize = true;
		self
	}
}

impl Filter for RenameFilter {
	fn name(&self) -> &'static str {
		"rename"
	}

	fn apply(&mut self, snapshot: &mut Snapshot) -> Result<(), FilterError> {
		let Some(file) = snapshot.file.as_mut() else {
			return Ok(());
		};

		let stem = if file.extension.is_empty() {
			file.name.as_str()
		} else {
			file.name
				.strip_suffix(&format!(".{}", file.extension))
				.unwrap_or(file.name.as_str())
		};

		let mut location = format!("{}{}", self.directory, slugify(stem));
		if self.randomize {
			location.push('-');
			location.push_str(&uuid::Uuid::new_v4().to_string());
		}

		file.location = Some(location);
		Ok(())
	}
}

/// One output size of an [`ImageResizeFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeConversion {
	/// Target width; `0` derives it from the height keeping aspect ratio.
	pub width: u32,
	/// Target height; `0` derives it from the width keeping aspect ratio.
	pub height: u32,
	/// Output path with `{location}`, `{width}`, `{height}` and
	/// `{extension}` placeholders.
	pub layout: String,
}

impl ResizeConversion {
	pub fn new(width: u32, height: u32, layout: impl Into<String>) -> Self {
		Self {
			width,
			height,
			layout: layout.into(),
		}
	}

	fn render_path(&self, location: &str, extension: &str) -> String {
		self.layout
			.replace("{location}", location)
			.replace("{width}", &self.width.to_string())
			.replace("{height}", &self.height.to_string())
			.replace("{extension}", extension)
	}

	fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
		let scale = |num: u32, target: u32, den: u32| -> u32 {
			let scaled = (u64::from(num) * u64::from(target) + u64::from(den) / 2) / u64::from(den);
			u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
		};

		match (self.width, self.height) {
			(0, 0) => (width, height),
			(0, h) => (scale(width, h, height), h),
			(w, 0) => (w, scale(height, w, width)),
			(w, h) => (w, h),
		}
	}
}

/// Writes resized copies of an uploaded image, one per conversion.
///
/// Requires a storage location on the file, normally assigned by a
/// [`RenameFilter`] earlier in the chain. The output keeps the source
/// image format.
#[derive(Debug, Clone, Default)]
pub struct ImageResizeFilter {
	conversions: Vec<ResizeConversion>,
}

impl ImageResizeFilter {
	pub fn new(conversions: Vec<ResizeConversion>) -> Self {
		Self { conversions }
	}

	pub fn with_conversion(mut self, conversion: ResizeConversion) -> Self {
		self.conversions.push(conversion);
		self
	}
}

impl Filter for ImageResizeFilter {
	fn name(&self) -> &'static str {
		"image_resize"
	}

	fn apply(&mut self, snapshot: &mut Snapshot) -> Result<(), FilterError> {
		let Some(file) = snapshot.file.as_ref() else {
			return Ok(());
		};
		let Some(stream) = file.stream.as_ref() else {
			return Ok(());
		};
		let location = file.location.as_deref().ok_or(FilterError::MissingLocation)?;

		stream.rewind()?;
		let bytes = stream.read_remaining()?;
		let format = image::guess_format(&bytes)?;
		let img = image::load_from_memory_with_format(&bytes, format)?;
		let (width, height) = img.dimensions();

		for conversion in &self.conversions {
			let path = conversion.render_path(location, &file.extension);
			let (w, h) = conversion.target_dimensions(width, height);
			tracing::debug!(path = %path, width = w, height = h, "writing resized image");

			if let Some(parent) = Path::new(&path).parent()
				&& !parent.as_os_str().is_empty()
			{
				fs::create_dir_all(parent)?;
			}
			img.resize_exact(w, h, FilterType::Lanczos3)
				.save_with_format(&path, format)?;
		}

		Ok(())
	}
}

/// Saves the uploaded file to `<location>.<extension>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistFilter;

impl Filter for PersistFilter {
	fn name(&self) -> &'static str {
		"persist"
	}

	fn apply(&mut self, snapshot: &mut Snapshot) -> Result<(), FilterError> {
		match snapshot.file.as_ref() {
			Some(file) if file.stream.is_some() => {
				let path = file.persist()?;
				tracing::debug!(path = %path.display(), "file persisted");
				Ok(())
			}
			_ => Ok(()),
		}
	}
}
