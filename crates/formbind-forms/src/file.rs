//! Uploaded and stored file references.
//!
//! A [`FileStream`] wraps the transport's byte stream. It is a single-pass
//! resource: every consumer that needs the bytes again must call
//! [`FileStream::rewind`] first. Clones share the same underlying stream,
//! so a rewind or read through one clone moves the position for all.

use crate::error::FilterError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// MIME-style headers attached to an uploaded file part.
pub type Headers = HashMap<String, Vec<String>>;

const CONTENT_TYPE: &str = "content-type";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Readable and seekable byte source.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Shared handle to a one-shot readable file body.
#[derive(Clone)]
pub struct FileStream {
	inner: Arc<Mutex<Box<dyn ReadSeek>>>,
}

impl FileStream {
	/// Wrap any seekable reader.
	pub fn new<R>(reader: R) -> Self
	where
		R: Read + Seek + Send + 'static,
	{
		Self {
			inner: Arc::new(Mutex::new(Box::new(reader))),
		}
	}

	/// Wrap an in-memory buffer.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::file::FileStream;
	///
	/// let stream = FileStream::from_bytes(b"hello".to_vec());
	/// assert_eq!(stream.read_remaining().unwrap(), b"hello");
	/// // The stream is exhausted until it is rewound.
	/// assert!(stream.read_remaining().unwrap().is_empty());
	/// stream.rewind().unwrap();
	/// assert_eq!(stream.read_remaining().unwrap(), b"hello");
	/// ```
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
		Self::new(Cursor::new(bytes.into()))
	}

	/// Reset the read position to the start of the stream.
	pub fn rewind(&self) -> io::Result<()> {
		self.inner.lock().seek(SeekFrom::Start(0)).map(|_| ())
	}

	/// Read everything from the current position to the end.
	pub fn read_remaining(&self) -> io::Result<Vec<u8>> {
		let mut buf = Vec::new();
		self.inner.lock().read_to_end(&mut buf)?;
		Ok(buf)
	}

	/// Copy everything from the current position into `writer`.
	pub fn copy_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<u64> {
		let mut guard = self.inner.lock();
		io::copy(&mut *guard, writer)
	}
}

impl fmt::Debug for FileStream {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FileStream").finish_non_exhaustive()
	}
}

/// Inbound file descriptor handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
	pub headers: Headers,
	pub filename: String,
	pub stream: FileStream,
}

impl UploadedFile {
	pub fn new(filename: impl Into<String>, stream: FileStream) -> Self {
		Self {
			headers: Headers::new(),
			filename: filename.into(),
			stream,
		}
	}

	pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.entry(key.into()).or_default().push(value.into());
		self
	}
}

/// A file attached to an element: either freshly uploaded (with a stream)
/// or a display-only reference to an already stored file.
#[derive(Debug, Clone, Default)]
pub struct FileRef {
	pub headers: Headers,
	/// Original file name as submitted, or the last path segment of a
	/// stored location.
	pub name: String,
	pub extension: String,
	/// Storage location without extension, assigned by rename filters or
	/// loaded from a model.
	pub location: Option<String>,
	pub stream: Option<FileStream>,
}

impl FileRef {
	/// Build a reference from an uploaded file descriptor.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::file::{FileRef, FileStream, UploadedFile};
	///
	/// let upload = UploadedFile::new("Holiday Photo.JPG", FileStream::from_bytes(vec![]));
	/// let file = FileRef::from_upload(&upload);
	/// assert_eq!(file.name, "Holiday Photo.JPG");
	/// assert_eq!(file.extension, "JPG");
	/// assert!(file.location.is_none());
	/// ```
	pub fn from_upload(upload: &UploadedFile) -> Self {
		let extension = upload
			.filename
			.rsplit_once('.')
			.map(|(_, ext)| ext.to_string())
			.unwrap_or_default();

		Self {
			headers: upload.headers.clone(),
			name: upload.filename.clone(),
			extension,
			location: None,
			stream: Some(upload.stream.clone()),
		}
	}

	/// Build a display-only reference to a stored file. The name is the
	/// last path segment of `location`; there is no binary content.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_forms::file::FileRef;
	///
	/// let file = FileRef::stored("uploads/avatars/alice.png");
	/// assert_eq!(file.name, "alice.png");
	/// assert_eq!(file.location.as_deref(), Some("uploads/avatars/alice.png"));
	/// assert!(file.stream.is_none());
	/// ```
	pub fn stored(location: impl Into<String>) -> Self {
		let location = location.into();
		let name = location
			.rsplit('/')
			.next()
			.unwrap_or(location.as_str())
			.to_string();

		Self {
			name,
			location: Some(location),
			..Self::default()
		}
	}

	/// Header values for `key`, compared case-insensitively.
	pub fn header(&self, key: &str) -> Option<&[String]> {
		self.headers
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(key))
			.map(|(_, v)| v.as_slice())
	}

	pub fn content_type(&self) -> Option<String> {
		self.header(CONTENT_TYPE)
			.filter(|values| !values.is_empty())
			.map(|values| values.join(";"))
	}

	/// Final storage path, `<location>.<extension>`.
	pub fn storage_path(&self) -> Option<PathBuf> {
		self.location.as_ref().map(|location| {
			if self.extension.is_empty() {
				PathBuf::from(location)
			} else {
				PathBuf::from(format!("{}.{}", location, self.extension))
			}
		})
	}

	/// Write the file body to `path`, creating parent directories as needed.
	pub fn save_to(&self, path: impl AsRef<Path>) -> io::Result<u64> {
		let path = path.as_ref();
		let stream = self.stream.as_ref().ok_or_else(|| {
			io::Error::new(
				io::ErrorKind::InvalidInput,
				"file reference has no content stream",
			)
		})?;

		if let Some(parent) = path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)?;
		}

		let mut out = fs::File::create(path)?;
		stream.rewind()?;
		let written = stream.copy_to(&mut out)?;
		out.flush()?;
		Ok(written)
	}

	/// Save the body to [`storage_path`](Self::storage_path).
	pub fn persist(&self) -> Result<PathBuf, FilterError> {
		let path = self.storage_path().ok_or(FilterError::MissingLocation)?;
		self.save_to(&path)?;
		Ok(path)
	}

	/// Encode the body as a base64 `data:` URL. A reference without a
	/// stream encodes to an empty string.
	pub fn to_data_url(&self) -> io::Result<String> {
		let Some(stream) = &self.stream else {
			return Ok(String::new());
		};

		stream.rewind()?;
		let bytes = stream.read_remaining()?;
		let media_type = self
			.content_type()
			.unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());

		Ok(format!("data:{};base64,{}", media_type, STANDARD.encode(bytes)))
	}
}

impl PartialEq for FileRef {
	/// Streams are not compared; two references are equal when their
	/// metadata matches.
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
			&& self.extension == other.extension
			&& self.location == other.location
			&& self.headers == other.headers
	}
}
