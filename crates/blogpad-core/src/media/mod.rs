//! Image ingestion for post authoring.
//!
//! A post image is either a remote URL or an upload. URLs are accepted
//! immediately and probed in the background; a URL that turns out to be
//! unloadable is swapped for a fallback at submit time. Uploads are checked,
//! shrunk into an 800 x 600 bound and re-encoded as an embeddable JPEG
//! `data:` payload. Either way the post ends up with a plain string, never a
//! file handle.

mod probe;
mod resize;

use std::fmt;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};
use crate::util::is_http_url;

pub use probe::{HttpImageProbe, ImageProbe, StaticProbe};
pub use resize::{bounded_dimensions, JPEG_QUALITY, MAX_LONG_SIDE, MAX_SHORT_SIDE};

/// Uploads above this size are rejected (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Substitute for URL images that fail to load.
pub const DEFAULT_FALLBACK_IMAGE_URL: &str = "https://picsum.photos/400";

const EMBEDDED_MEDIA_TYPE: &str = "image/jpeg";

/// Raw file chosen by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    /// Declared media type; guessed from the file name when blank
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    fn effective_media_type(&self) -> String {
        let declared = self.media_type.trim().to_ascii_lowercase();
        if !declared.is_empty() {
            return declared;
        }
        mime_guess::from_path(&self.file_name)
            .first_raw()
            .unwrap_or_default()
            .to_string()
    }

    fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Self-contained image payload stored directly in a post.
#[derive(Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    media_type: String,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EmbeddedImage {
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:<type>;base64,<payload>` rendering stored in `Post::image`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }

    /// Parse a `data:` URL previously produced by [`Self::to_data_url`].
    pub fn from_data_url(raw: &str) -> Result<Self> {
        let rest = raw
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidInput("not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidInput("data URL has no payload".to_string()))?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidInput("data URL is not base64 encoded".to_string()))?;
        if !media_type.starts_with("image/") {
            return Err(Error::UnsupportedType(media_type.to_string()));
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|error| Error::InvalidInput(format!("invalid base64 payload: {error}")))?;
        let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|error| Error::UnsupportedType(format!("undecodable payload: {error}")))?;

        Ok(Self {
            media_type: media_type.to_string(),
            bytes,
            width,
            height,
        })
    }
}

impl fmt::Debug for EmbeddedImage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EmbeddedImage")
            .field("media_type", &self.media_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Classification of a stored `Post::image` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Remote(String),
    Embedded(EmbeddedImage),
}

impl ImageRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with("data:") {
            return EmbeddedImage::from_data_url(trimmed).map(Self::Embedded);
        }
        if is_http_url(trimmed) {
            Ok(Self::Remote(trimmed.to_string()))
        } else {
            Err(Error::InvalidInput(format!(
                "image is neither a remote URL nor an embedded payload: {trimmed}"
            )))
        }
    }
}

/// Loadability of a URL-mode image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Not probed yet; submission is not blocked on it.
    Pending,
    Loadable,
    /// Probe failed; the fallback will be submitted instead.
    Degraded,
}

/// Image referenced by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlImage {
    url: String,
    status: ProbeStatus,
}

impl UrlImage {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub const fn status(&self) -> ProbeStatus {
        self.status
    }
}

/// The one image source chosen for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSelection {
    Url(UrlImage),
    Upload(EmbeddedImage),
}

/// Warning surfaced alongside a submitted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageWarning {
    Degraded { original: String, fallback: String },
}

impl fmt::Display for ImageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degraded { original, fallback } => write!(
                f,
                "Image at {original} could not be loaded; using {fallback} instead"
            ),
        }
    }
}

/// Image value to submit plus any warning to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub value: String,
    pub warning: Option<ImageWarning>,
}

/// Converts user image input into a storable post image.
#[derive(Debug, Clone)]
pub struct ImageIngestionPipeline<P: ImageProbe> {
    probe: P,
    fallback_url: String,
}

impl<P: ImageProbe> ImageIngestionPipeline<P> {
    pub fn new(probe: P, fallback_url: impl Into<String>) -> Self {
        Self {
            probe,
            fallback_url: fallback_url.into(),
        }
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// Accept a URL without blocking on reachability.
    ///
    /// Strings that are not absolute http(s) URLs are degraded straight away.
    pub fn select_url(&self, raw: &str) -> UrlImage {
        let url = raw.trim().to_string();
        let status = if is_http_url(&url) {
            ProbeStatus::Pending
        } else {
            tracing::warn!("Image URL '{}' is not a valid http(s) URL", url);
            ProbeStatus::Degraded
        };
        UrlImage { url, status }
    }

    /// Probe a pending URL and record the outcome.
    pub async fn probe(&self, image: &mut UrlImage) -> ProbeStatus {
        if image.status != ProbeStatus::Pending {
            return image.status;
        }
        image.status = if self.probe.is_loadable(&image.url).await {
            ProbeStatus::Loadable
        } else {
            tracing::warn!("Image URL {} could not be loaded", image.url);
            ProbeStatus::Degraded
        };
        image.status
    }

    /// Check, bound and re-encode an uploaded file.
    pub fn ingest_upload(&self, file: &UploadedFile) -> Result<EmbeddedImage> {
        let media_type = file.effective_media_type();
        if !media_type.starts_with("image/") {
            return Err(Error::UnsupportedType(if media_type.is_empty() {
                file.file_name.clone()
            } else {
                media_type
            }));
        }
        let size = file.size();
        if size > MAX_UPLOAD_BYTES {
            return Err(Error::TooLarge {
                size,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let encoded = resize::bound_and_encode(&file.bytes)?;
        tracing::debug!(
            "Ingested {} as {}x{} JPEG ({} bytes)",
            file.file_name,
            encoded.width,
            encoded.height,
            encoded.bytes.len()
        );
        Ok(EmbeddedImage {
            media_type: EMBEDDED_MEDIA_TYPE.to_string(),
            bytes: encoded.bytes,
            width: encoded.width,
            height: encoded.height,
        })
    }

    /// Final image value at submit time.
    pub fn resolve(&self, selection: &ImageSelection) -> ResolvedImage {
        match selection {
            ImageSelection::Upload(embedded) => ResolvedImage {
                value: embedded.to_data_url(),
                warning: None,
            },
            ImageSelection::Url(image) if image.status == ProbeStatus::Degraded => ResolvedImage {
                value: self.fallback_url.clone(),
                warning: Some(ImageWarning::Degraded {
                    original: image.url.clone(),
                    fallback: self.fallback_url.clone(),
                }),
            },
            ImageSelection::Url(image) => ResolvedImage {
                value: image.url.clone(),
                warning: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::resize::tests::source_png;

    fn pipeline(loadable: bool) -> ImageIngestionPipeline<StaticProbe> {
        ImageIngestionPipeline::new(StaticProbe(loadable), DEFAULT_FALLBACK_IMAGE_URL)
    }

    fn png_upload(width: u32, height: u32) -> UploadedFile {
        UploadedFile::new("photo.png", "image/png", source_png(width, height))
    }

    #[tokio::test]
    async fn loadable_url_is_submitted_as_is() {
        let pipeline = pipeline(true);
        let mut image = pipeline.select_url(" https://img.example/a.png ");
        assert_eq!(image.status(), ProbeStatus::Pending);

        assert_eq!(pipeline.probe(&mut image).await, ProbeStatus::Loadable);
        let resolved = pipeline.resolve(&ImageSelection::Url(image));
        assert_eq!(resolved.value, "https://img.example/a.png");
        assert!(resolved.warning.is_none());
    }

    #[tokio::test]
    async fn unloadable_url_falls_back_with_warning() {
        let pipeline = pipeline(false);
        let mut image = pipeline.select_url("https://img.example/missing.png");
        pipeline.probe(&mut image).await;

        let resolved = pipeline.resolve(&ImageSelection::Url(image));
        assert_eq!(resolved.value, DEFAULT_FALLBACK_IMAGE_URL);
        assert_eq!(
            resolved.warning,
            Some(ImageWarning::Degraded {
                original: "https://img.example/missing.png".to_string(),
                fallback: DEFAULT_FALLBACK_IMAGE_URL.to_string(),
            })
        );
    }

    #[test]
    fn pending_url_does_not_block_submission() {
        let pipeline = pipeline(false);
        let image = pipeline.select_url("https://img.example/slow.png");
        let resolved = pipeline.resolve(&ImageSelection::Url(image));
        assert_eq!(resolved.value, "https://img.example/slow.png");
    }

    #[tokio::test]
    async fn invalid_url_is_degraded_without_probing() {
        let pipeline = pipeline(true);
        let mut image = pipeline.select_url("not a url");
        assert_eq!(image.status(), ProbeStatus::Degraded);
        assert_eq!(pipeline.probe(&mut image).await, ProbeStatus::Degraded);
        assert!(pipeline.resolve(&ImageSelection::Url(image)).warning.is_some());
    }

    #[test]
    fn non_image_upload_is_unsupported() {
        let file = UploadedFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(
            pipeline(true).ingest_upload(&file),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn media_type_is_guessed_from_file_name_when_blank() {
        let mut file = png_upload(10, 10);
        file.media_type = String::new();
        assert!(pipeline(true).ingest_upload(&file).is_ok());

        file.file_name = "archive.zip".to_string();
        assert!(matches!(
            pipeline(true).ingest_upload(&file),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn oversized_upload_is_rejected_before_decoding() {
        let size = usize::try_from(MAX_UPLOAD_BYTES).unwrap() + 1;
        let file = UploadedFile::new("huge.png", "image/png", vec![0_u8; size]);
        match pipeline(true).ingest_upload(&file) {
            Err(Error::TooLarge { size: got, limit }) => {
                assert_eq!(got, MAX_UPLOAD_BYTES + 1);
                assert_eq!(limit, MAX_UPLOAD_BYTES);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn upload_at_exact_limit_passes_size_check() {
        let size = usize::try_from(MAX_UPLOAD_BYTES).unwrap();
        let file = UploadedFile::new("edge.png", "image/png", vec![0_u8; size]);

        // Passes the size check, then fails to decode.
        assert!(matches!(
            pipeline(true).ingest_upload(&file),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn corrupt_image_upload_is_unsupported() {
        let file = UploadedFile::new("broken.png", "image/png", b"\x89PNG garbage".to_vec());
        assert!(matches!(
            pipeline(true).ingest_upload(&file),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn large_upload_is_bounded_and_embedded() {
        let pipeline = pipeline(true);
        let embedded = pipeline.ingest_upload(&png_upload(1600, 1000)).unwrap();
        assert_eq!((embedded.width(), embedded.height()), (800, 500));
        assert_eq!(embedded.media_type(), "image/jpeg");

        let resolved = pipeline.resolve(&ImageSelection::Upload(embedded));
        assert!(resolved.value.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn reingesting_output_keeps_dimensions() {
        let pipeline = pipeline(true);
        let first = pipeline.ingest_upload(&png_upload(2400, 1200)).unwrap();
        let parsed = EmbeddedImage::from_data_url(&first.to_data_url()).unwrap();
        assert_eq!((parsed.width(), parsed.height()), (800, 400));

        let again = pipeline
            .ingest_upload(&UploadedFile::new("again.jpg", "image/jpeg", parsed.bytes().to_vec()))
            .unwrap();
        assert_eq!((again.width(), again.height()), (800, 400));
    }

    #[test]
    fn small_upload_is_not_upscaled() {
        let embedded = pipeline(true).ingest_upload(&png_upload(120, 80)).unwrap();
        assert_eq!((embedded.width(), embedded.height()), (120, 80));
    }

    #[test]
    fn image_ref_classifies_values() {
        assert_eq!(
            ImageRef::parse("https://img.example/a.png").unwrap(),
            ImageRef::Remote("https://img.example/a.png".to_string())
        );

        let embedded = pipeline(true).ingest_upload(&png_upload(20, 10)).unwrap();
        match ImageRef::parse(&embedded.to_data_url()).unwrap() {
            ImageRef::Embedded(parsed) => assert_eq!((parsed.width(), parsed.height()), (20, 10)),
            other => panic!("expected embedded image, got {other:?}"),
        }

        assert!(ImageRef::parse("blob:local-file-handle").is_err());
        assert!(ImageRef::parse("data:text/plain;base64,aGk=").is_err());
    }
}
