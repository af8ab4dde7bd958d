use crate::app::ports::HttpClientPort;
use crate::constants::IMAGE_EXTENSIONS;
use crate::error::Result;
use crate::metrics;
use crate::types::{ImageEntry, ImageRole};
use image::ImageFormat;
use std::fs;
use std::io::{self, Read, Seek};
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

/// Enough leading bytes for every signature `image::guess_format` knows
const SNIFF_LEN: u64 = 64;

/// Terminal state of one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// A `.jpg` or `.png` with this base name was already on disk
    Skipped(PathBuf),
    /// Fetched and recognised as JPEG or PNG
    Downloaded(PathBuf),
    /// Fetched, format not recognised, stored as `.png`
    AssumedPng(PathBuf),
    /// Transport, status or local I/O failure; nothing left on disk
    Failed { url: String, error: String },
}

impl ImageOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ImageOutcome::Skipped(_) => "skipped",
            ImageOutcome::Downloaded(_) => "downloaded",
            ImageOutcome::AssumedPng(_) => "assumed_png",
            ImageOutcome::Failed { .. } => "failed",
        }
    }
}

/// Result of a complete download run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AcquireSummary {
    pub downloaded: usize,
    pub assumed_png: usize,
    pub skipped: usize,
    /// `"<url>: <error>"` for every failed image
    pub failed: Vec<String>,
}

impl AcquireSummary {
    fn record(&mut self, outcome: &ImageOutcome) {
        match outcome {
            ImageOutcome::Skipped(_) => self.skipped += 1,
            ImageOutcome::Downloaded(_) => self.downloaded += 1,
            ImageOutcome::AssumedPng(_) => self.assumed_png += 1,
            ImageOutcome::Failed { url, error } => self.failed.push(format!("{url}: {error}")),
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.assumed_png + self.skipped + self.failed.len()
    }
}

/// Map sniffed leading bytes to the extension an image is stored under.
/// `None` means the format is not JPEG or PNG.
pub fn sniff_extension(head: &[u8]) -> Option<&'static str> {
    match image::guess_format(head) {
        Ok(ImageFormat::Jpeg) => Some("jpg"),
        Ok(ImageFormat::Png) => Some("png"),
        _ => None,
    }
}

/// Downloads images into one directory, never fetching an image that is
/// already there.
pub struct ImageAcquirer<'a> {
    http: &'a dyn HttpClientPort,
    img_dir: PathBuf,
}

impl<'a> ImageAcquirer<'a> {
    /// Creates the image directory if needed. Failing to do so is fatal.
    pub fn new(http: &'a dyn HttpClientPort, img_dir: impl Into<PathBuf>) -> Result<Self> {
        let img_dir = img_dir.into();
        fs::create_dir_all(&img_dir)?;
        Ok(Self { http, img_dir })
    }

    /// Face then body for every entry, in order. Per-image failures are
    /// recorded in the summary and never stop the run.
    pub fn acquire_all(&self, entries: &[ImageEntry]) -> AcquireSummary {
        let mut summary = AcquireSummary::default();
        for entry in entries {
            for role in ImageRole::ALL {
                let outcome = self.acquire(entry.url(role), &entry.base_name(role));
                metrics::acquire::image_outcome(outcome.label());
                summary.record(&outcome);
            }
        }
        summary
    }

    /// Bring one image to a terminal state.
    #[instrument(skip(self), fields(dir = %self.img_dir.display()))]
    pub fn acquire(&self, url: &str, base: &str) -> ImageOutcome {
        if let Some(path) = self.existing(base) {
            info!("File {} already exists, skipping download", path.display());
            return ImageOutcome::Skipped(path);
        }

        match self.download(url, base) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to download {}: {}", url, e);
                ImageOutcome::Failed {
                    url: url.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// `{base}.jpg` or `{base}.png`, whichever exists first
    pub fn existing(&self, base: &str) -> Option<PathBuf> {
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.img_dir.join(format!("{base}.{ext}")))
            .find(|path| path.exists())
    }

    /// Stream into a temp file beside the target, sniff, then rename into
    /// place. The temp file is removed on every error path when it drops.
    fn download(&self, url: &str, base: &str) -> Result<ImageOutcome> {
        let mut body = self.http.get(url)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!("{base}."))
            .suffix(".tmp")
            .tempfile_in(&self.img_dir)?;
        let bytes = io::copy(&mut body, &mut tmp)?;
        metrics::acquire::bytes_downloaded(bytes);
        debug!(bytes, "body written to {}", tmp.path().display());

        tmp.rewind()?;
        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        tmp.as_file().take(SNIFF_LEN).read_to_end(&mut head)?;

        let (ext, assumed) = match sniff_extension(&head) {
            Some(ext) => (ext, false),
            None => {
                warn!("Failed to detect image type for {}, assuming png", url);
                ("png", true)
            }
        };

        let final_path = self.img_dir.join(format!("{base}.{ext}"));
        tmp.persist(&final_path).map_err(|e| e.error)?;
        info!("Downloaded {}", final_path.display());

        Ok(if assumed {
            ImageOutcome::AssumedPng(final_path)
        } else {
            ImageOutcome::Downloaded(final_path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpBody;
    use crate::error::ImportError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::tempdir;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[derive(Default)]
    struct FakeHttp {
        bodies: HashMap<String, Vec<u8>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeHttp {
        fn with(mut self, url: &str, body: &[u8]) -> Self {
            self.bodies.insert(url.to_string(), body.to_vec());
            self
        }
    }

    impl HttpClientPort for FakeHttp {
        fn get(&self, url: &str) -> Result<HttpBody> {
            self.calls.borrow_mut().push(url.to_string());
            match self.bodies.get(url) {
                Some(body) => Ok(Box::new(io::Cursor::new(body.clone()))),
                None => Err(ImportError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    /// Yields a JPEG signature, then the connection drops
    struct DroppedBody {
        sent: bool,
    }

    impl Read for DroppedBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
            }
            self.sent = true;
            let n = JPEG.len().min(buf.len());
            buf[..n].copy_from_slice(&JPEG[..n]);
            Ok(n)
        }
    }

    struct DroppingHttp;

    impl HttpClientPort for DroppingHttp {
        fn get(&self, _url: &str) -> Result<HttpBody> {
            Ok(Box::new(DroppedBody { sent: false }))
        }
    }

    fn tmp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().map_or(false, |e| e == "tmp"))
            .collect()
    }

    #[test]
    fn test_sniff_extension() {
        assert_eq!(sniff_extension(JPEG), Some("jpg"));
        assert_eq!(sniff_extension(PNG), Some("png"));
        assert_eq!(sniff_extension(b"GIF89a......"), None);
        assert_eq!(sniff_extension(b"<html>not an image</html>"), None);
        assert_eq!(sniff_extension(b""), None);
    }

    #[test]
    fn test_jpeg_is_stored_as_jpg() {
        let dir = tempdir().unwrap();
        let http = FakeHttp::default().with("u", JPEG);
        let acquirer = ImageAcquirer::new(&http, dir.path()).unwrap();

        let outcome = acquirer.acquire("u", "alex_face");
        let path = dir.path().join("alex_face.jpg");
        assert_eq!(outcome, ImageOutcome::Downloaded(path.clone()));
        assert_eq!(fs::read(path).unwrap(), JPEG);
        assert!(tmp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_unknown_format_is_assumed_png() {
        let dir = tempdir().unwrap();
        let http = FakeHttp::default().with("u", b"GIF89a some gif bytes");
        let acquirer = ImageAcquirer::new(&http, dir.path()).unwrap();

        let outcome = acquirer.acquire("u", "alex_body");
        assert_eq!(
            outcome,
            ImageOutcome::AssumedPng(dir.path().join("alex_body.png"))
        );
    }

    #[test]
    fn test_http_error_leaves_no_file() {
        let dir = tempdir().unwrap();
        let http = FakeHttp::default();
        let acquirer = ImageAcquirer::new(&http, dir.path()).unwrap();

        let outcome = acquirer.acquire("missing", "alex_face");
        match outcome {
            ImageOutcome::Failed { url, error } => {
                assert_eq!(url, "missing");
                assert!(error.contains("404"), "{error}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_body_error_mid_stream_leaves_no_file() {
        let dir = tempdir().unwrap();
        let acquirer = ImageAcquirer::new(&DroppingHttp, dir.path()).unwrap();

        let outcome = acquirer.acquire("u", "alex_face");
        match outcome {
            ImageOutcome::Failed { url, error } => {
                assert_eq!(url, "u");
                assert!(error.contains("connection reset"), "{error}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!dir.path().join("alex_face.jpg").exists());
        assert!(!dir.path().join("alex_face.png").exists());
        assert!(tmp_files(dir.path()).is_empty());
        assert_eq!(acquirer.existing("alex_face"), None);
    }

    #[test]
    fn test_existing_png_or_jpg_skips_network() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("alex_face.png"), PNG).unwrap();
        let http = FakeHttp::default().with("u", JPEG);
        let acquirer = ImageAcquirer::new(&http, dir.path()).unwrap();

        let outcome = acquirer.acquire("u", "alex_face");
        assert_eq!(outcome, ImageOutcome::Skipped(dir.path().join("alex_face.png")));
        assert!(http.calls.borrow().is_empty());
    }

    #[test]
    fn test_failure_does_not_stop_the_run_and_is_retried() {
        let dir = tempdir().unwrap();
        let entries = vec![
            ImageEntry {
                name_slug: "alex".into(),
                outfit_slug: Some("winter".into()),
                face_pic_url: "broken".into(),
                body_pic_url: "alex-body".into(),
            },
            ImageEntry {
                name_slug: "bea".into(),
                outfit_slug: None,
                face_pic_url: "bea-face".into(),
                body_pic_url: "bea-body".into(),
            },
        ];
        let http = FakeHttp::default()
            .with("alex-body", PNG)
            .with("bea-face", JPEG)
            .with("bea-body", b"????");
        let acquirer = ImageAcquirer::new(&http, dir.path()).unwrap();

        let first = acquirer.acquire_all(&entries);
        assert_eq!(first.downloaded, 2);
        assert_eq!(first.assumed_png, 1);
        assert_eq!(first.skipped, 0);
        assert_eq!(first.failed.len(), 1);
        assert!(first.failed[0].starts_with("broken: "));
        assert!(dir.path().join("alex_winter_body.png").exists());
        assert!(dir.path().join("bea_face.jpg").exists());
        assert!(dir.path().join("bea_body.png").exists());
        assert_eq!(http.calls.borrow().len(), 4);

        let second = acquirer.acquire_all(&entries);
        assert_eq!(second.skipped, 3);
        assert_eq!(second.failed.len(), 1);
        assert_eq!(second.total(), 4);
        assert_eq!(*http.calls.borrow(), vec!["broken", "alex-body", "bea-face", "bea-body", "broken"]);
    }
}
