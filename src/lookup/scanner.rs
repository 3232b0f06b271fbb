//! Barcode scanning on top of an opaque camera and decoder.
//!
//! [`decode_stream`] turns a camera feed into a lazy sequence of decoded strings. The
//! camera is owned by the stream and released as soon as the stream finishes or is
//! dropped.

use std::future::Future;
use std::pin::pin;

use futures::stream::{self, Stream, StreamExt};

use super::{is_plausible_isbn, normalize_isbn};
use crate::errors::AppError;

/// Why a single frame produced no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// No barcode in the frame
    NotFound,
    /// A barcode was seen but its check digit did not match
    Checksum,
    /// A barcode was seen but could not be parsed
    Format,
    /// The decoder itself failed
    Fault(String),
}

/// Turns one frame into a decoded string.
pub trait BarcodeDecoder {
    type Frame;

    fn decode(&mut self, frame: &Self::Frame) -> Result<String, DecodeFailure>;
}

/// An acquired video feed.
pub trait Camera {
    type Frame;

    /// The next frame, or `None` once the feed has ended.
    fn next_frame(&mut self) -> impl Future<Output = Option<Self::Frame>>;

    /// Stop the feed. Called exactly once.
    fn release(&mut self);
}

/// Something that can hand out a camera, e.g. after a permission prompt.
pub trait FrameSource {
    type Camera: Camera;

    fn acquire(self) -> impl Future<Output = Result<Self::Camera, AppError>>;
}

/// Releases the camera when dropped.
struct CameraGuard<C: Camera> {
    camera: C,
}

impl<C: Camera> CameraGuard<C> {
    fn new(camera: C) -> Self {
        Self { camera }
    }
}

impl<C: Camera> Drop for CameraGuard<C> {
    fn drop(&mut self) {
        self.camera.release();
        tracing::debug!("Camera released");
    }
}

enum Phase<S, C: Camera, D> {
    Idle(S, D),
    Scanning(CameraGuard<C>, D),
    Done,
}

/// Decoded strings from `source`, skipping frames without a readable code.
///
/// Camera acquisition failures and decoder faults end the stream with one error.
pub fn decode_stream<S, D>(source: S, decoder: D) -> impl Stream<Item = Result<String, AppError>>
where
    S: FrameSource,
    D: BarcodeDecoder<Frame = <S::Camera as Camera>::Frame>,
{
    stream::unfold(
        Phase::<S, S::Camera, D>::Idle(source, decoder),
        |phase| async move {
            let (mut guard, mut decoder) = match phase {
                Phase::Idle(source, decoder) => match source.acquire().await {
                    Ok(camera) => (CameraGuard::new(camera), decoder),
                    Err(e) => {
                        tracing::error!("Failed to access camera: {}", e);
                        return Some((Err(e), Phase::Done));
                    }
                },
                Phase::Scanning(guard, decoder) => (guard, decoder),
                Phase::Done => return None,
            };

            loop {
                // Feed ended; dropping the guard releases the camera
                let Some(frame) = guard.camera.next_frame().await else {
                    return None;
                };
                match decoder.decode(&frame) {
                    Ok(code) => return Some((Ok(code), Phase::Scanning(guard, decoder))),
                    Err(DecodeFailure::Fault(message)) => {
                        tracing::error!("Error scanning barcode: {}", message);
                        return Some((Err(AppError::Scanner(message)), Phase::Done));
                    }
                    // Nothing readable in this frame
                    Err(_) => continue,
                }
            }
        },
    )
}

/// Consume a decode stream until the first plausible ISBN.
///
/// Returns `Ok(None)` if the feed ends without one.
pub async fn scan_isbn<St>(codes: St) -> Result<Option<String>, AppError>
where
    St: Stream<Item = Result<String, AppError>>,
{
    let mut codes = pin!(codes);
    while let Some(code) = codes.next().await {
        let code = code?;
        if is_plausible_isbn(&code) {
            return Ok(Some(normalize_isbn(&code)));
        }
        tracing::debug!(code = %code, "Ignoring non-ISBN barcode");
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeCamera {
        frames: VecDeque<&'static str>,
        releases: Arc<AtomicUsize>,
    }

    impl Camera for FakeCamera {
        type Frame = &'static str;

        async fn next_frame(&mut self) -> Option<&'static str> {
            self.frames.pop_front()
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeSource {
        frames: Vec<&'static str>,
        permitted: bool,
        releases: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(frames: Vec<&'static str>) -> (Self, Arc<AtomicUsize>) {
            let releases = Arc::new(AtomicUsize::new(0));
            let source = Self {
                frames,
                permitted: true,
                releases: releases.clone(),
            };
            (source, releases)
        }
    }

    impl FrameSource for FakeSource {
        type Camera = FakeCamera;

        async fn acquire(self) -> Result<FakeCamera, AppError> {
            if !self.permitted {
                return Err(AppError::Scanner("Camera permission denied".to_string()));
            }
            Ok(FakeCamera {
                frames: self.frames.into(),
                releases: self.releases,
            })
        }
    }

    /// Frames are labels: "code:<text>" decodes, a few labels map to failures.
    struct LabelDecoder;

    impl BarcodeDecoder for LabelDecoder {
        type Frame = &'static str;

        fn decode(&mut self, frame: &&'static str) -> Result<String, DecodeFailure> {
            match *frame {
                "blank" => Err(DecodeFailure::NotFound),
                "smudged" => Err(DecodeFailure::Checksum),
                "torn" => Err(DecodeFailure::Format),
                "crash" => Err(DecodeFailure::Fault("decoder crashed".to_string())),
                other => other
                    .strip_prefix("code:")
                    .map(str::to_string)
                    .ok_or(DecodeFailure::NotFound),
            }
        }
    }

    #[tokio::test]
    async fn test_skips_unreadable_frames() {
        let (source, releases) = FakeSource::new(vec![
            "blank",
            "code:9780131103627",
            "smudged",
            "torn",
            "code:9781439182444",
            "blank",
        ]);

        let codes: Vec<_> = decode_stream(source, LabelDecoder).collect().await;
        let codes: Vec<String> = codes.into_iter().map(|c| c.unwrap()).collect();

        assert_eq!(codes, vec!["9780131103627", "9781439182444"]);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_is_terminal() {
        let (mut source, releases) = FakeSource::new(vec!["code:9780131103627"]);
        source.permitted = false;

        let items: Vec<_> = decode_stream(source, LabelDecoder).collect().await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(AppError::Scanner(_))));
        assert_eq!(releases.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_decoder_fault_ends_stream_and_releases_camera() {
        let (source, releases) =
            FakeSource::new(vec!["code:111", "crash", "code:9780131103627"]);

        let items: Vec<_> = decode_stream(source, LabelDecoder).collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "111");
        assert!(matches!(items[1], Err(AppError::Scanner(_))));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scan_isbn_stops_at_first_isbn_and_releases() {
        let (source, releases) = FakeSource::new(vec![
            "code:https://example.com/menu",
            "blank",
            "code:978-0-13-110362-7",
            "code:9781439182444",
        ]);

        let isbn = scan_isbn(decode_stream(source, LabelDecoder)).await.unwrap();

        assert_eq!(isbn.as_deref(), Some("9780131103627"));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scan_isbn_without_isbn() {
        let (source, releases) = FakeSource::new(vec!["blank", "code:hello"]);

        let isbn = scan_isbn(decode_stream(source, LabelDecoder)).await.unwrap();

        assert_eq!(isbn, None);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
