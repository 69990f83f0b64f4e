//! Once-per-process codec and resampler runtimes.
//!
//! Each stage needs a runtime handle before its first use: the decoder for
//! the source format, the resizer, the WebP encoder. [`Runtimes`] holds one
//! [`OnceLock`] per handle, so
//!
//! - a handle is initialized at most once per `Runtimes` instance,
//! - concurrent first use blocks on the single initializer instead of racing,
//! - a failed initialization is cached and reported on every later call.
//!
//! Construct one `Runtimes` at startup and pass it by reference to the
//! pipeline, or use [`Runtimes::global`].

use super::format::SourceFormat;
use super::params::{ResampleFilter, WEBP_MAX_DIMENSION};
use crate::error::ConvertError;
use image::imageops::FilterType;
use image::{ImageFormat, Limits};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, OnceLock};

/// Identifies one lazily initialized runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    PngDecoder,
    JpegDecoder,
    WebpDecoder,
    WebpEncoder,
    Resizer,
}

impl RuntimeKind {
    pub const ALL: [RuntimeKind; 5] = [
        RuntimeKind::PngDecoder,
        RuntimeKind::JpegDecoder,
        RuntimeKind::WebpDecoder,
        RuntimeKind::WebpEncoder,
        RuntimeKind::Resizer,
    ];

    pub fn decoder_for(format: SourceFormat) -> Self {
        match format {
            SourceFormat::Png => RuntimeKind::PngDecoder,
            SourceFormat::Jpeg => RuntimeKind::JpegDecoder,
            SourceFormat::WebP => RuntimeKind::WebpDecoder,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuntimeKind::PngDecoder => "PNG decoder",
            RuntimeKind::JpegDecoder => "JPEG decoder",
            RuntimeKind::WebpDecoder => "WebP decoder",
            RuntimeKind::WebpEncoder => "WebP encoder",
            RuntimeKind::Resizer => "resizer",
        })
    }
}

/// Inputs to runtime initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Largest `width * height` a decoder will accept.
    pub max_decoded_pixels: u64,
    pub filter: ResampleFilter,
    /// Largest output width or height the encoder will accept.
    pub max_output_dimension: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            max_decoded_pixels: 40_000_000,
            filter: ResampleFilter::default(),
            max_output_dimension: WEBP_MAX_DIMENSION,
        }
    }
}

/// Ready-to-use decoder for one source format.
#[derive(Debug, Clone)]
pub struct DecoderRuntime {
    format: SourceFormat,
    limits: Limits,
    max_pixels: u64,
}

impl DecoderRuntime {
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub(crate) fn limits(&self) -> Limits {
        self.limits.clone()
    }

    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }
}

/// Ready-to-use WebP encoder.
#[derive(Debug, Clone)]
pub struct EncoderRuntime {
    max_dimension: u32,
}

impl EncoderRuntime {
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }
}

/// Ready-to-use resampler.
#[derive(Debug, Clone)]
pub struct ResizerRuntime {
    filter: FilterType,
}

impl ResizerRuntime {
    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

type Slot<T> = OnceLock<Result<T, String>>;

/// Lazily initialized runtime handles shared by every conversion.
#[derive(Debug, Default)]
pub struct Runtimes {
    settings: RuntimeSettings,
    png: Slot<DecoderRuntime>,
    jpeg: Slot<DecoderRuntime>,
    webp: Slot<DecoderRuntime>,
    encoder: Slot<EncoderRuntime>,
    resizer: Slot<ResizerRuntime>,
    inits: [AtomicUsize; 5],
}

static GLOBAL: LazyLock<Runtimes> = LazyLock::new(Runtimes::default);

impl Runtimes {
    pub fn new(settings: RuntimeSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Process-wide instance with default settings.
    pub fn global() -> &'static Runtimes {
        &GLOBAL
    }

    pub fn decoder(&self, format: SourceFormat) -> Result<&DecoderRuntime, ConvertError> {
        let slot = match format {
            SourceFormat::Png => &self.png,
            SourceFormat::Jpeg => &self.jpeg,
            SourceFormat::WebP => &self.webp,
        };
        self.get(RuntimeKind::decoder_for(format), slot, |settings| {
            init_decoder(format, settings)
        })
    }

    pub fn encoder(&self) -> Result<&EncoderRuntime, ConvertError> {
        self.get(RuntimeKind::WebpEncoder, &self.encoder, init_encoder)
    }

    pub fn resizer(&self) -> Result<&ResizerRuntime, ConvertError> {
        self.get(RuntimeKind::Resizer, &self.resizer, init_resizer)
    }

    /// Initialize every runtime now instead of on first use.
    pub fn warm_up(&self) -> Result<(), ConvertError> {
        for format in SourceFormat::ALL {
            self.decoder(format)?;
        }
        self.resizer()?;
        self.encoder()?;
        Ok(())
    }

    /// How many times the initializer for `kind` has run (0 or 1).
    pub fn init_count(&self, kind: RuntimeKind) -> usize {
        self.inits[kind.index()].load(Ordering::SeqCst)
    }

    fn get<'a, T>(
        &'a self,
        kind: RuntimeKind,
        slot: &'a Slot<T>,
        init: impl FnOnce(&RuntimeSettings) -> Result<T, String>,
    ) -> Result<&'a T, ConvertError> {
        slot.get_or_init(|| {
            self.inits[kind.index()].fetch_add(1, Ordering::SeqCst);
            let result = init(&self.settings);
            if result.is_ok() {
                log::info!("{kind} runtime initialized");
            }
            result
        })
        .as_ref()
        .map_err(|message| ConvertError::RuntimeInitialization {
            runtime: kind,
            message: message.clone(),
        })
    }
}

fn init_decoder(format: SourceFormat, settings: &RuntimeSettings) -> Result<DecoderRuntime, String> {
    if !format.image_format().reading_enabled() {
        return Err(format!("{format} decoding is not compiled into this build"));
    }
    if settings.max_decoded_pixels == 0 {
        return Err("max_decoded_pixels must be non-zero".to_string());
    }
    let mut limits = Limits::default();
    // Decoders may hold an intermediate buffer next to the RGBA output.
    limits.max_alloc = Some(settings.max_decoded_pixels.saturating_mul(8));
    Ok(DecoderRuntime {
        format,
        limits,
        max_pixels: settings.max_decoded_pixels,
    })
}

fn init_encoder(settings: &RuntimeSettings) -> Result<EncoderRuntime, String> {
    if !ImageFormat::WebP.writing_enabled() {
        return Err("WebP encoding is not compiled into this build".to_string());
    }
    if settings.max_output_dimension == 0 {
        return Err("max_output_dimension must be non-zero".to_string());
    }
    Ok(EncoderRuntime {
        max_dimension: settings.max_output_dimension.min(WEBP_MAX_DIMENSION),
    })
}

fn init_resizer(settings: &RuntimeSettings) -> Result<ResizerRuntime, String> {
    let filter = settings
        .filter
        .filter_type()
        .ok_or_else(|| "nearest-neighbour sampling is not a quality-preserving filter".to_string())?;
    Ok(ResizerRuntime { filter })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtimes_start_uninitialized() {
        let runtimes = Runtimes::default();
        for kind in RuntimeKind::ALL {
            assert_eq!(runtimes.init_count(kind), 0, "{kind}");
        }
    }

    #[test]
    fn decoder_initializes_once() {
        let runtimes = Runtimes::default();
        let first = runtimes.decoder(SourceFormat::Png).unwrap() as *const DecoderRuntime;
        let second = runtimes.decoder(SourceFormat::Png).unwrap() as *const DecoderRuntime;
        assert_eq!(first, second);
        assert_eq!(runtimes.init_count(RuntimeKind::PngDecoder), 1);
        assert_eq!(runtimes.init_count(RuntimeKind::JpegDecoder), 0);
    }

    #[test]
    fn concurrent_first_use_initializes_once() {
        let runtimes = Runtimes::default();
        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    runtimes.decoder(SourceFormat::WebP).unwrap();
                    runtimes.encoder().unwrap();
                    runtimes.resizer().unwrap();
                });
            }
        });
        assert_eq!(runtimes.init_count(RuntimeKind::WebpDecoder), 1);
        assert_eq!(runtimes.init_count(RuntimeKind::WebpEncoder), 1);
        assert_eq!(runtimes.init_count(RuntimeKind::Resizer), 1);
    }

    #[test]
    fn warm_up_initializes_everything() {
        let runtimes = Runtimes::default();
        runtimes.warm_up().unwrap();
        runtimes.warm_up().unwrap();
        for kind in RuntimeKind::ALL {
            assert_eq!(runtimes.init_count(kind), 1, "{kind}");
        }
    }

    #[test]
    fn failed_initialization_is_cached() {
        let runtimes = Runtimes::new(RuntimeSettings {
            filter: ResampleFilter::Nearest,
            ..RuntimeSettings::default()
        });
        for _ in 0..3 {
            let err = runtimes.resizer().unwrap_err();
            assert!(matches!(
                err,
                ConvertError::RuntimeInitialization {
                    runtime: RuntimeKind::Resizer,
                    ..
                }
            ));
        }
        assert_eq!(runtimes.init_count(RuntimeKind::Resizer), 1);
    }

    #[test]
    fn decoder_carries_pixel_limit() {
        let runtimes = Runtimes::new(RuntimeSettings {
            max_decoded_pixels: 1000,
            ..RuntimeSettings::default()
        });
        let decoder = runtimes.decoder(SourceFormat::Jpeg).unwrap();
        assert_eq!(decoder.format(), SourceFormat::Jpeg);
        assert_eq!(decoder.max_pixels(), 1000);
        assert_eq!(decoder.limits().max_alloc, Some(8000));
    }

    #[test]
    fn encoder_dimension_never_exceeds_webp_limit() {
        let runtimes = Runtimes::new(RuntimeSettings {
            max_output_dimension: u32::MAX,
            ..RuntimeSettings::default()
        });
        assert_eq!(runtimes.encoder().unwrap().max_dimension(), WEBP_MAX_DIMENSION);
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(Runtimes::global(), Runtimes::global()));
    }
}
