//! Batch rendering: every graphic onto every garment.
//!
//! Inputs are decoded once each, then every (graphic, garment) pair runs
//! through [`compose`](crate::compose) on a dedicated `rayon` pool. Pairs
//! share nothing mutable, so completion order is irrelevant; results are
//! collected back into graphic-major, garment-minor order.
//!
//! A pair whose graphic or garment fails to decode is skipped and
//! reported as a [`PairFailure`]. Invalid batch-wide configuration is
//! rejected before any decoding starts.

use rayon::prelude::*;

use crate::grayscale::{decode_garment, decode_graphic};
use crate::placement::Placement;
use crate::profile::ConfigResolver;
use crate::types::{MockupSettings, PipelineError, RgbImage, RgbaImage};

/// One named input image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Stable identifier (for files, the file stem).
    pub id: String,
    /// Optional display name used in output file names instead of `id`.
    pub label: Option<String>,
    /// Encoded image bytes (PNG, JPEG, BMP, WebP).
    pub bytes: Vec<u8>,
}

impl Source {
    /// A source without a display label.
    #[must_use]
    pub fn new(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            label: None,
            bytes,
        }
    }

    /// Attach a display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label if set and non-blank, otherwise the identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => &self.id,
        }
    }
}

/// Execution options for [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads. `None` uses one per available core.
    pub threads: Option<usize>,
}

/// One rendered pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MockupResult {
    /// Identifier of the graphic [`Source`].
    pub graphic_id: String,
    /// Display name of the graphic (its label, or its id).
    pub graphic_name: String,
    /// Identifier of the garment [`Source`].
    pub garment_id: String,
    /// Suggested output file name, see [`output_file_name`].
    pub file_name: String,
    /// The composited garment photograph.
    pub image: RgbImage,
    /// Where and how large the graphic was drawn.
    pub placement: Placement,
}

/// A pair that was skipped because an input failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFailure {
    /// Identifier of the graphic [`Source`].
    pub graphic_id: String,
    /// Identifier of the garment [`Source`].
    pub garment_id: String,
    /// One entry per input that failed.
    pub reasons: Vec<String>,
}

impl std::fmt::Display for PairFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} on {}: {}",
            self.graphic_id,
            self.garment_id,
            self.reasons.join("; ")
        )
    }
}

/// Everything a batch produced, both vectors in graphic-major order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Successfully rendered pairs.
    pub results: Vec<MockupResult>,
    /// Pairs skipped because an input failed to decode.
    pub failures: Vec<PairFailure>,
}

impl BatchReport {
    /// Total number of pairs attempted.
    #[must_use]
    pub fn pairs(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

/// Output file name for a pair: `{graphic}_{garment}_tee.png`.
#[must_use]
pub fn output_file_name(graphic_name: &str, garment_name: &str) -> String {
    format!("{graphic_name}_{garment_name}_tee.png")
}

/// Check every batch-wide setting, aggregating all problems.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] listing every violation.
pub fn validate<R: ConfigResolver + ?Sized>(
    resolver: &R,
    settings: &MockupSettings,
    options: &BatchOptions,
) -> Result<(), PipelineError> {
    let mut issues: Vec<String> = resolver
        .profiles()
        .into_iter()
        .flat_map(|(label, config)| config.validate(label))
        .collect();
    issues.extend(settings.validate());
    if options.threads == Some(0) {
        issues.push("threads must be >= 1 when set".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(issues))
    }
}

/// Render every graphic onto every garment.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] before any work if the
/// resolver's profiles, `settings` or `options` are invalid, and
/// [`PipelineError::ThreadPool`] if the worker pool cannot start.
/// Decode failures never fail the batch; they are listed in
/// [`BatchReport::failures`].
#[tracing::instrument(
    skip_all,
    fields(graphics = graphics.len(), garments = garments.len(), threads = ?options.threads)
)]
pub fn run<R: ConfigResolver + ?Sized>(
    graphics: &[Source],
    garments: &[Source],
    resolver: &R,
    settings: &MockupSettings,
    options: &BatchOptions,
) -> Result<BatchReport, PipelineError> {
    validate(resolver, settings, options)?;
    let pool = build_thread_pool(options.threads)?;

    let (decoded_graphics, decoded_garments) = pool.install(|| {
        rayon::join(
            || {
                graphics
                    .par_iter()
                    .map(|s| decode_graphic(&s.bytes).map_err(|e| e.to_string()))
                    .collect::<Vec<_>>()
            },
            || {
                garments
                    .par_iter()
                    .map(|s| decode_garment(&s.bytes).map_err(|e| e.to_string()))
                    .collect::<Vec<_>>()
            },
        )
    });
    for (source, decoded) in graphics.iter().zip(&decoded_graphics) {
        if let Err(reason) = decoded {
            tracing::warn!(graphic = %source.id, %reason, "graphic failed to decode");
        }
    }
    for (source, decoded) in garments.iter().zip(&decoded_garments) {
        if let Err(reason) = decoded {
            tracing::warn!(garment = %source.id, %reason, "garment failed to decode");
        }
    }

    let pairs: Vec<(usize, usize)> = (0..graphics.len())
        .flat_map(|gi| (0..garments.len()).map(move |ki| (gi, ki)))
        .collect();

    let ctx = PairContext {
        graphics,
        garments,
        decoded_graphics: &decoded_graphics,
        decoded_garments: &decoded_garments,
        resolver,
        settings,
    };
    let outcomes: Vec<Result<MockupResult, PairFailure>> =
        pool.install(|| pairs.par_iter().map(|&(gi, ki)| ctx.render(gi, ki)).collect());

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(result) => report.results.push(result),
            Err(failure) => {
                tracing::warn!(%failure, "skipping pair");
                report.failures.push(failure);
            }
        }
    }

    tracing::info!(
        rendered = report.results.len(),
        skipped = report.failures.len(),
        "batch complete",
    );
    Ok(report)
}

/// Read-only state shared by every pair worker.
struct PairContext<'a, R: ?Sized> {
    graphics: &'a [Source],
    garments: &'a [Source],
    decoded_graphics: &'a [Result<RgbaImage, String>],
    decoded_garments: &'a [Result<RgbImage, String>],
    resolver: &'a R,
    settings: &'a MockupSettings,
}

impl<R: ConfigResolver + ?Sized> PairContext<'_, R> {
    fn render(&self, gi: usize, ki: usize) -> Result<MockupResult, PairFailure> {
        let graphic_source = &self.graphics[gi];
        let garment_source = &self.garments[ki];

        let (graphic, garment) = match (&self.decoded_graphics[gi], &self.decoded_garments[ki]) {
            (Ok(graphic), Ok(garment)) => (graphic, garment),
            (graphic, garment) => {
                let reasons = [
                    graphic.as_ref().err().map(|e| format!("graphic: {e}")),
                    garment.as_ref().err().map(|e| format!("garment: {e}")),
                ]
                .into_iter()
                .flatten()
                .collect();
                return Err(PairFailure {
                    graphic_id: graphic_source.id.clone(),
                    garment_id: garment_source.id.clone(),
                    reasons,
                });
            }
        };

        let span = tracing::debug_span!(
            "pair",
            graphic = %graphic_source.id,
            garment = %garment_source.id,
        );
        let _enter = span.enter();

        let config = self.resolver.resolve(&garment_source.id);
        let mockup = crate::compose(garment, graphic, config, self.settings, None);

        let graphic_name = graphic_source.name().to_string();
        Ok(MockupResult {
            graphic_id: graphic_source.id.clone(),
            file_name: output_file_name(&graphic_name, &garment_source.id),
            graphic_name,
            garment_id: garment_source.id.clone(),
            image: mockup.image,
            placement: mockup.placement,
        })
    }
}

fn build_thread_pool(threads: Option<usize>) -> Result<rayon::ThreadPool, PipelineError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    Ok(builder.build()?)
}
