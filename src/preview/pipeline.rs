use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::diagnostics::stats::{DiagnosticSnapshot, DiagnosticStats};
use crate::filter::error::FilterError;
use crate::filter::types::{FilterSelector, FilteredImage, RawFrame};
use crate::filter::{BuiltinFilter, PixelFilter};
use crate::overlay::renderer::{OverlayRenderer, OverlayStyle};
use crate::overlay::target::PresentationTarget;
use crate::preview::error::{PipelineError, Result, StateError};
use crate::preview::pool::{BufferHandle, FrameBufferPool};
use crate::preview::source::FrameSource;
use crate::preview::types::{CaptureConfig, DropReason, FrameOutcome, PipelineState};

/// Consecutive filter failures tolerated before they are surfaced (~1s at 30 fps).
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 30;

/// Pooled buffers plus the session they were sized for.
struct Buffers {
    pool: FrameBufferPool,
    input: Option<BufferHandle>,
    output: Option<BufferHandle>,
    config: Option<CaptureConfig>,
}

/// Everything downstream of the filter call.
struct Presenter {
    renderer: OverlayRenderer,
    target: Box<dyn PresentationTarget>,
    stats: DiagnosticStats,
    consecutive_failures: u32,
    failure_threshold: u32,
    sequence: u64,
}

impl Presenter {
    /// Filter one frame into `output` and present it.
    fn process(
        &mut self,
        filter: &dyn PixelFilter,
        output: &mut FilteredImage,
        frame: &RawFrame<'_>,
        selector: FilterSelector,
    ) -> Result<FrameOutcome> {
        let started = Instant::now();
        match filter.apply(output, frame, selector) {
            Ok(()) => {
                self.consecutive_failures = 0;
                self.sequence += 1;
                if !self.renderer.present(self.target.as_mut(), output, selector.label()) {
                    debug!("presentation target not ready; frame {} not drawn", self.sequence);
                }
                self.stats.record_frame(frame.data().len(), started.elapsed());
                Ok(FrameOutcome::Presented {
                    sequence: self.sequence,
                    filter: selector,
                })
            }
            Err(e) => self.filter_failed(e),
        }
    }

    fn filter_failed(&mut self, e: FilterError) -> Result<FrameOutcome> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.stats.record_drop(DropReason::FilterFailed);
        if self.consecutive_failures >= self.failure_threshold {
            error!(
                "filter failed on {} consecutive frames: {e}",
                self.consecutive_failures
            );
            return Err(PipelineError::FilterFailing {
                consecutive: self.consecutive_failures,
                source: e,
            });
        }
        warn!("dropping frame: {e}");
        Ok(FrameOutcome::Dropped(DropReason::FilterFailed))
    }
}

struct FrameSlot {
    buffers: Buffers,
    presenter: Presenter,
}

/// Marks a delivery as in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Synchronous camera preview pipeline.
///
/// Frames are filtered on the delivering thread. At most one frame is in
/// flight: a delivery that finds another one running is dropped, never
/// queued. The filter selector can be changed from any thread and applies
/// from the next processed frame.
pub struct PreviewPipeline {
    slot: Mutex<FrameSlot>,
    /// Lifecycle state; only written while holding `slot`.
    state: AtomicU8,
    /// Set while a delivery is filtering. Observers of `slot` do not count.
    in_flight: AtomicBool,
    selector: AtomicU8,
    /// Busy drops counted outside the slot lock, folded into stats on next lock.
    pending_busy: AtomicU64,
    filter: Box<dyn PixelFilter>,
}

impl PreviewPipeline {
    /// Create an unconfigured pipeline presenting to `target`.
    pub fn new(target: Box<dyn PresentationTarget>) -> Self {
        Self {
            slot: Mutex::new(FrameSlot {
                buffers: Buffers {
                    pool: FrameBufferPool::new(),
                    input: None,
                    output: None,
                    config: None,
                },
                presenter: Presenter {
                    renderer: OverlayRenderer::default(),
                    target,
                    stats: DiagnosticStats::new(),
                    consecutive_failures: 0,
                    failure_threshold: DEFAULT_FAILURE_THRESHOLD,
                    sequence: 0,
                },
            }),
            state: AtomicU8::new(PipelineState::Uninitialized.as_u8()),
            in_flight: AtomicBool::new(false),
            selector: AtomicU8::new(FilterSelector::default().index()),
            pending_busy: AtomicU64::new(0),
            filter: Box::new(BuiltinFilter),
        }
    }

    /// Replace the filter stage.
    pub fn with_filter(mut self, filter: Box<dyn PixelFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.slot.get_mut().presenter.renderer = OverlayRenderer::new(style);
        self
    }

    /// Consecutive filter failures after which frames report an error (minimum 1).
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.slot.get_mut().presenter.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_initial_filter(self, selector: FilterSelector) -> Self {
        self.selector.store(selector.index(), Ordering::Release);
        self
    }

    pub fn state(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: PipelineState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    fn ensure_streaming(&self) -> std::result::Result<(), StateError> {
        match self.state() {
            PipelineState::Streaming => Ok(()),
            other => Err(StateError::NotStreaming(other)),
        }
    }

    /// Claim the filter step, or `None` when another delivery holds it.
    ///
    /// The lifecycle check comes first so a stopped pipeline always reports
    /// its state instead of a busy drop.
    fn begin_frame(&self) -> std::result::Result<Option<InFlight<'_>>, StateError> {
        self.ensure_streaming()?;
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Ok(None);
        }
        Ok(Some(InFlight(&self.in_flight)))
    }

    /// Size the buffers for a new capture session.
    pub fn configure(&self, config: CaptureConfig) -> Result<()> {
        config.validate()?;
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        if self.state() == PipelineState::Streaming {
            return Err(StateError::Streaming.into());
        }

        let buffers = &mut slot.buffers;
        let input = buffers.pool.acquire_input_buffer(config.frame_len());
        let output = buffers.pool.acquire_output_image(config.width, config.height);
        buffers.input = Some(input);
        buffers.output = Some(output);
        buffers.config = Some(config);
        self.set_state(PipelineState::Configured);

        slot.presenter.stats.reset();
        slot.presenter.consecutive_failures = 0;
        self.pending_busy.store(0, Ordering::Relaxed);

        info!(
            "preview configured: {}x{} {} @ {}-{} fps",
            config.width, config.height, config.format, config.min_fps, config.max_fps
        );
        Ok(())
    }

    /// Begin accepting frames. No-op when already streaming.
    pub fn start(&self) -> std::result::Result<(), StateError> {
        let _slot = self.slot.lock();
        match self.state() {
            PipelineState::Configured => {
                self.set_state(PipelineState::Streaming);
                info!("preview streaming with filter {}", self.selector());
                Ok(())
            }
            PipelineState::Streaming => Ok(()),
            PipelineState::Uninitialized | PipelineState::Stopped => Err(StateError::NotConfigured),
        }
    }

    /// Stop accepting frames. Buffers are kept until the next `configure`.
    pub fn stop(&self) -> std::result::Result<(), StateError> {
        let slot = self.slot.lock();
        match self.state() {
            PipelineState::Streaming => {
                self.set_state(PipelineState::Stopped);
                info!("preview stopped after {} frames", slot.presenter.sequence);
                Ok(())
            }
            PipelineState::Stopped => Ok(()),
            other => Err(StateError::NotStreaming(other)),
        }
    }

    /// Filter a frame owned by the caller and present the result.
    ///
    /// `frame` is only read during this call; the caller may reuse its
    /// storage as soon as it returns.
    pub fn on_frame_delivered(&self, frame: RawFrame<'_>) -> Result<FrameOutcome> {
        let Some(_in_flight) = self.begin_frame()? else {
            return Ok(self.drop_busy());
        };
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        self.flush_busy(&mut slot.presenter.stats);
        // stop() may have won the lock since the check above
        self.ensure_streaming()?;

        let selector = self.selector();
        let output = slot
            .buffers
            .output
            .and_then(|h| slot.buffers.pool.output_mut(h))
            .ok_or(StateError::NotConfigured)?;
        slot.presenter
            .process(self.filter.as_ref(), output, &frame, selector)
    }

    /// Lend the pooled capture buffer to `source`, then filter what it wrote.
    pub fn pump(&self, source: &mut dyn FrameSource) -> Result<FrameOutcome> {
        let Some(_in_flight) = self.begin_frame()? else {
            return Ok(self.drop_busy());
        };
        let mut guard = self.slot.lock();
        let slot = &mut *guard;
        self.flush_busy(&mut slot.presenter.stats);
        self.ensure_streaming()?;

        let config = slot.buffers.config.ok_or(StateError::NotConfigured)?;
        let (Some(input), Some(output)) = (slot.buffers.input, slot.buffers.output) else {
            return Err(StateError::NotConfigured.into());
        };
        let (buf, image) = slot
            .buffers
            .pool
            .split_mut(input, output)
            .ok_or(StateError::NotConfigured)?;

        if !source.capture_into(buf, &config)? {
            slot.presenter.stats.record_drop(DropReason::NoFrame);
            return Ok(FrameOutcome::Dropped(DropReason::NoFrame));
        }

        let selector = self.selector();
        let frame = RawFrame::new(buf, config.width, config.height, config.format);
        slot.presenter
            .process(self.filter.as_ref(), image, &frame, selector)
    }

    /// Select the filter for subsequent frames.
    pub fn set_filter(&self, selector: FilterSelector) {
        self.selector.store(selector.index(), Ordering::Release);
        debug!("filter set to {selector}");
    }

    /// Select the filter by its numeric choice (0 = RGBA, 1 = Laplacian, 2 = Gaussian).
    pub fn set_filter_index(&self, index: u8) -> std::result::Result<FilterSelector, FilterError> {
        let selector = FilterSelector::from_index(index)?;
        self.set_filter(selector);
        Ok(selector)
    }

    pub fn selector(&self) -> FilterSelector {
        FilterSelector::from_index(self.selector.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Overlay label for the current selector.
    pub fn label(&self) -> &'static str {
        self.selector().label()
    }

    /// Current capture configuration, if configured.
    pub fn config(&self) -> Option<CaptureConfig> {
        self.slot.lock().buffers.config
    }

    /// Pool handles for the input buffer and output image.
    pub fn buffer_handles(&self) -> Option<(BufferHandle, BufferHandle)> {
        let slot = self.slot.lock();
        slot.buffers.input.zip(slot.buffers.output)
    }

    /// Inspect the most recent filtered image.
    pub fn with_output<R>(&self, f: impl FnOnce(&FilteredImage) -> R) -> Option<R> {
        let slot = self.slot.lock();
        let handle = slot.buffers.output?;
        slot.buffers.pool.output(handle).map(f)
    }

    /// Inspect the pooled capture buffer.
    pub fn with_input_buffer<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let slot = self.slot.lock();
        let handle = slot.buffers.input?;
        slot.buffers.pool.input(handle).map(f)
    }

    pub fn diagnostics(&self) -> DiagnosticSnapshot {
        let mut slot = self.slot.lock();
        self.flush_busy(&mut slot.presenter.stats);
        slot.presenter.stats.snapshot()
    }

    fn drop_busy(&self) -> FrameOutcome {
        self.pending_busy.fetch_add(1, Ordering::Relaxed);
        debug!("frame dropped: previous frame still in flight");
        FrameOutcome::Dropped(DropReason::Busy)
    }

    fn flush_busy(&self, stats: &mut DiagnosticStats) {
        let pending = self.pending_busy.swap(0, Ordering::Relaxed);
        stats.record_busy_drops(pending);
    }
}
