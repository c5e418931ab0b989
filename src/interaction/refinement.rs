//! Running refinement jobs, inline or on a worker thread.
//!
//! The annotator submits at most one job at a time and tags it with the
//! gesture generation current at dispatch. Runners hand outcomes back in
//! submission order; deciding whether an outcome is still wanted is the
//! annotator's job.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use annotrace_vision::{Point, RefineParams, RefinedShape, ShapeRequest, VisionError, try_refine};
use image::RgbaImage;
use web_time::Instant;

/// Everything the pipeline needs, owned so it can cross threads.
#[derive(Debug, Clone)]
pub struct RefinementJob {
    pub generation: u64,
    pub image: Arc<RgbaImage>,
    /// Stroke in image pixel coordinates.
    pub path: Vec<Point>,
    pub request: ShapeRequest,
    pub params: RefineParams,
}

impl RefinementJob {
    /// Run the pipeline on the calling thread.
    pub fn run(self) -> RefinementOutcome {
        let start = Instant::now();
        let result = try_refine(&self.image, &self.path, self.request, &self.params);
        let elapsed = start.elapsed();
        log::debug!(
            "Refinement for generation {} finished in {:.1}ms ({})",
            self.generation,
            elapsed.as_secs_f64() * 1000.0,
            if result.is_ok() { "ok" } else { "failed" }
        );
        RefinementOutcome {
            generation: self.generation,
            result,
            elapsed,
        }
    }
}

/// Result of a job, still tagged with its generation.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    pub generation: u64,
    /// Shape in image pixel coordinates, or why refinement gave up.
    pub result: Result<RefinedShape, VisionError>,
    pub elapsed: Duration,
}

/// Whether refinement can currently be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementStatus {
    /// No image loaded, refinement disabled, or the runner is gone
    Unavailable,
    /// Ready to accept a stroke
    Ready,
    /// A job is in flight
    Busy,
}

impl RefinementStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RefinementStatus::Unavailable => "Refinement unavailable",
            RefinementStatus::Ready => "Refinement ready",
            RefinementStatus::Busy => "Refining...",
        }
    }
}

/// Executes refinement jobs for the annotator.
pub trait RefinementRunner {
    /// Queue a job. Never blocks on the pipeline for threaded runners.
    fn submit(&mut self, job: RefinementJob);

    /// Take the oldest finished outcome, if any. Non-blocking.
    fn poll(&mut self) -> Option<RefinementOutcome>;

    /// Block up to `timeout` for the next outcome.
    fn wait(&mut self, _timeout: Duration) -> Option<RefinementOutcome> {
        self.poll()
    }

    /// False once the runner can no longer produce outcomes.
    fn is_available(&self) -> bool {
        true
    }
}

/// Runs each job to completion inside `submit`.
///
/// Used on wasm, where there are no threads, and in tests.
#[derive(Debug, Default)]
pub struct InlineRefiner {
    finished: VecDeque<RefinementOutcome>,
}

impl InlineRefiner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefinementRunner for InlineRefiner {
    fn submit(&mut self, job: RefinementJob) {
        self.finished.push_back(job.run());
    }

    fn poll(&mut self) -> Option<RefinementOutcome> {
        self.finished.pop_front()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use background::BackgroundRefiner;

#[cfg(not(target_arch = "wasm32"))]
mod background {
    use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use super::{RefinementJob, RefinementOutcome, RefinementRunner};

    /// Message sent to the refinement thread.
    enum ThreadMessage {
        Refine(Box<RefinementJob>),
        Shutdown,
    }

    /// Runs refinement jobs on a dedicated background thread.
    ///
    /// The thread is shut down and joined when this is dropped.
    pub struct BackgroundRefiner {
        request_tx: Sender<ThreadMessage>,
        result_rx: Receiver<RefinementOutcome>,
        /// Handle to the background thread (for joining on drop)
        thread_handle: Option<JoinHandle<()>>,
        connected: bool,
    }

    impl BackgroundRefiner {
        /// Spawn the refinement thread.
        pub fn spawn() -> std::io::Result<Self> {
            let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
            let (result_tx, result_rx) = mpsc::channel::<RefinementOutcome>();

            let thread_handle = thread::Builder::new()
                .name("refinement".to_string())
                .spawn(move || {
                    log::debug!("Refinement thread started");
                    Self::thread_loop(request_rx, result_tx);
                    log::debug!("Refinement thread exiting");
                })?;

            Ok(Self {
                request_tx,
                result_rx,
                thread_handle: Some(thread_handle),
                connected: true,
            })
        }

        fn thread_loop(request_rx: Receiver<ThreadMessage>, result_tx: Sender<RefinementOutcome>) {
            while let Ok(message) = request_rx.recv() {
                match message {
                    ThreadMessage::Refine(job) => {
                        if result_tx.send(job.run()).is_err() {
                            log::warn!("Result channel closed, refinement thread exiting");
                            break;
                        }
                    }
                    ThreadMessage::Shutdown => {
                        log::debug!("Received shutdown signal");
                        break;
                    }
                }
            }
        }

        fn disconnected(&mut self) {
            if self.connected {
                log::warn!("Refinement thread disconnected");
                self.connected = false;
            }
        }
    }

    impl RefinementRunner for BackgroundRefiner {
        fn submit(&mut self, job: RefinementJob) {
            let generation = job.generation;
            if self
                .request_tx
                .send(ThreadMessage::Refine(Box::new(job)))
                .is_err()
            {
                log::error!("Failed to send refinement job: channel closed");
                self.disconnected();
            } else {
                log::debug!("Sent refinement job for generation {}", generation);
            }
        }

        fn poll(&mut self) -> Option<RefinementOutcome> {
            match self.result_rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected();
                    None
                }
            }
        }

        fn wait(&mut self, timeout: Duration) -> Option<RefinementOutcome> {
            match self.result_rx.recv_timeout(timeout) {
                Ok(outcome) => Some(outcome),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    self.disconnected();
                    None
                }
            }
        }

        fn is_available(&self) -> bool {
            self.connected
        }
    }

    impl Drop for BackgroundRefiner {
        fn drop(&mut self) {
            log::debug!("Shutting down refinement thread");

            let _ = self.request_tx.send(ThreadMessage::Shutdown);

            if let Some(handle) = self.thread_handle.take() {
                if let Err(e) = handle.join() {
                    log::warn!("Refinement thread panicked: {:?}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn job(generation: u64) -> RefinementJob {
        let mut image = RgbaImage::from_pixel(120, 120, Rgba([0, 0, 0, 255]));
        for y in 40..80 {
            for x in 40..80 {
                image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        RefinementJob {
            generation,
            image: Arc::new(image),
            path: vec![
                Point::new(20.0, 20.0),
                Point::new(100.0, 20.0),
                Point::new(100.0, 100.0),
                Point::new(20.0, 100.0),
            ],
            request: ShapeRequest::Polygon { sides: 4 },
            params: RefineParams::default(),
        }
    }

    #[test]
    fn test_inline_refiner_keeps_order() {
        let mut runner = InlineRefiner::new();
        assert!(runner.poll().is_none());

        runner.submit(job(1));
        runner.submit(job(2));
        assert_eq!(runner.poll().map(|o| o.generation), Some(1));
        assert_eq!(runner.poll().map(|o| o.generation), Some(2));
        assert!(runner.poll().is_none());
    }

    #[test]
    fn test_job_refines_square() {
        let outcome = job(7).run();
        assert_eq!(outcome.generation, 7);
        let shape = outcome.result.expect("square should refine");
        assert_eq!(shape.points().len(), 4);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_background_refiner_round_trip() {
        let mut runner = BackgroundRefiner::spawn().expect("spawn thread");
        runner.submit(job(3));
        let outcome = runner
            .wait(Duration::from_secs(30))
            .expect("outcome within timeout");
        assert_eq!(outcome.generation, 3);
        assert!(outcome.result.is_ok());
        assert!(runner.is_available());
    }
}
