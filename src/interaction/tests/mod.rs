//! Scenario tests for the annotator.
//!
//! These drive the annotator through pointer and key events the way a
//! canvas host would, using small synthetic images.


use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use annotrace_vision::Point;
use image::{Rgba, RgbaImage};

use super::{Annotator, RefinementJob, RefinementOutcome, RefinementRunner};
use crate::config::AppConfig;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Side length of the test images.
const IMAGE_SIZE: u32 = 200;

/// The white square covers this range on both axes (end exclusive).
const SQUARE: (u32, u32) = (60, 140);

/// Canvas offset of a 200x200 image centered on the default 900x520 canvas.
const OFFSET: Point = Point::new(350.0, 160.0);

fn annotator() -> Annotator {
    Annotator::new(&AppConfig::default())
}

fn square_image() -> RgbaImage {
    let mut image = RgbaImage::from_pixel(IMAGE_SIZE, IMAGE_SIZE, BLACK);
    for y in SQUARE.0..SQUARE.1 {
        for x in SQUARE.0..SQUARE.1 {
            image.put_pixel(x, y, WHITE);
        }
    }
    image
}

fn blank_image() -> RgbaImage {
    RgbaImage::from_pixel(IMAGE_SIZE, IMAGE_SIZE, BLACK)
}

/// A wobbly loop around the square, in image pixel coordinates.
fn loop_around_square() -> Vec<Point> {
    let mut path = Vec::new();
    for i in 0..=20 {
        let t = i as f32 / 20.0;
        path.push(Point::new(35.0 + 130.0 * t, 38.0 + (i % 3) as f32));
    }
    for i in 0..=20 {
        let t = i as f32 / 20.0;
        path.push(Point::new(165.0 - (i % 2) as f32, 38.0 + 127.0 * t));
    }
    for i in 0..=20 {
        let t = i as f32 / 20.0;
        path.push(Point::new(165.0 - 130.0 * t, 166.0 - (i % 3) as f32));
    }
    for i in 0..=20 {
        let t = i as f32 / 20.0;
        path.push(Point::new(34.0 + (i % 2) as f32, 166.0 - 128.0 * t));
    }
    path
}

/// Map image coordinates to the canvas for an image centered at zoom 1.
fn on_canvas(path: &[Point]) -> Vec<Point> {
    path.iter()
        .map(|p| Point::new(p.x + OFFSET.x, p.y + OFFSET.y))
        .collect()
}

/// Press, move through every point, release.
fn stroke(annotator: &mut Annotator, path: &[Point]) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    annotator.pointer_down(*first);
    for p in rest {
        annotator.pointer_move(*p);
    }
    annotator.pointer_up(*path.last().unwrap_or(first));
}

fn drag(annotator: &mut Annotator, from: (f32, f32), to: (f32, f32)) {
    annotator.pointer_down(Point::new(from.0, from.1));
    annotator.pointer_move(Point::new(to.0, to.1));
    annotator.pointer_up(Point::new(to.0, to.1));
}

fn near(p: Point, x: f32, y: f32, tolerance: f32) -> bool {
    (p.x - x).abs() <= tolerance && (p.y - y).abs() <= tolerance
}

#[derive(Default)]
struct ManualState {
    queued: VecDeque<RefinementJob>,
    finished: VecDeque<RefinementOutcome>,
    submitted: usize,
}

/// Runner that holds jobs until the test releases them.
#[derive(Clone, Default)]
struct ManualRunner {
    state: Rc<RefCell<ManualState>>,
}

impl ManualRunner {
    /// Run the oldest queued job so its outcome can be polled.
    fn complete_next(&self) -> bool {
        let mut state = self.state.borrow_mut();
        match state.queued.pop_front() {
            Some(job) => {
                let outcome = job.run();
                state.finished.push_back(outcome);
                true
            }
            None => false,
        }
    }

    fn submitted(&self) -> usize {
        self.state.borrow().submitted
    }
}

impl RefinementRunner for ManualRunner {
    fn submit(&mut self, job: RefinementJob) {
        let mut state = self.state.borrow_mut();
        state.submitted += 1;
        state.queued.push_back(job);
    }

    fn poll(&mut self) -> Option<RefinementOutcome> {
        self.state.borrow_mut().finished.pop_front()
    }
}

/// Annotator with a held-back runner and the square image loaded.
fn manual_annotator() -> (Annotator, ManualRunner) {
    let runner = ManualRunner::default();
    let mut annotator = Annotator::with_runner(&AppConfig::default(), Box::new(runner.clone()));
    annotator.load_image(square_image());
    (annotator, runner)
}
