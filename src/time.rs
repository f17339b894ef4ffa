//! Frame timing: the render-loop throttle and a pausable clock.

use std::time::{Duration, Instant};

/// Gates a fast scheduling loop down to a fixed frame rate.
///
/// The event loop asks for redraws as fast as the compositor allows; a frame
/// is only *accepted* when at least one interval has elapsed since the last
/// accepted frame. On acceptance the reference time keeps the remainder
/// (`elapsed % interval`), so the cadence stays locked to the target rate
/// instead of drifting by the scheduling jitter of every frame.
#[derive(Debug)]
pub struct FrameLimiter {
    interval: Duration,
    last: Instant,
}

impl FrameLimiter {
    /// Limit to `fps` frames per second.
    pub fn new(fps: u32) -> Self {
        Self::with_interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    /// Time between accepted frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` when the next frame should run.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// [`tick`](FrameLimiter::tick) with an explicit current time, for tests.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.interval.is_zero() {
            self.last = now;
            return true;
        }

        let elapsed = now.saturating_duration_since(self.last);
        if elapsed <= self.interval {
            return false;
        }

        // Keep the remainder so the cadence doesn't drift.
        let carry = Duration::from_nanos((elapsed.as_nanos() % self.interval.as_nanos()) as u64);
        self.last = now - carry;
        true
    }

    /// Restart the cadence from now.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

/// Wall-clock tracking for the effect: elapsed time, per-frame delta, frame
/// count and a periodically refreshed FPS estimate.
///
/// While paused, `delta()` reads zero and `elapsed()` stops growing; resuming
/// discounts the paused span so elapsed time stays continuous.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    paused: bool,
    pause_elapsed: Duration,
}

/// How often the FPS estimate is refreshed.
const FPS_WINDOW: Duration = Duration::from_millis(500);

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            paused: false,
            pause_elapsed: Duration::ZERO,
        }
    }

    /// Advance the clock by one frame. Call once per accepted frame.
    pub fn update(&mut self) {
        let now = Instant::now();

        if self.paused {
            self.delta_secs = 0.0;
            return;
        }

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = (now.duration_since(self.start) - self.pause_elapsed).as_secs_f32();
        self.frame_count += 1;

        let window = now.duration_since(self.fps_update_time);
        if window >= FPS_WINDOW {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / window.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Seconds since creation, excluding paused spans.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds between the last two frames.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames accepted since creation.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Most recent frames-per-second estimate.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn limiter_rejects_early_frames() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::with_interval(Duration::from_millis(100));
        limiter.last = start;
        assert!(!limiter.tick_at(start + Duration::from_millis(10)));
        assert!(!limiter.tick_at(start + Duration::from_millis(99)));
    }

    #[test]
    fn limiter_accepts_after_the_interval() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::with_interval(Duration::from_millis(100));
        limiter.last = start;
        assert!(limiter.tick_at(start + Duration::from_millis(130)));
    }

    #[test]
    fn limiter_keeps_the_remainder() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::with_interval(Duration::from_millis(100));
        limiter.last = start;

        // Accepted 30ms late: the next slot opens at 200ms, not 230ms.
        assert!(limiter.tick_at(start + Duration::from_millis(130)));
        assert!(!limiter.tick_at(start + Duration::from_millis(195)));
        assert!(limiter.tick_at(start + Duration::from_millis(201)));
    }

    #[test]
    fn limiter_thirty_fps_interval() {
        let limiter = FrameLimiter::new(30);
        let millis = limiter.interval().as_secs_f64() * 1000.0;
        assert!((millis - 1000.0 / 30.0).abs() < 0.01);
    }

    #[test]
    fn clock_starts_at_zero() {
        let clock = Clock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn clock_update_advances() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        clock.update();
        assert!(clock.elapsed() > 0.0);
        assert!(clock.delta() > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn clock_pause_freezes_time() {
        let mut clock = Clock::new();
        clock.update();
        clock.pause();

        let frozen = clock.elapsed();
        thread::sleep(Duration::from_millis(10));
        clock.update();

        assert_eq!(clock.elapsed(), frozen);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn clock_resume_discounts_the_pause() {
        let mut clock = Clock::new();
        clock.update();
        clock.pause();
        thread::sleep(Duration::from_millis(50));
        clock.resume();
        clock.update();

        // The 50ms pause must not show up as elapsed time.
        assert!(clock.elapsed() < 0.04);
    }
}
