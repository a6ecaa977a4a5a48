#![allow(unused)]
use std::cell::RefCell;
use std::time::Duration;

#[derive(Default, Clone, Debug)]
pub struct TimingStats {
    pub assembly_times: Vec<Duration>,
    pub factorization_times: Vec<Duration>,
    pub step_times: Vec<Duration>,
    pub total_time: Duration,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "timing")]
    pub fn print_summary(&self) {
        if self.step_times.is_empty() && self.assembly_times.is_empty() {
            return;
        }

        let assembly: Duration = self.assembly_times.iter().sum();
        let factorization: Duration = self.factorization_times.iter().sum();
        let stepping: Duration = self.step_times.iter().sum();
        let overhead = self
            .total_time
            .saturating_sub(assembly + factorization + stepping);

        println!("\n{}", "=".repeat(60));
        println!("{:^60}", "WAVE SOLVER TIMING SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "Total time:                    {:.3}s",
            self.total_time.as_secs_f64()
        );
        println!("{}", "-".repeat(60));
        println!(
            "  Gamma assembly:            {:>9.3}ms  ({} runs)",
            assembly.as_secs_f64() * 1000.0,
            self.assembly_times.len()
        );
        println!(
            "  Factorization:             {:>9.3}ms  ({} systems)",
            factorization.as_secs_f64() * 1000.0,
            self.factorization_times.len()
        );
        println!(
            "  Time stepping:             {:>9.3}ms  (avg: {:>7.3}ms/step)",
            stepping.as_secs_f64() * 1000.0,
            stepping.as_secs_f64() * 1000.0 / self.step_times.len().max(1) as f64
        );
        println!("{}", "=".repeat(60));
        println!(
            "Overhead/Other:                {:>9.3}ms\n",
            overhead.as_secs_f64() * 1000.0
        );
    }

    #[cfg(not(feature = "timing"))]
    pub fn print_summary(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static TIMING_STATS: RefCell<TimingStats> = RefCell::new(TimingStats::new());
}

#[cfg(feature = "timing")]
fn record<F, R>(f: F, slot: fn(&mut TimingStats) -> &mut Vec<Duration>) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| slot(&mut stats.borrow_mut()).push(elapsed));
    result
}

#[cfg(feature = "timing")]
pub fn reset_timing() {
    TIMING_STATS.with(|stats| {
        *stats.borrow_mut() = TimingStats::new();
    });
}

#[cfg(not(feature = "timing"))]
pub fn reset_timing() {}

#[cfg(feature = "timing")]
pub fn record_assembly<F: FnOnce() -> R, R>(f: F) -> R {
    record(f, |s| &mut s.assembly_times)
}

#[cfg(not(feature = "timing"))]
pub fn record_assembly<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

#[cfg(feature = "timing")]
pub fn record_factorization<F: FnOnce() -> R, R>(f: F) -> R {
    record(f, |s| &mut s.factorization_times)
}

#[cfg(not(feature = "timing"))]
pub fn record_factorization<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

#[cfg(feature = "timing")]
pub fn record_step<F: FnOnce() -> R, R>(f: F) -> R {
    record(f, |s| &mut s.step_times)
}

#[cfg(not(feature = "timing"))]
pub fn record_step<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

#[cfg(feature = "timing")]
pub fn finalize_timing(total_time: Duration) -> TimingStats {
    TIMING_STATS.with(|stats| {
        let mut s = stats.borrow_mut();
        s.total_time = total_time;
        s.clone()
    })
}

#[cfg(not(feature = "timing"))]
pub fn finalize_timing(_total_time: Duration) -> TimingStats {
    TimingStats::new()
}

#[cfg(feature = "timing")]
pub fn finalize_and_print(total_time: Duration) {
    finalize_timing(total_time).print_summary();
}

#[cfg(not(feature = "timing"))]
pub fn finalize_and_print(_total_time: Duration) {}
