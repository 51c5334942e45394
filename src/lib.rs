pub mod bench;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod scheduler;
pub mod scripts;
pub mod throttle;
pub mod units;

pub use bench::BenchRegistry;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TimerConfig;
pub use debounce::Debounce;
pub use scheduler::{IntervalHandle, TimeoutHandle, TimerScheduler};
pub use throttle::Throttle;
pub use units::TimeUnit;
