//! Review workload forecasting
//!
//! - [`simulator`] walks one item through the SRS policy
//! - [`workload`] runs the simulator over the queue and planned lessons
//! - [`weekly`] rolls the daily series up into calendar weeks

pub mod simulator;
pub mod weekly;
pub mod workload;

pub use simulator::{
    DayBucket, DayBuckets, ReviewOrigin, Trajectory, TrajectoryEnd, TrajectorySimulator,
    TrajectoryStart, MAX_SIMULATION_STEPS,
};
pub use weekly::{aggregate_weeks, week_start_of, WeeklyForecast};
pub use workload::{
    forecast_workload, historical_accuracy, workload_metrics, DailyForecast, PeakDay,
    VolumeBreakdown, WorkloadForecast, WorkloadMetrics, DEFAULT_ACCURACY,
};
