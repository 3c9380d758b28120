//! Service layer: the polling and convergence core.
//!
//! - [`ConditionPoller`]: timeout-bounded retry loop over an injected clock
//! - [`convergence_checker`]: pure snapshot comparison
//! - [`BackgroundReporter`]: cancellable diagnostic task
//! - [`ScenarioDriver`]: mutate, poll until converged, repeat
//! - [`ScopedLogger`]: per-run fields on every log record

pub mod background_reporter;
pub mod condition_poller;
pub mod convergence_checker;
pub mod scenario_driver;
pub mod scoped_logger;

pub use background_reporter::{BackgroundReporter, ReporterHandle};
pub use condition_poller::ConditionPoller;
pub use convergence_checker::{has_converged, pending_entities, PendingEntity, PendingReason};
pub use scenario_driver::{DriverSettings, ScenarioDriver};
pub use scoped_logger::ScopedLogger;
