/*!
 * Monitoring
 * Engine counters and structured tracing
 */

mod stats;
mod tracer;

pub use stats::{EngineStats, StatsCollector};
pub use tracer::{init_tracing, span_operation, OperationSpan};
