/*!
 * Monitoring
 * Structured logging setup for embedders and tests
 */

mod tracer;

pub use tracer::init_tracing;
