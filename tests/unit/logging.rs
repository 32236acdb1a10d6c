//! Unit tests for logging initialization

use mooviz::logging::init_logging;

#[test]
fn test_init_logging_twice_keeps_first_subscriber() {
    init_logging("sandbox");
    init_logging("production");
    tracing::info!(check = true, "Logging initialized");
}
