/// Default number of rows a row set can hold before producers block
pub const DEFAULT_ROWSET_SIZE: usize = 10_000;
/// Default interval at which blocked row set waits re-check the stop signal
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
/// Default time workers get to finish after a stop before being abandoned
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;
/// Pipeline name used when the definition doesn't set one
pub const DEFAULT_PIPELINE_NAME: &str = "pipeline";

/// Default names of the diagnostic fields appended to diverted rows
pub const DEFAULT_NR_ERRORS_FIELD: &str = "nr_errors";
pub const DEFAULT_ERROR_DESCRIPTION_FIELD: &str = "error_description";
pub const DEFAULT_ERROR_FIELDS_FIELD: &str = "error_fields";
pub const DEFAULT_ERROR_CODES_FIELD: &str = "error_codes";
