use env_logger::Env;

/// Install the process logger.
///
/// `RUST_LOG` wins; otherwise `default_filter` (e.g. `"info"`,
/// `"nativeview_core=debug"`) applies. Calling twice is harmless.
pub fn init(default_filter: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
}

/// Logger for test binaries: output is captured per test.
pub fn init_for_tests() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}
