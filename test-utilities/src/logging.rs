// Installed before any test runs; RUST_LOG overrides the default filter.
#[ctor::ctor(anonymous)]
fn test_init() {
    let _ = env_logger::builder()
        .parse_env(env_logger::Env::default().default_filter_or("info,frame_pool=debug"))
        .format_level(true)
        .format_source_path(true)
        .format_module_path(false)
        .format_timestamp_micros()
        // Fatal allocator assertions panic to stderr, keep logs on stdout
        .target(env_logger::Target::Stdout)
        .is_test(true)
        .try_init();
}
