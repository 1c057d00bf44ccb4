pub mod memory;

#[cfg(feature = "test_log")]
mod logging;
