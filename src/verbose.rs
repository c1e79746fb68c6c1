use log::LevelFilter;

/// Install the global logger. `info` by default, `debug` when verbose;
/// `RUST_LOG` still wins when set.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
