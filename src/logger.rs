/// Initialises `env_logger`.
///
/// Warnings are always shown so that descriptor problems reach the user;
/// `verbose` adds the per-entry debug trail.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .init();
}
