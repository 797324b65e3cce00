//! sprout's main application entry point.

use sprout::{
    cli::{get_args, run, templates_root},
    error::default_error_handler,
    logger::init_logger,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args, &templates_root()) {
        default_error_handler(err);
    }
}
