use std::process;

use scalajsld::{cli, logging, run};

fn main() {
    let options = match cli::parse_args(std::env::args_os()) {
        Ok(options) => options,
        Err(e) => e.exit(),
    };

    let logger = logging::init(options.log_level);

    if let Err(e) = run(&options, logger) {
        eprintln!("{}", e);

        process::exit(1);
    }
}
