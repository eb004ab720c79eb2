//! Replay one or more text traces on a [`BTBPredictor`] and report the
//! resulting statistics.

use btbsim::*;
use log::{ error, info };
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("usage: {} <trace files>", args[0]);
        return ExitCode::FAILURE;
    }

    let mut status = ExitCode::SUCCESS;
    for path in &args[1..] {
        let trace = match Trace::from_file(path) {
            Ok(trace) => trace,
            Err(e) => {
                error!("{}: {}", path, e);
                status = ExitCode::FAILURE;
                continue;
            },
        };
        info!("[*] {}, {} records", trace.name(), trace.num_entries());

        match trace.replay() {
            Ok(stats) => {
                println!("{}", stats);
                info!("  flush rate: {:.2}%", stats.flush_rate() * 100.0);
            },
            Err(e) => {
                error!("{}: {}", path, e);
                status = ExitCode::FAILURE;
            },
        }
    }
    status
}
