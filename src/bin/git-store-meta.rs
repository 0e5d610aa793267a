#![deny(unsafe_code)]

use std::{env, io, process::ExitCode};

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let status = cli::run(env::args_os(), &mut stdout, io::stderr());
    ExitCode::from(u8::try_from(status).unwrap_or(u8::MAX))
}
