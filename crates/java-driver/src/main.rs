//! Binary entrypoint for the Java driver.

use std::ffi::OsString;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use driver_config::Config;
use ortho_config::OrthoConfig;
use java_driver::{run, telemetry};

fn main() -> ExitCode {
    // Only the program name is forwarded: the driver takes no flags.
    let config = match Config::load_from_iter([OsString::from(env!("CARGO_BIN_NAME"))]) {
        Ok(config) => config,
        Err(error) => {
            writeln!(io::stderr().lock(), "failed to load configuration: {error}").ok();
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = telemetry::initialise(&config) {
        writeln!(io::stderr().lock(), "{error}").ok();
        return ExitCode::FAILURE;
    }

    let mut reader = BufReader::new(io::stdin());
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match run(&mut reader, &mut writer, &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "driver terminated");
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
