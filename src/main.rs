use std::error::Error;
use std::process::ExitCode;
use std::{env, fs};

use pgservice::ServiceGroup;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: pgservice <path>");
        return ExitCode::FAILURE;
    };

    match load(&path) {
        Ok(group) => {
            for (name, service) in &group {
                println!("[{name}]");
                println!("{service}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {path}: {}", report(&err));
            ExitCode::FAILURE
        }
    }
}

fn load(path: &str) -> Result<ServiceGroup, pgservice::Error> {
    let mut reader = fs::File::open(path)?;
    ServiceGroup::from_reader(&mut reader)
}

/// Join an error and all of its sources into a single line.
fn report(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
