use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = duru_cache::run() {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
