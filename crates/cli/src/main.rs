use std::process::ExitCode;

fn main() -> ExitCode {
    servicemap_cli::run()
}
