use std::process::ExitCode;

fn main() -> ExitCode {
    nsconf_cli::run()
}
