use std::process::ExitCode;

fn main() -> ExitCode {
    subscription_memo_lib::run()
}
