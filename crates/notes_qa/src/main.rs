use std::process::ExitCode;

fn main() -> ExitCode {
    notes_qa::exit_code(notes_qa::execute_from_env())
}
