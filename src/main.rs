use std::process;

fn main() {
    match taskchain::cli::run() {
        Ok(status) if status.is_success() => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
