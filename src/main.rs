use std::process;

fn main() {
    if let Err(e) = ubuild::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
