fn main() {
    if let Err(e) = daybook::cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
