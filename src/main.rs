fn main() {
    if let Err(err) = csv_onboard::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
