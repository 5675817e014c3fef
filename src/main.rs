fn main() {
    if let Err(err) = sheet_insights::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
