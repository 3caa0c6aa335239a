fn main() {
    if let Err(err) = purge::modes::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
