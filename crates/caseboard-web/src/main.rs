fn main() {
    if let Err(err) = caseboard_web::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
