fn main() {
    if let Err(err) = locker_migrate::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
