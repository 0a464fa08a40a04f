fn main() {
    if let Err(err) = mooni_lib::run() {
        log::error!("mooni failed: {err:#}");
        eprintln!("mooni failed: {err:#}");
        std::process::exit(1);
    }
}
