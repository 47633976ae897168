use std::process::exit;

fn main() {
    env_logger::init();

    if let Err(err) = labelpack::run() {
        eprintln!("Error: {err}");
        exit(1);
    }
}
