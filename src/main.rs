use std::process::exit;

fn main() {
    if let Err(e) = blueprint_pools::app::run_cli() {
        eprintln!("error: {e}");
        exit(1);
    }
}
