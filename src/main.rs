use tunnelfx::Tunnel;

fn main() {
    env_logger::init();

    if let Err(e) = Tunnel::new().run() {
        log::error!("tunnel failed: {e}");
        std::process::exit(1);
    }
}
