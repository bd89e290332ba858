use log::error;

fn main() {
    env_logger::init();

    if let Err(e) = ais_labels::get_arg().and_then(ais_labels::run) {
        error!("{e:#}");
        std::process::exit(-1);
    }
}
