use parlour::AppConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::new().title("Parlour").size(800, 600);
    if let Err(err) = parlour::run_with_config(config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
