use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_cat;
mod cmd_ls;
mod cmd_mv;
mod cmd_prune;
mod cmd_rm;
mod cmd_snapshot;
mod cmd_status;
mod cmd_versions;
mod cmd_write;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug ./verfs ...
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = cli::run() {
        // Логируем ошибку и выходим с кодом 1.
        error!("{:?}", e);
        std::process::exit(1);
    }
}
