// src/bin/cli.rs
use flyontime::{cli, log};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    log::init_stderr();
    cli::run()
}
