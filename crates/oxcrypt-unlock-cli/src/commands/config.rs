//! Show the effective dialog configuration

use clap::Args as ClapArgs;

use oxcrypt_unlock::DialogConfig;

#[derive(ClapArgs)]
pub struct Args {
    /// Print the config file location instead of its contents
    #[arg(long)]
    pub path: bool,
}

pub fn execute(args: &Args, config: &DialogConfig) -> anyhow::Result<()> {
    if args.path {
        println!("{}", oxcrypt_unlock::config::config_path()?.display());
        return Ok(());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
