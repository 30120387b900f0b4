use anyhow::Result;

use fintrack::config::{AppContext, Config};
use fintrack::run;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load()?;
    fintrack::logging::init(&config.log_filter);

    let mut ctx = AppContext::open(config)?;
    ensure_default_user(&mut ctx)?;
    run::as_cli(&args, &mut ctx)
}

fn ensure_default_user(ctx: &mut AppContext) -> Result<()> {
    if ctx.ledger.find_user(run::DEFAULT_USER)?.is_none() {
        ctx.ledger.create_user("Default", run::DEFAULT_USER)?;
    }
    Ok(())
}
