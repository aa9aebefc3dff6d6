// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::io::BufRead;
use std::path::Path;

use clap::Parser;
use cli::{Cli, Commands};
use pulse_core::auth::password::{check_password_policy, hash_password};
use pulse_core::seed::load_seed_file;

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::HashPassword { password, cost } => {
            let password = match password {
                Some(p) => p.clone(),
                None => read_password_line()?,
            };
            check_password_policy(&password)?;
            println!("{}", hash_password(&password, *cost)?);
        }
        Commands::CheckSeed { file } => check_seed(file)?,
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn read_password_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(Error::Custom("no password given on stdin".into()));
    }
    Ok(password)
}

fn check_seed(file: &Path) -> Result<()> {
    let records = load_seed_file(file)?;
    let admins = records.iter().filter(|r| r.is_admin).count();
    for record in &records {
        log::debug!("{} ({})", record.email, record.department);
    }
    println!(
        "{}: {} credentials ({} admin)",
        file.display(),
        records.len(),
        admins
    );
    Ok(())
}
