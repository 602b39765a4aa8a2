//! Codes command - list FCC grantee codes matching a company name.

use anyhow::Result;
use colored::Colorize;

use crate::config::Settings;
use crate::fcc::FccClient;

/// Execute the codes command.
pub fn execute(company: &str, settings: &Settings) -> Result<()> {
    let client = FccClient::new(&settings.user_agent, settings.timeout)?;
    let codes = client.lookup_grantee_codes(company)?;

    if codes.is_empty() {
        eprintln!(
            "{} No grantee codes found for '{}'",
            "✗".red().bold(),
            company.cyan()
        );
        return Ok(());
    }

    for code in &codes {
        println!("{}", code);
    }
    eprintln!(
        "{} {} grantee code(s) for '{}'",
        "✓".green().bold(),
        codes.len(),
        company.cyan()
    );

    Ok(())
}
