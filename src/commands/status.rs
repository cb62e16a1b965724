use anyhow::Result;

use regforge_core::AppConfig;
use regforge_engine::AccountStore;

pub async fn run(config: AppConfig) -> Result<()> {
    let store = AccountStore::new(&config.storage.accounts_path);
    let accounts = store.load().await?;

    let verified = accounts.iter().filter(|a| a.verified).count();

    println!("Accounts file:   {}", store.path().display());
    println!("Total accounts:  {}", accounts.len());
    println!("Verified:        {}", verified);
    println!("Unverified:      {}", accounts.len() - verified);

    if let Some(latest) = accounts.last() {
        println!("Latest:          {} ({})", latest.email, latest.timestamp);
    }

    Ok(())
}
