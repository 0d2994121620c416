use anyhow::Context;

/// Where we store secrets in the OS keyring.
///
/// This is intentionally constant so upgrades don't orphan secrets.
const SERVICE: &str = "holorec";

/// Device Portal passwords are keyed by host and user, so switching between a
/// Wi-Fi and a USB profile keeps both.
fn account(host: &str, username: &str) -> String {
    format!("{}@{}", username, host.trim())
}

pub fn set_password(host: &str, username: &str, password: &str) -> anyhow::Result<()> {
    let entry = keyring::Entry::new(SERVICE, &account(host, username))
        .context("create keyring entry")?;
    entry.set_password(password).context("set secret")
}

pub fn get_password(host: &str, username: &str) -> anyhow::Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE, &account(host, username))
        .context("create keyring entry")?;

    match entry.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)).context("get secret"),
    }
}

pub fn delete_password(host: &str, username: &str) -> anyhow::Result<()> {
    let entry = keyring::Entry::new(SERVICE, &account(host, username))
        .context("create keyring entry")?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)).context("delete secret"),
    }
}
