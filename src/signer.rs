//! Resolution of the keypair the scripts sign with.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, info};

use crate::{
    crypto::Keypair,
    error::{Error, Result},
    types::Address,
};

/// Default name of the Sui CLI binary.
pub const DEFAULT_SUI_BINARY: &str = "sui";

/// Queries the Sui CLI for its active address.
pub fn active_address(sui_binary: &str) -> Result<Address> {
    let output = Command::new(sui_binary)
        .args(["client", "active-address"])
        .output()
        .map_err(|e| Error::ActiveAddress(format!("{sui_binary}: {e}")))?;
    if !output.status.success() {
        return Err(Error::ActiveAddress(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse()
        .map_err(|_| Error::ActiveAddress(format!("unexpected output: {}", stdout.trim())))
}

/// Location of the CLI keystore, `~/.sui/sui_config/sui.keystore`.
pub fn keystore_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".sui").join("sui_config").join("sui.keystore"))
        .ok_or_else(|| Error::Config("home directory is not available".to_string()))
}

/// Reads the keystore, a JSON array of base64 `flag || secret` entries.
pub fn read_keystore(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Returns the first keystore entry whose derived address is `sender`.
///
/// Entries that do not decode (unknown scheme, malformed base64) are skipped.
pub fn find_in_keystore(entries: &[String], sender: Address) -> Result<Keypair> {
    entries
        .iter()
        .filter_map(|entry| match Keypair::from_keystore_entry(entry) {
            Ok(keypair) => Some(keypair),
            Err(e) => {
                debug!(%e, "skipping keystore entry");
                None
            }
        })
        .find(|keypair| keypair.address() == sender)
        .ok_or(Error::KeypairNotFound(sender))
}

/// Resolves the signer: the explicit private key wins, otherwise the
/// keystore is scanned for the address returned by `active`.
pub fn resolve_signer<F>(private_key: Option<&str>, keystore: &Path, active: F) -> Result<Keypair>
where
    F: FnOnce() -> Result<Address>,
{
    if let Some(private_key) = private_key.filter(|k| !k.trim().is_empty()) {
        let keypair = Keypair::from_private_key(private_key)?;
        info!(address = %keypair.address(), "Using supplied private key");
        return Ok(keypair);
    }
    let sender = active()?;
    let keypair = find_in_keystore(&read_keystore(keystore)?, sender)?;
    info!(address = %sender, keystore = %keystore.display(), "Using keystore signer");
    Ok(keypair)
}

/// Resolves the signer against the local Sui CLI configuration.
pub fn get_signer(private_key: Option<&str>, sui_binary: &str) -> Result<Keypair> {
    resolve_signer(private_key, &keystore_path()?, || active_address(sui_binary))
}
