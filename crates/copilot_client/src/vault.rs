//! On-disk slot for the long-lived GitHub access token.
//!
//! The stored value is obfuscated, not encrypted: each byte is written as a
//! three-digit decimal string, the whole string is reversed and then
//! base64-encoded without padding. This only defeats casual grepping of the
//! file; anyone with file access and the source can reverse it.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use log::warn;

pub fn obfuscate(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let digits: String = text.bytes().map(|b| format!("{b:03}")).collect();
    let reversed: String = digits.chars().rev().collect();
    STANDARD_NO_PAD.encode(reversed.as_bytes())
}

pub fn deobfuscate(text: &str) -> Option<String> {
    let decoded = STANDARD_NO_PAD.decode(text.trim()).ok()?;
    let reversed = String::from_utf8(decoded).ok()?;
    let digits: String = reversed.chars().rev().collect();
    if digits.len() % 3 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(digits.len() / 3);
    for chunk in digits.as_bytes().chunks(3) {
        let chunk = std::str::from_utf8(chunk).ok()?;
        bytes.push(chunk.parse::<u8>().ok()?);
    }
    String::from_utf8(bytes).ok()
}

/// Single-credential persistence slot. Absence of the file means "not
/// authenticated".
#[derive(Debug, Clone)]
pub struct TokenVault {
    path: PathBuf,
}

impl TokenVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenVault { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }
        let content = fs::read_to_string(&self.path).ok()?;
        let token = deobfuscate(content.trim());
        if token.is_none() {
            warn!("token file {:?} is unreadable, treating as absent", self.path);
        }
        token.filter(|t| !t.is_empty())
    }

    pub fn store(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, obfuscate(token))
    }

    pub fn clear(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn obfuscation_round_trips() {
        for token in ["gho_abc123XYZ", "a", "token with spaces\n", "äöü-unicode"] {
            let stored = obfuscate(token);
            assert_ne!(stored, token);
            assert!(!stored.contains(token));
            assert_eq!(deobfuscate(&stored).as_deref(), Some(token));
        }
    }

    #[test]
    fn deobfuscate_rejects_garbage() {
        assert_eq!(deobfuscate("not base64 at all!!!"), None);
        assert_eq!(deobfuscate(&STANDARD_NO_PAD.encode("12")), None);
    }

    #[test]
    fn vault_round_trips_through_disk() {
        let dir = tempdir().expect("tempdir");
        let vault = TokenVault::new(dir.path().join(".copilot_token"));

        assert_eq!(vault.load(), None);
        vault.store("gho_secret").expect("store");

        let raw = std::fs::read_to_string(vault.path()).expect("read raw");
        assert!(!raw.contains("gho_secret"));
        assert_eq!(vault.load().as_deref(), Some("gho_secret"));
    }

    #[test]
    fn store_overwrites_previous_credential() {
        let dir = tempdir().expect("tempdir");
        let vault = TokenVault::new(dir.path().join(".copilot_token"));

        vault.store("first").expect("store");
        vault.store("second").expect("store");
        assert_eq!(vault.load().as_deref(), Some("second"));
    }

    #[test]
    fn clear_removes_credential() {
        let dir = tempdir().expect("tempdir");
        let vault = TokenVault::new(dir.path().join(".copilot_token"));

        vault.store("tok").expect("store");
        vault.clear().expect("clear");
        assert_eq!(vault.load(), None);
    }
}
