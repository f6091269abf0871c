use std::{fs, path::Path};

use anyhow::{Context, Result};
use ethers::{abi::Token, types::U256};
use serde::{Deserialize, Serialize};

/// Constructor arguments of the game contract, in constructor order.
///
/// The four character arrays are parallel: entry `i` of each describes
/// character `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    pub character_names: Vec<String>,
    pub character_image_uris: Vec<String>,
    pub character_hp: Vec<u64>,
    pub character_attack_damage: Vec<u64>,
    pub boss_name: String,
    pub boss_image_uri: String,
    pub boss_hp: u64,
    pub boss_attack_damage: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("character roster is empty")]
    EmptyRoster,
    #[error("{field} has {actual} entries, expected {expected} (one per character name)")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("character index {index} is outside the roster of {len} characters")]
    CharacterOutOfRange { index: u64, len: usize },
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            character_names: vec!["Enki".into(), "Enlil".into(), "Anu".into()],
            character_image_uris: vec![
                "https://i.ibb.co/r5X1JR9/enki.jpg".into(),
                "https://i.ibb.co/NKfw7JS/enlil.jpg".into(),
                "https://i.ibb.co/3sKSmqV/anu.jpg".into(),
            ],
            character_hp: vec![100, 200, 300],
            character_attack_damage: vec![100, 50, 25],
            boss_name: "Nergal".into(),
            boss_image_uri: "https://i.ibb.co/w0B7LKD/boss.jpg".into(),
            boss_hp: 10000,
            boss_attack_damage: 50,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read game config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parse game config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn roster_len(&self) -> usize {
        self.character_names.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let expected = self.roster_len();
        if expected == 0 {
            return Err(ConfigError::EmptyRoster);
        }
        for (field, actual) in [
            ("character_image_uris", self.character_image_uris.len()),
            ("character_hp", self.character_hp.len()),
            ("character_attack_damage", self.character_attack_damage.len()),
        ] {
            if actual != expected {
                return Err(ConfigError::LengthMismatch {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    pub fn check_character(&self, index: u64) -> Result<(), ConfigError> {
        let len = self.roster_len();
        if usize::try_from(index).map_or(true, |i| i >= len) {
            return Err(ConfigError::CharacterOutOfRange { index, len });
        }
        Ok(())
    }

    /// ABI tokens for
    /// `(string[], string[], uint256[], uint256[], string, string, uint256, uint256)`.
    pub fn constructor_args(&self) -> Vec<Token> {
        let strings = |values: &[String]| {
            Token::Array(values.iter().cloned().map(Token::String).collect())
        };
        let uints = |values: &[u64]| {
            Token::Array(
                values
                    .iter()
                    .map(|v| Token::Uint(U256::from(*v)))
                    .collect(),
            )
        };

        vec![
            strings(&self.character_names),
            strings(&self.character_image_uris),
            uints(&self.character_hp),
            uints(&self.character_attack_damage),
            Token::String(self.boss_name.clone()),
            Token::String(self.boss_image_uri.clone()),
            Token::Uint(U256::from(self.boss_hp)),
            Token::Uint(U256::from(self.boss_attack_damage)),
        ]
    }
}
