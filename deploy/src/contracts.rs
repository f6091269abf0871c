use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

pub const GAME_CONTRACT: &str = "MyEpicGame";

/// The parts of a Hardhat artifact needed to deploy and call a contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledContract {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// Hardhat artifacts directory.
#[derive(Debug, Clone)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads the deployable artifact of `name`, preferring Hardhat's
    /// `contracts/<name>.sol/<name>.json` layout before searching the tree.
    pub fn load(&self, name: &str) -> Result<CompiledContract> {
        let path = self.find(name)?;
        log::info!("artifact for {} at {}", name, path.display());

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read artifact {}", path.display()))?;
        let contract: CompiledContract = serde_json::from_str(&raw)
            .with_context(|| format!("parse artifact {}", path.display()))?;

        if contract.contract_name != name {
            bail!(
                "artifact {} holds {}, not {}",
                path.display(),
                contract.contract_name,
                name
            );
        }
        if contract.bytecode.is_empty() {
            bail!("{} has no bytecode and cannot be deployed", name);
        }
        Ok(contract)
    }

    fn find(&self, name: &str) -> Result<PathBuf> {
        let file_name = format!("{}.json", name);
        let conventional = self
            .root
            .join("contracts")
            .join(format!("{}.sol", name))
            .join(&file_name);
        if conventional.is_file() {
            return Ok(conventional);
        }

        search(&self.root, &file_name)?.ok_or(anyhow!(
            "artifact for {} not found under {}",
            name,
            self.root.display()
        ))
    }
}

fn search(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("read artifacts dir {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = search(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|n| n == file_name) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) fn write_artifact(root: &Path, rel: &str, name: &str, abi: &str, bytecode: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let body = format!(
        r#"{{"_format":"hh-sol-artifact-1","contractName":"{}","sourceName":"contracts/{}.sol","abi":{},"bytecode":"{}","deployedBytecode":"0x"}}"#,
        name, name, abi, bytecode
    );
    fs::write(path, body).unwrap();
}
