//! Resolution of compiled contract artifacts (as produced by Hardhat in
//! `artifacts/` or Foundry in `out/`) into contract factories that carry
//! everything needed to deploy a contract.

use {
    alloy::{
        json_abi::{ContractObject, JsonAbi, StateMutability},
        primitives::Bytes,
    },
    anyhow::Context,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// Directory with the compiler's build metadata. It never contains artifacts.
const BUILD_INFO_DIR: &str = "build-info";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no artifact for contract {name} found in {}", .root.display())]
    NotFound { name: String, root: PathBuf },
    #[error(
        "multiple artifacts for contract {name} found, use a fully qualified name (e.g. \
         contracts/{name}.sol:{name}) to pick one of {candidates:?}"
    )]
    Ambiguous {
        name: String,
        candidates: Vec<PathBuf>,
    },
    #[error("contract {0} is abstract and can't be deployed")]
    Abstract(String),
    #[error("constructor of {name} expects {count} argument(s) but none are supplied")]
    ConstructorArguments { name: String, count: usize },
    #[error("contract {contract} does not declare a state changing {function}() function")]
    MissingFunction { contract: String, function: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Store of compiled artifacts rooted at a directory.
#[derive(Debug, Clone)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the factory for a contract.
    ///
    /// `name` is either a bare contract name (`GoodMorning`), which must be
    /// unique within the store, or a fully qualified name
    /// (`contracts/GoodMorning.sol:GoodMorning`).
    pub fn contract_factory(&self, name: &str) -> Result<ContractFactory, LookupError> {
        let path = match name.split_once(':') {
            Some((source, contract)) => self
                .qualified_path(source, contract)
                .ok_or_else(|| self.not_found(name))?,
            None => self.find_unique(name)?,
        };
        tracing::debug!(name, path = %path.display(), "resolved contract artifact");
        ContractFactory::from_artifact(name, path)
    }

    /// Hardhat keeps the source path (`contracts/GoodMorning.sol/`) while
    /// Foundry only keeps the source file name (`GoodMorning.sol/`).
    fn qualified_path(&self, source: &str, contract: &str) -> Option<PathBuf> {
        let file_name = format!("{contract}.json");
        let hardhat = self.root.join(source).join(&file_name);
        let foundry = Path::new(source)
            .file_name()
            .map(|source| self.root.join(source).join(&file_name));
        std::iter::once(hardhat)
            .chain(foundry)
            .find(|path| path.is_file())
    }

    fn find_unique(&self, name: &str) -> Result<PathBuf, LookupError> {
        let file_name = format!("{name}.json");
        let mut candidates = Vec::new();
        collect_artifacts(&self.root, &file_name, &mut candidates)?;
        candidates.sort();

        match candidates.len() {
            0 => Err(self.not_found(name)),
            1 => Ok(candidates.remove(0)),
            _ => Err(LookupError::Ambiguous {
                name: name.to_owned(),
                candidates,
            }),
        }
    }

    fn not_found(&self, name: &str) -> LookupError {
        LookupError::NotFound {
            name: name.to_owned(),
            root: self.root.clone(),
        }
    }
}

fn collect_artifacts(
    dir: &Path,
    file_name: &str,
    found: &mut Vec<PathBuf>,
) -> Result<(), LookupError> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("could not read artifact directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.context("could not read artifact directory entry")?;
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() != BUILD_INFO_DIR {
                collect_artifacts(&path, file_name, found)?;
            }
        } else if entry.file_name() == file_name {
            found.push(path);
        }
    }
    Ok(())
}

/// Everything needed to deploy one contract: its ABI and creation bytecode.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    name: String,
    path: PathBuf,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl ContractFactory {
    /// Loads the artifact at `path` and checks that it can be deployed without
    /// constructor arguments.
    pub fn from_artifact(name: &str, path: PathBuf) -> Result<Self, LookupError> {
        let json = fs::read(&path)
            .with_context(|| format!("could not read artifact {}", path.display()))?;
        let object: ContractObject = serde_json::from_slice(&json)
            .with_context(|| format!("could not parse artifact {}", path.display()))?;

        let abi = object
            .abi
            .with_context(|| format!("artifact {} has no ABI", path.display()))?;
        let bytecode = object
            .bytecode
            .filter(|bytecode| !bytecode.is_empty())
            .ok_or_else(|| LookupError::Abstract(name.to_owned()))?;
        if let Some(constructor) = &abi.constructor
            && !constructor.inputs.is_empty()
        {
            return Err(LookupError::ConstructorArguments {
                name: name.to_owned(),
                count: constructor.inputs.len(),
            });
        }

        Ok(Self {
            name: name.to_owned(),
            path,
            abi,
            bytecode,
        })
    }

    /// Factory with an empty ABI and placeholder bytecode that never touched
    /// the file system.
    #[cfg(any(test, feature = "test-util"))]
    pub fn dummy(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            path: PathBuf::from(format!("{name}.json")),
            abi: JsonAbi::default(),
            bytecode: Bytes::from_static(&[0x00]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Artifact the factory was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Creation bytecode, sent as input of the deployment transaction.
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Checks that the contract declares a state changing function `function`
    /// without arguments.
    pub fn ensure_function(&self, function: &str) -> Result<(), LookupError> {
        let callable = self.abi.function(function).is_some_and(|overloads| {
            overloads.iter().any(|f| {
                f.inputs.is_empty()
                    && matches!(
                        f.state_mutability,
                        StateMutability::NonPayable | StateMutability::Payable
                    )
            })
        });
        if !callable {
            return Err(LookupError::MissingFunction {
                contract: self.name.clone(),
                function: function.to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json, tempfile::TempDir};

    const BYTECODE: &str = "0x6080604052348015600f57600080fd5b50603f80601d6000396000f3fe";

    fn good_morning_abi() -> serde_json::Value {
        json!([
            {
                "inputs": [],
                "stateMutability": "nonpayable",
                "type": "constructor"
            },
            {
                "inputs": [],
                "name": "mintGMKit",
                "outputs": [],
                "stateMutability": "nonpayable",
                "type": "function"
            }
        ])
    }

    fn write_artifact(root: &Path, source: &str, name: &str, artifact: serde_json::Value) {
        let dir = root.join(source);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{name}.json")), artifact.to_string()).unwrap();
    }

    fn hardhat_artifact(name: &str, abi: serde_json::Value, bytecode: &str) -> serde_json::Value {
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": format!("contracts/{name}.sol"),
            "abi": abi,
            "bytecode": bytecode,
            "deployedBytecode": "0x",
            "linkReferences": {},
            "deployedLinkReferences": {}
        })
    }

    fn store_with_good_morning() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_artifact(
            dir.path(),
            "contracts/GoodMorning.sol",
            "GoodMorning",
            hardhat_artifact("GoodMorning", good_morning_abi(), BYTECODE),
        );
        // Hardhat writes a debug file and build info next to the artifacts.
        fs::write(
            dir.path()
                .join("contracts/GoodMorning.sol/GoodMorning.dbg.json"),
            json!({"_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/x.json"})
                .to_string(),
        )
        .unwrap();
        write_artifact(dir.path(), "build-info", "GoodMorning", json!({}));
        dir
    }

    #[test]
    fn resolves_bare_name() {
        let dir = store_with_good_morning();
        let factory = Artifacts::new(dir.path())
            .contract_factory("GoodMorning")
            .unwrap();

        assert_eq!(factory.name(), "GoodMorning");
        assert_eq!(
            factory.path(),
            dir.path().join("contracts/GoodMorning.sol/GoodMorning.json")
        );
        assert_eq!(factory.bytecode().to_string(), BYTECODE);
        factory.ensure_function("mintGMKit").unwrap();
    }

    #[test]
    fn resolves_fully_qualified_name() {
        let dir = store_with_good_morning();
        let factory = Artifacts::new(dir.path())
            .contract_factory("contracts/GoodMorning.sol:GoodMorning")
            .unwrap();
        assert_eq!(factory.abi().functions().count(), 1);
    }

    #[test]
    fn resolves_foundry_artifacts() {
        let dir = TempDir::new().unwrap();
        write_artifact(
            dir.path(),
            "GoodMorning.sol",
            "GoodMorning",
            json!({
                "abi": good_morning_abi(),
                "bytecode": { "object": BYTECODE, "linkReferences": {} },
                "deployedBytecode": { "object": "0x", "linkReferences": {} }
            }),
        );

        let factory = Artifacts::new(dir.path())
            .contract_factory("GoodMorning")
            .unwrap();
        assert_eq!(factory.bytecode().to_string(), BYTECODE);
    }

    #[test]
    fn resolves_fully_qualified_name_in_foundry_layout() {
        let dir = TempDir::new().unwrap();
        write_artifact(
            dir.path(),
            "GoodMorning.sol",
            "GoodMorning",
            json!({
                "abi": good_morning_abi(),
                "bytecode": { "object": BYTECODE, "linkReferences": {} },
                "deployedBytecode": { "object": "0x", "linkReferences": {} }
            }),
        );
        let artifacts = Artifacts::new(dir.path());

        let factory = artifacts
            .contract_factory("src/GoodMorning.sol:GoodMorning")
            .unwrap();
        assert_eq!(
            factory.path(),
            dir.path().join("GoodMorning.sol/GoodMorning.json")
        );
        assert!(matches!(
            artifacts.contract_factory("src/GoodEvening.sol:GoodMorning"),
            Err(LookupError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_artifact() {
        let dir = store_with_good_morning();
        let artifacts = Artifacts::new(dir.path());

        assert!(matches!(
            artifacts.contract_factory("GoodEvening"),
            Err(LookupError::NotFound { .. })
        ));
        assert!(matches!(
            artifacts.contract_factory("contracts/Other.sol:GoodMorning"),
            Err(LookupError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_root_directory() {
        let dir = TempDir::new().unwrap();
        let artifacts = Artifacts::new(dir.path().join("nope"));
        assert!(matches!(
            artifacts.contract_factory("GoodMorning"),
            Err(LookupError::Other(_))
        ));
    }

    #[test]
    fn ambiguous_name() {
        let dir = store_with_good_morning();
        write_artifact(
            dir.path(),
            "contracts/legacy/GoodMorning.sol",
            "GoodMorning",
            hardhat_artifact("GoodMorning", good_morning_abi(), BYTECODE),
        );

        let err = Artifacts::new(dir.path())
            .contract_factory("GoodMorning")
            .unwrap_err();
        let LookupError::Ambiguous { candidates, .. } = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn abstract_contract() {
        let dir = TempDir::new().unwrap();
        write_artifact(
            dir.path(),
            "contracts/IGoodMorning.sol",
            "IGoodMorning",
            hardhat_artifact("IGoodMorning", good_morning_abi(), "0x"),
        );

        assert!(matches!(
            Artifacts::new(dir.path()).contract_factory("IGoodMorning"),
            Err(LookupError::Abstract(_))
        ));
    }

    #[test]
    fn constructor_with_arguments() {
        let dir = TempDir::new().unwrap();
        let abi = json!([
            {
                "inputs": [{ "internalType": "uint256", "name": "supply", "type": "uint256" }],
                "stateMutability": "nonpayable",
                "type": "constructor"
            }
        ]);
        write_artifact(
            dir.path(),
            "contracts/Token.sol",
            "Token",
            hardhat_artifact("Token", abi, BYTECODE),
        );

        let err = Artifacts::new(dir.path())
            .contract_factory("Token")
            .unwrap_err();
        assert!(matches!(
            err,
            LookupError::ConstructorArguments { count: 1, .. }
        ));
    }

    #[test]
    fn function_must_be_state_changing_without_arguments() {
        let dir = TempDir::new().unwrap();
        let abi = json!([
            {
                "inputs": [],
                "name": "mintGMKit",
                "outputs": [],
                "stateMutability": "view",
                "type": "function"
            },
            {
                "inputs": [{ "internalType": "address", "name": "to", "type": "address" }],
                "name": "mintGMKit",
                "outputs": [],
                "stateMutability": "nonpayable",
                "type": "function"
            }
        ]);
        write_artifact(
            dir.path(),
            "contracts/GoodMorning.sol",
            "GoodMorning",
            hardhat_artifact("GoodMorning", abi, BYTECODE),
        );

        let factory = Artifacts::new(dir.path())
            .contract_factory("GoodMorning")
            .unwrap();
        assert!(matches!(
            factory.ensure_function("mintGMKit"),
            Err(LookupError::MissingFunction { .. })
        ));
        assert!(matches!(
            factory.ensure_function("burnGMKit"),
            Err(LookupError::MissingFunction { .. })
        ));
    }
}
