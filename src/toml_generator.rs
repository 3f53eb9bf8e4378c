use crate::error::Result;
use serde_derive::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use toml;

#[derive(Serialize)]
pub struct TomlStructure {
    package: BTreeMap<String, String>,
    dependencies: BTreeMap<String, DependencyInfo>,
}

#[derive(Serialize)]
pub struct DependencyInfo {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl DependencyInfo {
    fn new(version: &str, features: &[&str]) -> Self {
        Self {
            version: version.into(),
            features: if features.is_empty() {
                None
            } else {
                Some(features.iter().map(|feature: &&str| feature.to_string()).collect())
            },
        }
    }
}

impl TomlStructure {
    pub fn new(name: String, runtime_version: &str) -> Self {
        let mut package: BTreeMap<String, String> = BTreeMap::new();

        package.insert("name".into(), name);
        package.insert("version".into(), "0.1.0".into());
        package.insert("edition".into(), "2021".into());

        let mut dependencies: BTreeMap<String, DependencyInfo> = BTreeMap::new();
        dependencies.insert(env!("CARGO_PKG_NAME").into(), DependencyInfo::new(runtime_version, &[]));
        dependencies.insert(
            "async-graphql".into(),
            DependencyInfo::new("7.0.17", &["decimal", "chrono", "uuid"]),
        );
        dependencies.insert("async-graphql-poem".into(), DependencyInfo::new("7.0.17", &[]));
        dependencies.insert("poem".into(), DependencyInfo::new("3", &[]));
        dependencies.insert(
            "tokio".into(),
            DependencyInfo::new("1.17.0", &["macros", "rt-multi-thread"]),
        );
        dependencies.insert(
            "sqlx".into(),
            DependencyInfo::new(
                "0.8.1",
                &["runtime-tokio", "postgres", "uuid", "chrono", "rust_decimal", "json"],
            ),
        );
        dependencies.insert("chrono".into(), DependencyInfo::new("0.4", &[]));
        dependencies.insert("rust_decimal".into(), DependencyInfo::new("1.37.2", &[]));
        dependencies.insert("uuid".into(), DependencyInfo::new("1.11.0", &[]));
        dependencies.insert("serde_json".into(), DependencyInfo::new("1", &[]));
        dependencies.insert("tracing".into(), DependencyInfo::new("0.1", &[]));
        dependencies.insert(
            "tracing-subscriber".into(),
            DependencyInfo::new("0.3", &["env-filter"]),
        );

        Self {
            package,
            dependencies,
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn write_toml(path: &Path, name: &str, runtime_version: &str) -> Result<()> {
    let data = TomlStructure::new(name.into(), runtime_version);

    fs::write(path.join("Cargo.toml"), data.to_toml()?)?;

    Ok(())
}
