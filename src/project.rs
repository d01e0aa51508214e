//! Banyan project discovery, configuration and map loading

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::map::{ConfigMapping, Query};
use crate::tree::{DistinguishingTree, TreeError};

pub const PROJECT_FILE: &str = "banyan.toml";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Could not find banyan.toml in current directory or any parent")]
    ProjectNotFound,

    #[error("Failed to read banyan.toml: {0}")]
    ConfigReadError(#[from] std::io::Error),

    #[error("Failed to parse banyan.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Failed to read map {path:?}: {source}")]
    MapReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse map {path:?}: {source}")]
    MapParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid map {path:?}: {reason}")]
    InvalidMap { path: PathBuf, reason: String },

    #[error("No map files found in {0:?}")]
    NoMaps(PathBuf),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Deserialize, Default)]
struct BanyanConfig {
    profile: Option<ProfileConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct ProfileConfig {
    default: Option<DefaultProfile>,
}

#[derive(Debug, Deserialize, Default)]
struct DefaultProfile {
    maps: Option<String>,
    output: Option<String>,
    majority: Option<usize>,
}

/// Contents of one map file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapFileContent {
    name: Option<String>,
    sets: Option<IndexMap<String, Vec<toml::Value>>>,
    io: Option<IndexMap<String, IndexMap<String, toml::Value>>>,
}

/// One query set loaded from a map file
#[derive(Debug, Clone)]
pub struct DistinguishingMap {
    pub name: String,
    pub path: PathBuf,
    pub mapping: ConfigMapping<String, Query>,
}

#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub maps_dir: PathBuf,
    pub output_dir: PathBuf,
    pub majority: usize,
}

impl Project {
    /// Discover a project by searching for banyan.toml from the current
    /// directory upwards
    pub fn discover() -> Result<Self, ProjectError> {
        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Discover a project by searching for banyan.toml from `start` upwards
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let root = Self::find_project_root(start)?;
        Self::load(&root)
    }

    /// Load the project whose banyan.toml sits in `root`
    pub fn load(root: &Path) -> Result<Self, ProjectError> {
        let config_path = root.join(PROJECT_FILE);
        let config_content = fs::read_to_string(&config_path)?;
        let config: BanyanConfig = toml::from_str(&config_content)?;

        // Extract configuration with defaults
        let default_profile = config.profile.and_then(|p| p.default).unwrap_or_default();

        let maps_dir = root.join(default_profile.maps.unwrap_or_else(|| "maps".to_string()));
        let output_dir = root.join(default_profile.output.unwrap_or_else(|| "trees".to_string()));

        Ok(Self {
            root: root.to_path_buf(),
            maps_dir,
            output_dir,
            majority: default_profile.majority.unwrap_or(1),
        })
    }

    fn find_project_root(start: &Path) -> Result<PathBuf, ProjectError> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_FILE).exists() {
                return Ok(current);
            }

            if !current.pop() {
                return Err(ProjectError::ProjectNotFound);
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `banyan build` writes the rendered tree
    pub fn tree_path(&self) -> PathBuf {
        self.output_dir.join("tree.txt")
    }

    /// All map files under the maps directory, in path order
    pub fn find_all_maps(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.maps_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "toml"))
            .map(|entry| entry.path().to_path_buf())
            .collect()
    }

    /// Load every map of the project, in path order
    pub fn load_maps(&self) -> Result<Vec<DistinguishingMap>, ProjectError> {
        let paths = self.find_all_maps();
        if paths.is_empty() {
            return Err(ProjectError::NoMaps(self.maps_dir.clone()));
        }

        paths.iter().map(|path| load_map(path)).collect()
    }

    /// Build the tree from the first map and refine it with every other map
    pub fn build_tree(&self) -> Result<DistinguishingTree<String, Query>, ProjectError> {
        let maps = self.load_maps()?;
        grow_tree(&maps)
    }
}

/// Build a tree from the first map and expand it with the rest, in order.
///
/// Every map has to describe the same configurations as the first one.
pub fn grow_tree(
    maps: &[DistinguishingMap],
) -> Result<DistinguishingTree<String, Query>, ProjectError> {
    let Some((first, rest)) = maps.split_first() else {
        return Err(ProjectError::Tree(TreeError::EmptyMapping));
    };

    let mut tree = DistinguishingTree::build(first.mapping.clone())?;
    info!(map = %first.name, height = tree.height(), "built tree");

    // Map names tag every query and must be unique
    let mut names = HashSet::from([first.name.as_str()]);

    for map in rest {
        if !names.insert(map.name.as_str()) {
            return Err(ProjectError::InvalidMap {
                path: map.path.clone(),
                reason: format!("duplicate map name '{}'", map.name),
            });
        }

        if let Some(unknown) = map.mapping.configurations().find(|cfg| !first.mapping.contains(cfg)) {
            return Err(ProjectError::InvalidMap {
                path: map.path.clone(),
                reason: format!("unknown configuration '{}'", unknown),
            });
        }

        tree = tree.expand(&map.mapping)?;
        info!(map = %map.name, height = tree.height(), "expanded tree");
    }

    Ok(tree)
}

/// Load a single map file
pub fn load_map(path: &Path) -> Result<DistinguishingMap, ProjectError> {
    let content = fs::read_to_string(path).map_err(|source| ProjectError::MapReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: MapFileContent =
        toml::from_str(&content).map_err(|source| ProjectError::MapParseError {
            path: path.to_path_buf(),
            source,
        })?;

    let name = match parsed.name {
        Some(name) => name,
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let invalid = |reason: String| ProjectError::InvalidMap {
        path: path.to_path_buf(),
        reason,
    };

    let mapping = match (parsed.sets, parsed.io) {
        (Some(sets), None) => {
            let mut mapping = ConfigMapping::new();
            for (cfg, values) in sets {
                let elements = values
                    .iter()
                    .map(|value| {
                        element_text(value).map(|text| Query::new(name.as_str(), text))
                    })
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid(format!("non-scalar element for '{}'", cfg)))?;
                mapping.insert(cfg, elements);
            }
            mapping
        }
        (None, Some(io)) => {
            let mut io_maps = IndexMap::new();
            for (cfg, outputs) in io {
                let mut texts = IndexMap::new();
                for (input, value) in outputs {
                    let output = element_text(&value)
                        .ok_or_else(|| invalid(format!("non-scalar output for '{}'", cfg)))?;
                    texts.insert(input, output);
                }
                io_maps.insert(cfg, texts);
            }
            ConfigMapping::from_io_maps(io_maps)
                .iter()
                .map(|(cfg, pairs)| {
                    let queries = pairs.iter().map(|(input, output)| {
                        Query::with_output(name.as_str(), input.as_str(), output.as_str())
                    });
                    (cfg.clone(), queries.collect::<Vec<_>>())
                })
                .collect()
        }
        (Some(_), Some(_)) => return Err(invalid("both [sets] and [io] given".to_string())),
        (None, None) => return Err(invalid("missing [sets] or [io]".to_string())),
    };

    if mapping.is_empty() {
        return Err(invalid("no configurations".to_string()));
    }

    debug!(
        map = %name,
        cfgs = mapping.len(),
        elements = mapping.domain().len(),
        "loaded map"
    );

    Ok(DistinguishingMap {
        name,
        path: path.to_path_buf(),
        mapping,
    })
}

/// Text form of a scalar TOML value
fn element_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
