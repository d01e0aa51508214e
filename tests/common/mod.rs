//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use banyan::map::ConfigMapping;
use banyan::output::render_to_string;
use banyan::project::{load_map, Project};
use banyan::tree::DistinguishingTree;
use tempfile::{tempdir, TempDir};

/// Get the path to the testdata directory
pub fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// The fixture project under testdata/
pub fn testdata_project() -> Project {
    Project::load(&testdata_dir()).expect("Failed to load testdata project")
}

/// Render the tree built from a single map file in testdata/maps
pub fn render_single_map(file_name: &str) -> String {
    let map = load_map(&testdata_dir().join("maps").join(file_name)).expect("Failed to load map");
    let tree = DistinguishingTree::build(map.mapping).expect("Failed to build tree");
    render_to_string(tree.root())
}

/// Create a throwaway project directory holding the given files; it is
/// removed when the returned handle drops
pub fn scratch_project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().expect("Failed to create scratch project");

    for (relative, content) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create scratch directory");
        }
        fs::write(&path, content).expect("Failed to write scratch file");
    }

    dir
}

/// Mapping from numbered configurations to small integer response sets
pub fn numbered_mapping(sets: &[Vec<u8>]) -> ConfigMapping<usize, u8> {
    sets.iter()
        .enumerate()
        .map(|(cfg, set)| (cfg, set.iter().copied()))
        .collect()
}
