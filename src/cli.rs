use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use banyan::output::{render_summary, render_to_string, render_tree};
use banyan::project::Project;
use banyan::walk::{MappingOracle, TreeWalker};

/// Banyan - distinguishing trees for black-box reverse engineering
#[derive(Parser)]
#[command(name = "banyan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory to start the banyan.toml search from (default: current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the distinguishing tree from all maps of the project
    Build {
        /// Print the tree instead of writing it to the output directory
        #[arg(long)]
        stdout: bool,
    },

    /// Print statistics about the distinguishing tree
    Describe,

    /// Walk the tree with an oracle that answers like CONFIG
    Identify {
        /// Configuration to simulate
        #[arg(value_name = "CONFIG")]
        config: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let project = match &self.project {
            Some(dir) => Project::discover_from(dir)?,
            None => Project::discover()?,
        };
        info!(root = ?project.root(), "found banyan project");

        match self.command {
            Commands::Build { stdout } => build(&project, stdout),
            Commands::Describe => describe(&project),
            Commands::Identify { config } => identify(&project, &config),
        }
    }
}

fn build(project: &Project, stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tree = project.build_tree()?;

    if stdout {
        print!("{}", render_to_string(tree.root()));
        return Ok(());
    }

    let output_path = project.tree_path();
    render_tree(tree.root(), &output_path)?;
    println!("Generated tree at: {:?}", output_path);

    Ok(())
}

fn describe(project: &Project) -> Result<(), Box<dyn std::error::Error>> {
    let tree = project.build_tree()?;

    print!("{}", render_summary(&tree.summary()));
    println!("Size: {}", tree.size());
    println!("Precise: {}", if tree.is_precise() { "yes" } else { "no" });

    Ok(())
}

fn identify(project: &Project, config: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tree = project.build_tree()?;
    let config = config.to_string();
    if !tree.mapping().contains(&config) {
        return Err(format!("Unknown configuration '{}'", config).into());
    }

    let walker = TreeWalker::new(project.majority)?;
    let mut oracle = MappingOracle::new(tree.mapping(), &config);
    let outcome = walker.walk(&tree, &mut oracle)?;

    let candidates: Vec<&str> = outcome.candidates.iter().map(String::as_str).collect();
    println!("Candidates: {}", candidates.join(", "));
    println!("Oracle queries: {}", outcome.queries);

    Ok(())
}
