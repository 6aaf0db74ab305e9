//! # T6Inject Project Discovery
//!
//! Finds the `.gsc` scripts that make up a project and checks for the
//! `main.gsc` entry script.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use t6inject_project::Project;
//!
//! let project = Project::discover("mods/zm_custom").unwrap();
//! if !project.has_entry {
//!     println!("{} has no main.gsc", project.root.display());
//! }
//! println!("{} scripts", project.files.len());
//! ```

mod locator;

pub use locator::{has_entry_file, list_project_files, Project};
