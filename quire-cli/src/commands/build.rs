//! Build command implementation.

use anyhow::{Context, Result};
use chrono::Datelike;
use include_dir::{include_dir, Dir};
use quire_core::{build_index, prune, Config, Folder, LoadError, SearchSettings, Vault};
use quire_render::{home_fragment, NavTree, PageRenderer, RenderError, RenderMode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use walkdir::WalkDir;

// Embed static assets (CSS) at compile time so they are available after cargo install
static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../static");

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Output directory {0:?} already exists")]
    OutputExists(PathBuf),

    #[error("Failed to load notes: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to render page: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to serialize search data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T, BuildError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, BuildError> {
        self.map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Everything a build needs, with config file and CLI flags already merged
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Asset directory copied to `static/`; the embedded bundle when `None`
    pub static_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub site_name: String,
    /// HTML placed above the home page listing
    pub description: Option<String>,
    pub base_url: String,
    pub search: SearchSettings,
    pub year: i32,
}

impl BuildOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir(),
            output_dir: config.output_dir(),
            static_dir: config.static_dir(),
            overwrite: false,
            site_name: config.site.name.clone(),
            description: None,
            base_url: config.normalized_base_url(),
            search: config.search.clone(),
            year: chrono::Utc::now().year(),
        }
    }
}

/// Flags from the command line that take precedence over the config file
#[derive(Debug, Default)]
pub struct BuildOverrides {
    pub overwrite: bool,
    pub wiki_name: Option<String>,
    pub wiki_desc: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built { notes: usize, folders: usize },
    /// Nothing publishable; only the output root and assets were written
    NoData,
}

/// Build the static site, returning the process exit status
pub fn build_site(config_path: &Path, overrides: BuildOverrides) -> Result<ExitCode> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::load_or_default(config_path).context("Failed to load configuration")?;

    let mut options = BuildOptions::from_config(&config);
    options.overwrite = overrides.overwrite;
    if let Some(name) = overrides.wiki_name {
        options.site_name = name;
    }
    if let Some(output) = overrides.output {
        options.output_dir = output;
    }

    let description_file = overrides.wiki_desc.or_else(|| config.description_file());
    if let Some(path) = description_file {
        let description = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read description file {:?}", path))?;
        options.description = Some(description);
    }

    match SiteGenerator::run(&options) {
        Ok(BuildOutcome::Built { notes, folders }) => {
            println!(
                "Built {} notes and {} folders into {}",
                notes,
                folders,
                options.output_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(BuildOutcome::NoData) => {
            println!("No data found.");
            Ok(ExitCode::SUCCESS)
        }
        Err(BuildError::OutputExists(path)) => {
            tracing::debug!("Refusing to touch {:?}", path);
            println!("Output directory already exists.");
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err).context("Failed to build site"),
    }
}

/// Writes a whole site for one build
pub struct SiteGenerator<'a> {
    options: &'a BuildOptions,
    renderer: PageRenderer,
}

impl<'a> SiteGenerator<'a> {
    /// Run every stage of the build in order.
    pub fn run(options: &'a BuildOptions) -> Result<BuildOutcome, BuildError> {
        let generator = SiteGenerator {
            options,
            renderer: PageRenderer::new(
                options.site_name.clone(),
                options.base_url.clone(),
                RenderMode::Static,
            )
            .with_year(options.year),
        };

        generator.prepare_output()?;
        generator.copy_assets()?;

        let tree = Vault::new(&options.data_dir).load_tree()?;
        let Some(tree) = prune(tree) else {
            tracing::info!("No publishable notes in {:?}", options.data_dir);
            return Ok(BuildOutcome::NoData);
        };

        generator.write_search_artifacts(&tree)?;

        let nav = generator.renderer.nav_tree(&tree);
        let notes = generator.write_note_pages(&tree, &nav)?;
        let home = generator.write_home_page(&tree, &nav)?;
        let folders = generator.write_folder_pages(&tree, &nav, &home)?;

        tracing::info!("✓ Built {} notes and {} folders", notes, folders);
        tracing::info!("✓ Output written to {:?}", options.output_dir);
        Ok(BuildOutcome::Built { notes, folders })
    }

    fn output(&self) -> &Path {
        &self.options.output_dir
    }

    /// Start from a fresh output directory, never merging into an old one.
    fn prepare_output(&self) -> Result<(), BuildError> {
        let output = self.output();
        if output.exists() {
            if !self.options.overwrite {
                return Err(BuildError::OutputExists(output.to_path_buf()));
            }
            tracing::info!("Removing existing output {:?}", output);
            fs::remove_dir_all(output).at(output)?;
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).at(parent)?;
        }
        // A concurrent build that created the directory first wins
        match fs::create_dir(output) {
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                Err(BuildError::OutputExists(output.to_path_buf()))
            }
            result => result.at(output),
        }
    }

    fn copy_assets(&self) -> Result<(), BuildError> {
        let dest = self.output().join("static");
        fs::create_dir_all(&dest).at(&dest)?;

        match &self.options.static_dir {
            Some(dir) if dir.is_dir() => {
                copy_dir(dir, &dest)?;
                tracing::info!("Copied assets from {:?}", dir);
            }
            other => {
                if let Some(dir) = other {
                    tracing::warn!("Configured static path {:?} does not exist", dir);
                }
                extract_embedded_static(&dest)?;
                tracing::info!("Copied assets from embedded static bundle");
            }
        }
        Ok(())
    }

    fn write_search_artifacts(&self, tree: &Folder) -> Result<(), BuildError> {
        let notes = tree.flat_notes();
        let artifacts = build_index(&notes);

        let index_path = self.output().join("search-index.json");
        fs::write(&index_path, artifacts.index.to_json()?).at(&index_path)?;

        let titles_path = self.output().join("titles.json");
        fs::write(&titles_path, serde_json::to_string(&artifacts.titles)?).at(&titles_path)?;

        tracing::info!("Indexed {} notes for search", artifacts.titles.len());
        Ok(())
    }

    fn write_note_pages(&self, tree: &Folder, nav: &NavTree) -> Result<usize, BuildError> {
        let dataobj_dir = self.output().join("dataobj");
        let notes = tree.flat_notes();

        for note in &notes {
            let dir = dataobj_dir.join(note.id.to_string());
            fs::create_dir_all(&dir).at(&dir)?;

            let html = self.renderer.render_note(note, nav)?;
            let path = dir.join("index.html");
            fs::write(&path, html).at(&path)?;
            tracing::debug!("Rendered: {}", note.fullpath);
        }

        Ok(notes.len())
    }

    fn write_home_page(&self, tree: &Folder, nav: &NavTree) -> Result<String, BuildError> {
        let fragment = home_fragment(
            self.options.description.as_deref(),
            &self.options.base_url,
            &self.options.search,
        )?;
        let home = self.renderer.render_home(tree, nav, Some(&fragment))?;

        let path = self.output().join("index.html");
        fs::write(&path, &home).at(&path)?;
        Ok(home)
    }

    /// Mirror every folder under `dirs/`; `dirs/index.html` repeats the home page.
    fn write_folder_pages(
        &self,
        tree: &Folder,
        nav: &NavTree,
        home: &str,
    ) -> Result<usize, BuildError> {
        let dirs = self.output().join("dirs");
        fs::create_dir_all(&dirs).at(&dirs)?;
        let root_index = dirs.join("index.html");
        fs::write(&root_index, home).at(&root_index)?;

        let folders = tree.walk();
        for (path, folder) in &folders {
            let dir = path.split('/').fold(dirs.clone(), |acc, seg| acc.join(seg));
            fs::create_dir_all(&dir).at(&dir)?;

            let html = self.renderer.render_folder(folder, path, nav)?;
            let page = dir.join("index.html");
            fs::write(&page, html).at(&page)?;
            tracing::debug!("Rendered folder: {}", path);
        }

        Ok(folders.len())
    }
}

fn copy_dir(src: &Path, dest: &Path) -> Result<(), BuildError> {
    for entry in WalkDir::new(src)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).at(parent)?;
        }
        fs::copy(entry.path(), &target).at(&target)?;
    }
    Ok(())
}

fn extract_embedded_static(dest: &Path) -> Result<(), BuildError> {
    // Files are stored with paths relative to the embedded root, nested dirs included
    let mut pending: Vec<&'static Dir<'static>> = vec![&STATIC_ASSETS];
    while let Some(dir) = pending.pop() {
        for file in dir.files() {
            let target = dest.join(file.path());
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).at(parent)?;
            }
            fs::write(&target, file.contents()).at(&target)?;
        }
        pending.extend(dir.dirs());
    }
    Ok(())
}
