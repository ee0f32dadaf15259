//! Build orchestration: load a manifest, compile every GUI concurrently and
//! stage the shared dependencies into the output directory.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use shared::{
    domain::{BuildOptions, GuiDescriptor},
    paths,
};
use structure::Structure;
use tokio::{sync::Mutex, task::JoinSet};
use tracing::{debug, error, info};

pub mod config;
mod error;
pub mod html;
pub mod names;
pub mod staging;

pub use config::{load_manifest, DependencyMap, Manifest};
pub use error::BuildError;
pub use names::UniqueFilenames;

/// The runtime script written once per build and referenced by every HTML shell.
#[derive(Debug, Clone)]
pub struct RuntimePayload {
    pub extension: String,
    pub contents: Vec<u8>,
}

impl RuntimePayload {
    pub fn javascript(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            extension: "js".to_string(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedGui {
    pub name: String,
    pub html_file: String,
    pub structure_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub runtime_file: String,
    pub guis: Vec<GeneratedGui>,
    pub staged: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct Generation {
    guis: Vec<GuiDescriptor>,
    dependencies: DependencyMap,
    output_directory: PathBuf,
}

impl Generation {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            guis: manifest.guis,
            dependencies: manifest.dependencies,
            output_directory: manifest.output_directory,
        }
    }

    pub fn load(manifest_path: &Path, output_directory: &Path) -> Result<Self, BuildError> {
        load_manifest(manifest_path, output_directory).map(Self::new)
    }

    pub fn guis(&self) -> &[GuiDescriptor] {
        &self.guis
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Build every GUI and stage all dependencies.
    ///
    /// Conflicts are detected before anything is written. Every GUI task runs
    /// to completion; if any failed, the first failure (in manifest order) is
    /// returned and no dependency is staged.
    pub async fn build_all(
        &mut self,
        options: BuildOptions,
        runtime: &RuntimePayload,
    ) -> Result<BuildSummary, BuildError> {
        let flatten = options.flatten_dependencies;

        for nested in staging::remove_nested_dependencies(&mut self.dependencies) {
            debug!(dependency = %nested.display(), "dropping dependency nested in another dependency");
        }
        staging::check_contained(&self.dependencies, flatten)?;

        if options.disallow_conflicts {
            // Structure and runtime names are not issued yet; the filename
            // generator keeps them clear of every dependency destination.
            let generated: Vec<String> = self
                .guis
                .iter()
                .map(|gui| gui.html_output_name.clone())
                .collect();
            staging::check_conflicts(&self.dependencies, &generated, &self.output_directory, flatten)?;
        }
        if flatten {
            for gui in &mut self.guis {
                gui.stylesheet_path =
                    paths::to_url_path(&staging::destination(Path::new(&gui.stylesheet_path), true));
            }
        }

        let reserved = staging::destination_filenames(&self.dependencies)
            .into_iter()
            .chain(self.guis.iter().map(|gui| gui.html_output_name.clone()));
        let names = Arc::new(Mutex::new(UniqueFilenames::new(reserved)));

        let runtime_file = names.lock().await.generate(&runtime.extension);
        let runtime_path = self.output_directory.join(&runtime_file);
        tokio::fs::write(&runtime_path, &runtime.contents)
            .await
            .map_err(BuildError::io(&runtime_path))?;
        info!(file = %runtime_file, "wrote runtime script");

        let generated = self.generate_guis(&runtime_file, &names).await?;
        for (gui, output) in self.guis.iter_mut().zip(&generated) {
            gui.structure_output_name = Some(output.structure_file.clone());
        }

        let dependencies = self.dependencies.clone();
        let output_directory = self.output_directory.clone();
        let overwrite = options.disallow_conflicts;
        let staged = tokio::task::spawn_blocking(move || {
            staging::stage_dependencies(&dependencies, &output_directory, flatten, overwrite)
        })
        .await
        .map_err(BuildError::StagingTask)??;
        info!(count = staged.len(), "staged dependencies");

        Ok(BuildSummary {
            runtime_file,
            guis: generated,
            staged,
        })
    }

    async fn generate_guis(
        &self,
        runtime_file: &str,
        names: &Arc<Mutex<UniqueFilenames>>,
    ) -> Result<Vec<GeneratedGui>, BuildError> {
        let mut tasks = JoinSet::new();
        for (position, gui) in self.guis.iter().enumerate() {
            let gui = gui.clone();
            let output_directory = self.output_directory.clone();
            let runtime_file = runtime_file.to_string();
            let names = Arc::clone(names);
            tasks.spawn(async move {
                let name = gui.name.clone();
                let result = generate_gui(gui, output_directory, runtime_file, names).await;
                (position, name, result)
            });
        }

        let mut results: Vec<Option<Result<GeneratedGui, BuildError>>> =
            (0..self.guis.len()).map(|_| None).collect();
        let mut aborted = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, name, result)) => {
                    if let Err(failure) = &result {
                        error!(gui = %name, error = %failure, "GUI generation failed");
                    }
                    results[position] = Some(result);
                }
                Err(source) => {
                    error!(error = %source, "GUI generation task aborted");
                    aborted.get_or_insert(source);
                }
            }
        }

        let mut generated = Vec::with_capacity(results.len());
        for (gui, result) in self.guis.iter().zip(results) {
            match result {
                Some(Ok(output)) => generated.push(output),
                Some(Err(failure)) => return Err(failure),
                None => {
                    if let Some(source) = aborted.take() {
                        return Err(BuildError::Task {
                            gui: gui.name.clone(),
                            source,
                        });
                    }
                }
            }
        }
        Ok(generated)
    }
}

async fn generate_gui(
    gui: GuiDescriptor,
    output_directory: PathBuf,
    runtime_file: String,
    names: Arc<Mutex<UniqueFilenames>>,
) -> Result<GeneratedGui, BuildError> {
    let source = gui.source_definition_file.clone();
    let name = gui.name.clone();
    let numeric_references = !gui.debug;
    let structure = tokio::task::spawn_blocking(move || {
        Structure::load(&source, name)?.build(numeric_references)
    })
    .await
    .map_err(|source| BuildError::Task {
        gui: gui.name.clone(),
        source,
    })?
    .map_err(|source| BuildError::Compile {
        gui: gui.name.clone(),
        source,
    })?;

    let structure_file = names.lock().await.generate("json");
    let html = html::shell(&gui, &structure_file, &runtime_file)?;

    let html_path = output_directory.join(&gui.html_output_name);
    tokio::fs::write(&html_path, html)
        .await
        .map_err(BuildError::io(&html_path))?;
    let structure_path = output_directory.join(&structure_file);
    tokio::fs::write(&structure_path, structure)
        .await
        .map_err(BuildError::io(&structure_path))?;
    info!(gui = %gui.name, html = %gui.html_output_name, structure = %structure_file, "generated GUI");

    Ok(GeneratedGui {
        name: gui.name,
        html_file: gui.html_output_name,
        structure_file,
    })
}

/// Load `manifest_path` and build everything it describes into `output_directory`.
pub async fn generate(
    manifest_path: &Path,
    output_directory: &Path,
    options: BuildOptions,
    runtime: &RuntimePayload,
) -> Result<BuildSummary, BuildError> {
    let mut generation = Generation::load(manifest_path, output_directory)?;
    generation.build_all(options, runtime).await
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
