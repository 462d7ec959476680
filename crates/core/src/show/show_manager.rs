use anyhow::Result;
use serde_json::{from_reader, to_writer_pretty};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::document::ShowDocument;
use super::show::Show;

pub const SHOW_EXTENSION: &str = "shw";

pub struct ShowManager {
    shows_directory: PathBuf,
    current_show: Option<Show>,
    current_path: Option<PathBuf>,
}

impl ShowManager {
    pub fn new() -> Result<Self> {
        // Get the current working directory
        let shows_dir = std::env::current_dir()?;
        Ok(Self::with_directory(shows_dir))
    }

    pub fn with_directory(shows_directory: impl Into<PathBuf>) -> Self {
        Self {
            shows_directory: shows_directory.into(),
            current_show: None,
            current_path: None,
        }
    }

    pub fn current_show(&self) -> Option<&Show> {
        self.current_show.as_ref()
    }

    pub fn current_show_mut(&mut self) -> Option<&mut Show> {
        self.current_show.as_mut()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn new_show(&mut self, name: String, num_dots: usize) -> &mut Show {
        self.current_path = None;
        self.current_show.insert(Show::new(name, num_dots))
    }

    /// Replace the current show, e.g. with the one an editor has been
    /// working on.
    pub fn set_current_show(&mut self, show: Show) {
        self.current_show = Some(show);
    }

    pub fn save_show(&mut self) -> Result<PathBuf> {
        let show = self
            .current_show
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No show is currently loaded"))?;

        let path = if let Some(path) = &self.current_path {
            path.clone()
        } else {
            // Create a new file path based on show name
            let sanitized_name = show.name.replace(' ', "_").to_lowercase();
            self.shows_directory
                .join(format!("{}.{}", sanitized_name, SHOW_EXTENSION))
        };

        write_show(show, &path)?;
        log::info!("Saved show '{}' to {}", show.name, path.display());
        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn save_show_as(&mut self, name: String, path: PathBuf) -> Result<PathBuf> {
        let show = self
            .current_show
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("No show is currently loaded"))?;
        show.name = name;

        write_show(show, &path)?;
        log::info!("Saved show '{}' to {}", show.name, path.display());
        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn load_show(&mut self, path: &Path) -> Result<&mut Show> {
        let file = File::open(path)?;
        let document: ShowDocument = from_reader(BufReader::new(file))?;
        let show = document.into_show()?;
        log::info!(
            "Loaded show '{}' with {} sheets and {} dots",
            show.name,
            show.num_sheets(),
            show.num_dots()
        );

        self.current_path = Some(path.to_path_buf());
        Ok(self.current_show.insert(show))
    }

    pub fn list_shows(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.shows_directory)?;

        let mut shows = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && path.extension().is_some_and(|ext| ext == SHOW_EXTENSION) {
                shows.push(path);
            }
        }
        shows.sort();

        Ok(shows)
    }
}

fn write_show(show: &Show, path: &Path) -> Result<()> {
    let document = show.to_document()?;
    let file = File::create(path)?;
    to_writer_pretty(BufWriter::new(file), &document)?;
    Ok(())
}
