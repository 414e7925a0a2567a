use std::path::{Path, PathBuf};

use common::config::RenderConfig;
use common::{AppError, Result};
use serde::Serialize;
use tracing::info;

/// Values handed to the template. `totalCommitsInPastYear` repeats
/// `totalCommits` so templates written for the one-year window keep working.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadmeData {
    pub total_stars: u64,
    pub total_commits: u64,
    pub total_commits_in_past_year: u64,
    pub colors: Vec<String>,
}

impl ReadmeData {
    pub fn new(total_stars: u64, total_commits: u64, colors: Vec<String>) -> Self {
        Self {
            total_stars,
            total_commits,
            total_commits_in_past_year: total_commits,
            colors,
        }
    }
}

pub struct Renderer {
    template_path: PathBuf,
    output_path: PathBuf,
}

impl Renderer {
    pub fn new(template_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(&config.template_path, &config.output_path)
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Reads and renders the template fully before touching the output, so
    /// a missing or broken template leaves the previous output in place.
    pub fn render<T: Serialize>(&self, data: &T) -> Result<()> {
        let template = std::fs::read_to_string(&self.template_path).map_err(|source| {
            AppError::TemplateRead {
                path: self.template_path.clone(),
                source,
            }
        })?;

        let rendered = render_str(&template, data)?;

        std::fs::write(&self.output_path, rendered.as_bytes()).map_err(|source| {
            AppError::Write {
                path: self.output_path.clone(),
                source,
            }
        })?;
        info!(
            template = %self.template_path.display(),
            output = %self.output_path.display(),
            bytes = rendered.len(),
            "rendered output"
        );
        Ok(())
    }
}

pub fn render_str<T: Serialize>(template: &str, data: &T) -> Result<String> {
    let compiled = mustache::compile_str(template).map_err(AppError::template)?;
    let mut out = Vec::with_capacity(template.len());
    compiled.render(&mut out, data).map_err(AppError::template)?;
    String::from_utf8(out).map_err(AppError::template)
}
