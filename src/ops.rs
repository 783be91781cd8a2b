//! Fill-form and multistamp operations.
//!
//! Each run owns a fresh [`Workspace`]: inputs are materialized into it, pdftk
//! writes `output.pdf` next to them, and the result is read back into memory
//! before the directory goes away.

use crate::error::{Error, Result};
use crate::fdf::{self, CheckboxLexicon, FdfError, Form};
use crate::pdftk::Pdftk;
use crate::settings::Config;
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};

const OUTPUT_FILE: &str = "output.pdf";

/// What every operation needs: the tool and where to put scratch files.
#[derive(Debug, Clone)]
pub struct Context {
    pub pdftk: Pdftk,
    pub temp_dir: PathBuf,
}

impl Context {
    pub fn new(pdftk: Pdftk, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            pdftk,
            temp_dir: temp_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Pdftk::new(&config.pdftk, config.timeout()), &config.temp_dir)
    }

    fn workspace(&self, prefix: &str) -> Result<Workspace> {
        Workspace::create(&self.temp_dir, prefix)
            .map_err(Error::resource("could not create temp dir"))
    }
}

/// Fill `template` with `form` and flatten it. Returns the PDF bytes.
pub async fn fill_form(
    ctx: &Context,
    template: &Path,
    form: &Form,
    lexicon: &CheckboxLexicon,
) -> Result<Vec<u8>> {
    let ws = ctx.workspace("fillform-")?;

    let fdf_bytes = fdf::to_bytes(form, lexicon)?;
    let fdf_path = ws
        .write("data.fdf", &fdf_bytes)
        .await
        .map_err(|e| Error::Fdf(FdfError::Io(e)))?;

    let template = std::path::absolute(template)
        .map_err(Error::resource("could not set abs template path"))?;
    let output = ws.path(OUTPUT_FILE);

    ctx.pdftk.fill_form(ws.root(), &template, &fdf_path, &output).await?;

    finish(ws, &output).await
}

/// Stamp `stamp_pdf` onto every page of `base_pdf`. Returns the PDF bytes.
pub async fn multistamp(ctx: &Context, base_pdf: &[u8], stamp_pdf: &[u8]) -> Result<Vec<u8>> {
    let ws = ctx.workspace("multistamp-")?;

    let stamp = ws
        .write("sig.pdf", stamp_pdf)
        .await
        .map_err(Error::resource("could not write signature file"))?;
    let base = ws
        .write("form.pdf", base_pdf)
        .await
        .map_err(Error::resource("could not write form file"))?;
    let output = ws.path(OUTPUT_FILE);

    ctx.pdftk.multistamp(ws.root(), &base, &stamp, &output).await?;

    finish(ws, &output).await
}

/// [`multistamp`] over files already on disk. Both must exist.
pub async fn multistamp_files(ctx: &Context, base: &Path, stamp: &Path) -> Result<Vec<u8>> {
    let base = existing_abs(base).await?;
    let stamp = existing_abs(stamp).await?;

    let ws = ctx.workspace("multistamp-")?;
    let output = ws.path(OUTPUT_FILE);

    ctx.pdftk.multistamp(ws.root(), &base, &stamp, &output).await?;

    finish(ws, &output).await
}

async fn existing_abs(path: &Path) -> Result<PathBuf> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(Error::resource("could not check input file"))?;
    if !exists {
        return Err(Error::invalid_input(format!("file does not exist: {}", path.display())));
    }
    std::path::absolute(path).map_err(Error::resource("could not set abs input path"))
}

/// Read pdftk's output and remove the workspace.
async fn finish(ws: Workspace, output: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(output).await.map_err(Error::MissingOutput)?;

    // The result is already in memory; a leftover directory is only logged
    let root = ws.root().to_path_buf();
    if let Err(e) = ws.close() {
        log::error!("[Workspace] Failed to remove {}: {}", root.display(), e);
    }

    Ok(bytes)
}
