//! pdftk invocations.
//!
//! The only place that knows pdftk's argument templates. PDF semantics stay
//! entirely inside the external tool.

use crate::process::{run_command_in_path, ToolError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

pub const DEFAULT_PROGRAM: &str = "pdftk";

#[derive(Debug, Clone)]
pub struct Pdftk {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Default for Pdftk {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, None)
    }
}

impl Pdftk {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `<template> fill_form <fdf> output <output> flatten`
    pub async fn fill_form(
        &self,
        workdir: &Path,
        template: &Path,
        fdf: &Path,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.run(workdir, fill_form_args(template, fdf, output)).await
    }

    /// `<base> multistamp <stamp> output <output>`
    pub async fn multistamp(
        &self,
        workdir: &Path,
        base: &Path,
        stamp: &Path,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.run(workdir, multistamp_args(base, stamp, output)).await
    }

    async fn run(&self, workdir: &Path, args: Vec<OsString>) -> Result<(), ToolError> {
        log::debug!("[pdftk] {} {:?}", self.program.display(), args);
        run_command_in_path(workdir, &self.program, args, self.timeout).await
    }

    /// First line of `pdftk --version`, used as a startup probe.
    ///
    /// Bounded by the same timeout as real invocations.
    pub async fn version(&self) -> Result<String, ToolError> {
        let mut command = tokio::process::Command::new(&self.program);
        command.arg("--version").stdin(Stdio::null()).kill_on_drop(true);
        let query = command.output();

        let output = match self.timeout {
            Some(after) => tokio::time::timeout(after, query).await.map_err(|_| {
                ToolError::TimedOut {
                    program: self.program.clone(),
                    after,
                }
            })?,
            None => query.await,
        }
        .map_err(|source| ToolError::Launch {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("unknown version")
            .to_string())
    }
}

fn fill_form_args(template: &Path, fdf: &Path, output: &Path) -> Vec<OsString> {
    vec![
        template.into(),
        "fill_form".into(),
        fdf.into(),
        "output".into(),
        output.into(),
        "flatten".into(),
    ]
}

fn multistamp_args(base: &Path, stamp: &Path, output: &Path) -> Vec<OsString> {
    vec![
        base.into(),
        "multistamp".into(),
        stamp.into(),
        "output".into(),
        output.into(),
    ]
}
