//! Batch translation of a directory of problems.

pub mod toolchain;

use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use colored::Colorize;

use crate::{
    backend::Backend,
    driver::translate_and_emit,
    error::{InternalError, ariadne_renderer::AriadneRenderer, context::Context},
};
use toolchain::{Toolchain, exe_path};

/// What happened to one problem of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Translated; no build was requested.
    TranslatedOk,
    TranslationSkip,
    CompileFail,
    CompileOk,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub translated_ok: usize,
    pub translation_skip: usize,
    pub compile_fail: usize,
    pub compile_ok: usize,
}

impl Tally {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::TranslatedOk => self.translated_ok += 1,
            Status::TranslationSkip => self.translation_skip += 1,
            Status::CompileFail => self.compile_fail += 1,
            Status::CompileOk => self.compile_ok += 1,
        }
    }
}

impl Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row = |label: &str| format!("{:<18}", label);
        writeln!(f, "{}{}", row("translated-ok"), self.translated_ok)?;
        writeln!(
            f,
            "{}{}",
            row("translation-skip").yellow(),
            self.translation_skip
        )?;
        writeln!(f, "{}{}", row("compile-fail").red(), self.compile_fail)?;
        writeln!(f, "{}{}", row("compile-ok").green(), self.compile_ok)
    }
}

/// Files directly under `dir` with the given extension, in name order.
fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, InternalError> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Translate every `.py` problem under `dir` into `out`, building each when a
/// toolchain is given.
///
/// A problem that fails to translate is reported and skipped; only I/O errors
/// and broken invariants stop the run.
pub fn run<B: Backend>(
    dir: &Path,
    out: &Path,
    backend: &B,
    toolchain: Option<&Toolchain>,
) -> Result<Tally, InternalError> {
    fs::create_dir_all(out)?;
    let mut tally = Tally::default();
    for problem in files_with_extension(dir, "py")? {
        let status = process(&problem, out, backend, toolchain)?;
        log::debug!("{}: {:?}", problem.display(), status);
        tally.record(status);
    }
    Ok(tally)
}

fn process<B: Backend>(
    problem: &Path,
    out: &Path,
    backend: &B,
    toolchain: Option<&Toolchain>,
) -> Result<Status, InternalError> {
    let mut ctx = Context::init(Box::new(AriadneRenderer::new()));
    let res = translate_and_emit(&mut ctx, problem, backend);
    ctx.finish()?;
    let translation = match res {
        Ok(translation) => translation,
        Err(InternalError::Aborted) => {
            log::warn!("skipping {}", problem.display());
            return Ok(Status::TranslationSkip);
        }
        Err(err) => return Err(err),
    };

    let stem = problem.file_stem().unwrap_or_default().to_string_lossy();
    let target = out.join(format!("{}.{}", stem, backend.extension()));
    fs::write(&target, translation.program())?;
    log::info!("wrote {}", target.display());

    let Some(toolchain) = toolchain else {
        return Ok(Status::TranslatedOk);
    };
    let build = toolchain.build(&target, &exe_path(&target))?;
    if build.succeeded() {
        Ok(Status::CompileOk)
    } else {
        log::info!("{} did not build:\n{}", target.display(), build.stderr);
        Ok(Status::CompileFail)
    }
}

/// Build every `.cbl` file under `dir`, returning the ones that compiled.
pub fn compile_dir(dir: &Path, toolchain: &Toolchain) -> Result<Vec<PathBuf>, InternalError> {
    let mut compiled = vec![];
    for src in files_with_extension(dir, "cbl")? {
        if toolchain.build(&src, &exe_path(&src))?.succeeded() {
            compiled.push(src);
        } else {
            log::warn!("{} did not build", src.display());
        }
    }
    Ok(compiled)
}
