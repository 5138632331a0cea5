use std::{fs, path::Path, time::Duration};

use colored::Colorize;

use crate::{
    Cli, Command,
    backend::{Backend, Translation},
    cobol::Cobol,
    corpus::{self, toolchain::Toolchain},
    error::{InternalError, ariadne_renderer::AriadneRenderer, context::Context},
    extract::extract,
    parser::parse_file,
    types,
};

/// Parse, lower and translate one problem file.
///
/// Problems in the file are reported to `ctx` and yield [`InternalError::Aborted`].
pub fn translate_and_emit<B: Backend>(
    ctx: &mut Context,
    path: &Path,
    backend: &B,
) -> Result<Translation, InternalError> {
    let Some(parsed) = parse_file(ctx, path)? else {
        return Err(InternalError::Aborted);
    };
    let problem = types::translate(ctx, parsed)?;
    match backend.translate(&problem) {
        Ok(translation) => Ok(translation),
        Err(err) if err.is_internal() => Err(err.into()),
        Err(err) => {
            ctx.report(err.into());
            Err(InternalError::Aborted)
        }
    }
}

/// Run the selected subcommand.
pub fn run(cli: Cli) -> Result<(), InternalError> {
    match cli.command {
        Command::Translate {
            file,
            output,
            prompt_only,
            tests_only,
            opts,
        } => {
            let backend = Cobol::new(opts.config());
            let mut ctx = Context::init(Box::new(AriadneRenderer::new()));
            let translation = match translate_and_emit(&mut ctx, &file, &backend) {
                Ok(translation) => translation,
                Err(err) => {
                    ctx.finish()?;
                    return Err(err);
                }
            };
            ctx.finish()?;

            let text = if prompt_only {
                translation.prompt
            } else if tests_only {
                translation.tests
            } else {
                translation.program()
            };
            match output {
                Some(out) => {
                    fs::write(&out, text)?;
                    log::info!("wrote {}", out.display());
                }
                None => print!("{}", text),
            }
        }
        Command::Corpus {
            dir,
            out,
            no_compile,
            opts,
            build,
        } => {
            let backend = Cobol::new(opts.config());
            let toolchain = if no_compile {
                None
            } else {
                Some(build.toolchain()?)
            };
            let tally = corpus::run(&dir, &out, &backend, toolchain.as_ref())?;
            print!("{}", tally);
        }
        Command::Compile { dir, build } => {
            let compiled = corpus::compile_dir(&dir, &build.toolchain()?)?;
            for path in &compiled {
                println!("{}", path.display());
            }
            eprintln!(
                "{} {} file(s) compiled",
                "done:".green().bold(),
                compiled.len()
            );
        }
        Command::Evaluate { file, build } => {
            let outcome = corpus::toolchain::evaluate(&build.toolchain()?, &file)?;
            println!("{}", outcome);
        }
        Command::Extract {
            archive,
            output_dir,
        } => {
            for path in extract(&archive, &output_dir)? {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

impl crate::BuildOpts {
    pub fn toolchain(&self) -> Result<Toolchain, InternalError> {
        Toolchain::new(&self.compiler, Duration::from_secs(self.timeout))
    }
}
