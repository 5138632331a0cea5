//! Building and running generated programs with an external compiler.

use std::{
    fmt::Display,
    fs,
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use crate::error::InternalError;

const POLL: Duration = Duration::from_millis(10);
/// How long output is still collected once the process is gone.
const GRACE: Duration = Duration::from_millis(100);

/// A compiler command line plus the time budget of every process it drives.
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

/// What a finished (or killed) process left behind.
#[derive(Debug)]
pub struct Run {
    /// `None` when the process was killed for running too long.
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
}

impl Run {
    pub fn succeeded(&self) -> bool {
        self.status.is_some_and(|s| s.success())
    }
}

/// Classification of one evaluated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    /// Ran to completion but an assertion failed or the exit code was not zero.
    Exception,
    Timeout,
    /// The program did not build.
    SyntaxError,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ok => write!(f, "OK"),
            Outcome::Exception => write!(f, "Exception"),
            Outcome::Timeout => write!(f, "Timeout"),
            Outcome::SyntaxError => write!(f, "SyntaxError"),
        }
    }
}

impl Toolchain {
    /// `command` is split on whitespace; its first word is the compiler.
    pub fn new(command: &str, timeout: Duration) -> Result<Self, InternalError> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| InternalError::AnyMsg("the compiler command is empty".into()))?;
        Ok(Self {
            program,
            args: words.collect(),
            timeout,
        })
    }

    /// Build `src` into the executable `exe`.
    ///
    /// A generated file holds the candidate followed by the program testing it.
    /// Such a file is built from two units with the tests first, which makes
    /// them the entry point of the executable.
    pub fn build(&self, src: &Path, exe: &Path) -> Result<Run, InternalError> {
        let text = fs::read_to_string(src)?;
        let Some((candidate, tests)) = split_units(&text) else {
            return self.compile(&[src], exe);
        };
        let main = src.with_extension("main.cob");
        let callee = src.with_extension("candidate.cob");
        fs::write(&main, tests)?;
        fs::write(&callee, candidate)?;
        let run = self.compile(&[main.as_path(), callee.as_path()], exe);
        for unit in [&main, &callee] {
            if let Err(err) = fs::remove_file(unit) {
                log::warn!("could not remove {}: {}", unit.display(), err);
            }
        }
        run
    }

    fn compile(&self, units: &[&Path], exe: &Path) -> Result<Run, InternalError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg("-o").arg(exe).args(units);
        log::debug!("compiling {:?} with {}", units, self.program);
        self.spawn(cmd)
    }

    pub fn run(&self, exe: &Path) -> Result<Run, InternalError> {
        // a bare file name would be looked up on PATH
        let exe = if exe.is_relative() {
            Path::new(".").join(exe)
        } else {
            exe.to_path_buf()
        };
        self.spawn(Command::new(exe))
    }

    fn spawn(&self, mut cmd: Command) -> Result<Run, InternalError> {
        let child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                InternalError::AnyMsg(format!(
                    "failed to start {}: {}",
                    cmd.get_program().to_string_lossy(),
                    e
                ))
            })?;
        Ok(wait_with_timeout(child, self.timeout)?)
    }
}

fn wait_with_timeout(mut child: Child, timeout: Duration) -> std::io::Result<Run> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            break None;
        }
        thread::sleep(POLL);
    };

    // anything the child forked may keep the pipes open past the deadline
    let collect = |output: Receiver<String>| {
        let left = deadline.saturating_duration_since(Instant::now());
        output.recv_timeout(left + GRACE).unwrap_or_default()
    };
    Ok(Run {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

/// Read a pipe to its end on a separate thread so the child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            let mut bytes = vec![];
            if pipe.read_to_end(&mut bytes).is_ok() {
                text = String::from_utf8_lossy(&bytes).into_owned();
            }
        }
        // nobody listens once the deadline has passed
        let _ = tx.send(text);
    });
    rx
}

/// Split a generated file after the candidate's `end program` line.
///
/// Returns `None` when nothing follows the first program.
pub fn split_units(source: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        offset += line.len();
        if line.trim_start().starts_with("end program ") {
            let (candidate, tests) = source.split_at(offset);
            return (!tests.trim().is_empty()).then_some((candidate, tests));
        }
    }
    None
}

/// Where the executable built from `src` goes.
pub fn exe_path(src: &Path) -> PathBuf {
    src.with_extension("bin")
}

/// Build and run `src`, then classify what happened.
pub fn evaluate(toolchain: &Toolchain, src: &Path) -> Result<Outcome, InternalError> {
    let exe = exe_path(src);
    let build = toolchain.build(src, &exe)?;
    if !build.succeeded() {
        log::info!("{} did not build:\n{}", src.display(), build.stderr);
        return Ok(Outcome::SyntaxError);
    }
    let expected = fs::read_to_string(src)?.matches("display \"pass\"").count();
    Ok(classify(&toolchain.run(&exe)?, expected))
}

/// Classify a finished run of a program reporting `expected` outcome lines.
///
/// A run that stops before reporting every assertion did not pass.
pub fn classify(run: &Run, expected: usize) -> Outcome {
    let reported = run
        .stdout
        .lines()
        .filter(|line| matches!(line.trim(), "pass" | "fail"))
        .count();
    match run.status {
        None => Outcome::Timeout,
        Some(_) if run.stdout.contains("fail") => Outcome::Exception,
        Some(status) if !status.success() => Outcome::Exception,
        Some(_) if reported < expected => Outcome::Exception,
        Some(_) => Outcome::Ok,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use super::*;

    /// A stand-in compiler that "builds" a shell script by copying it.
    fn fake_compiler(dir: &Path) -> Toolchain {
        let cc = dir.join("fakecc");
        fs::write(&cc, "cp \"$3\" \"$2\" && chmod +x \"$2\"\n").unwrap();
        Toolchain::new(
            &format!("sh {}", cc.display()),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    fn program(dir: &Path, name: &str, body: &str) -> PathBuf {
        let src = dir.join(name);
        fs::write(&src, format!("#!/bin/sh\n{}\n", body)).unwrap();
        src
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(Toolchain::new("  ", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn classifies_runs() {
        let dir = tempfile::tempdir().unwrap();
        let tc = fake_compiler(dir.path());
        let cases = [
            ("ok.cbl", "echo pass; echo pass", Outcome::Ok),
            ("fail.cbl", "echo pass; echo fail", Outcome::Exception),
            ("code.cbl", "exit 3", Outcome::Exception),
            ("slow.cbl", "exec sleep 30", Outcome::Timeout),
            ("all.cbl", "# display \"pass\"\necho pass", Outcome::Ok),
            (
                "short.cbl",
                "# display \"pass\" display \"pass\"\necho pass",
                Outcome::Exception,
            ),
            ("silent.cbl", "# display \"pass\"", Outcome::Exception),
        ];
        for (name, body, expected) in cases {
            let src = program(dir.path(), name, body);
            assert_eq!(evaluate(&tc, &src).unwrap(), expected, "{}", name);
        }
    }

    #[test]
    fn tests_are_the_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let tc = fake_compiler(dir.path());
        let src = dir.path().join("two.cbl");
        fs::write(&src, "exit 7\n       end program two.\n#!/bin/sh\necho pass\n").unwrap();
        assert_eq!(evaluate(&tc, &src).unwrap(), Outcome::Ok);
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "cob"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn splits_after_the_first_program() {
        let text = "       procedure division.\n           goback.\n       end program f.\n\n       program-id. test-prog.\n";
        let (candidate, tests) = split_units(text).unwrap();
        assert!(candidate.ends_with("       end program f.\n"));
        assert!(tests.starts_with("\n       program-id. test-prog."));
        assert_eq!(split_units("       end program f.\n\n"), None);
        assert_eq!(split_units("#!/bin/sh\necho pass\n"), None);
    }

    #[test]
    fn timeout_bounds_forked_children() {
        let dir = tempfile::tempdir().unwrap();
        let cc = dir.path().join("slowcc");
        fs::write(&cc, "sleep 4\necho done\n").unwrap();
        let tc = Toolchain::new(&format!("sh {}", cc.display()), Duration::from_secs(1)).unwrap();
        let src = program(dir.path(), "a.cbl", "echo pass");
        let start = Instant::now();
        let run = tc.build(&src, &exe_path(&src)).unwrap();
        assert!(run.status.is_none());
        assert!(start.elapsed() < Duration::from_secs(3), "took {:?}", start.elapsed());
    }

    #[test]
    fn build_failures_are_syntax_errors() {
        let dir = tempfile::tempdir().unwrap();
        let tc = Toolchain::new("false", Duration::from_secs(5)).unwrap();
        let src = program(dir.path(), "broken.cbl", "echo pass");
        assert_eq!(evaluate(&tc, &src).unwrap(), Outcome::SyntaxError);
    }

    #[test]
    fn missing_compiler_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tc = Toolchain::new("definitely-not-a-compiler-3141", Duration::from_secs(5)).unwrap();
        let src = program(dir.path(), "a.cbl", "echo pass");
        assert!(evaluate(&tc, &src).is_err());
    }
}
