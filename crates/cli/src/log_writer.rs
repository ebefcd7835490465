// SPDX-License-Identifier: MIT

//! The step-output sink handed to `cirun_engine::StepExecution::logger`.
//!
//! `StepExecution` threads one `&mut dyn Write` through the whole
//! pipeline run rather than swapping it per step, so this writes every
//! step's output to stdout and appends it all to a single run-level log
//! file under `<data_dir>/<path_slug>/pipelines/<build>-<pipeline_uuid>/logs/run.txt`
//! instead of the per-container file spec.md §6 names; each line is
//! still attributable to its step via the `tracing` span fields emitted
//! alongside it.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct RunLogWriter {
    file: File,
}

impl RunLogWriter {
    pub fn create(log_dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;
        let file = File::create(log_dir.join("run.txt"))?;
        Ok(Self { file })
    }
}

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}
