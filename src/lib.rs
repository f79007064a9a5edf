#![doc = r#"
ESRGUP: a batch front-end for the `realesrgan-ncnn-vulkan` upscaler.

Pick images, choose a model, a scale factor and an output format, and ESRGUP calls
the external upscaler once per image, strictly one after another, collecting a
per-file result and reporting progress along the way. The upscaling itself is done
entirely by the external executable, which is expected next to the ESRGUP binary.
This crate powers both the `esrgup` CLI and the `esrgupUI` desktop GUI.

Quick start: upscale a few files
--------------------------------
```rust,no_run
use std::path::PathBuf;
use esrgup::{upscale_files, ModelId, OutputFormat, UpscaleParams};

fn main() -> esrgup::Result<()> {
    let params = UpscaleParams::for_model(ModelId::RealesrganX4plus, OutputFormat::Png);
    let outcome = upscale_files(
        vec![PathBuf::from("catA.jpg"), PathBuf::from("catB.jpg")],
        None, // write next to each input
        params,
    )?;

    // "Successfully upscaled 2/2 image(s)!"
    println!("{}", outcome.summary());
    for failed in outcome.failures() {
        eprintln!("{:?}: {:?}", failed.input, failed.status);
    }
    Ok(())
}
```

Background batches
------------------
A [`Session`] owns the selection and the progress display. `start` runs the batch on
a single background thread and `poll` drains its events on the owning thread, so
nothing the worker does touches foreground state directly.

```rust,no_run
use std::path::PathBuf;
use esrgup::{installed_session, ModelId};

fn main() -> esrgup::Result<()> {
    let mut session = installed_session()?;
    session.selection.set_files(vec![PathBuf::from("scan.png")]);
    session.selection.set_model(ModelId::RealesrnetX4plus);
    session.start()?;

    let outcome = session.wait().expect("batch finished");
    println!("{} ({}%)", outcome.summary(), session.progress().value());
    Ok(())
}
```

Scale factors
-------------
Each model accepts a fixed set of factors (see [`core::catalog`]). Switching the
model snaps the factor to the new model's largest one, and [`UpscaleParams`] rejects
a factor the model does not accept with [`Error::UnsupportedScale`].

Output names
------------
Each input `dir/name.ext` produces `{output_dir or dir}/name_upscaled.{format}`.
Inputs sharing a stem overwrite each other when an output directory is set.

Feature flags
-------------
- `gui`: builds the GUI module and the `esrgupUI` binary.
- `full`: enables a complete feature set for typical end-to-end workflows.

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`core`]: catalog, selection, runner, progress and session.
- [`types`]: `ModelId`, `ScaleFactor`, `OutputFormat`.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod types;

// GUI module (only available with gui feature)
#[cfg(feature = "gui")]
pub mod gui;

// Curated public API surface
// Types
pub use crate::core::params::UpscaleParams;
pub use error::{Error, FailureKind, Result};
pub use types::{ModelId, OutputFormat, ScaleFactor};

// Catalog
pub use crate::core::catalog::{CATALOG, CatalogEntry, default_scale, label_and_scales};

// Batch machinery
pub use crate::core::progress::{BatchEvent, CollectingSink, ProgressDisplay, ProgressReporter, ProgressSink};
pub use crate::core::runner::{
    BatchOutcome, BatchRunner, CommandOutput, CommandRunner, FileOutcome, FileStatus,
    ProcessRunner, RunnerConfig, UpscaleJob,
};
pub use crate::core::selection::{Selection, target_path};
pub use crate::core::session::{Session, SessionConfig};

// High-level API re-exports
pub use api::{TracingSink, installed_session, runner_for, upscale_files};
