//! Runs a whole generation: stubs from a declaration index, the native bridge file, and target sources or a
//! metadata module, all written into one output directory.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bgn_stub::{BuildWarning, GenerationContext, StubBuilder};
use bgn_util::GenerationMode;
use bgn_write::{
    write_bridge_file, BridgeBuilder, JsonMetadataEmitter, MetadataEmitter, MetadataModule,
    NativeBridgeBuilder, SourceEmitter, StubListingEmitter,
};
use tracing::{debug, info, instrument};

pub use bgn_index::DeclarationIndex;
pub use bgn_stub::sanitize_name;
pub use bgn_util::{GeneratorConfig, TargetPlatform};

/// What one run produced
#[derive(Debug)]
pub struct GenerationOutput {
    /// Declarations that were skipped, and why
    pub warnings: Vec<BuildWarning>,
    pub bridge_file: PathBuf,
    /// Target sources, or the single metadata file
    pub outputs: Vec<PathBuf>,
    pub manifest: BTreeMap<String, String>,
}

/// Name of the native bridge file written for `package`
pub fn bridge_file_name(package: &str) -> String {
    format!("{}_bridge.cpp", sanitize_name(package))
}

/// Generate with the default bridge builder and emitters
pub fn generate_default(
    index: &DeclarationIndex,
    config: GeneratorConfig,
    out_dir: impl AsRef<Path>,
) -> Result<GenerationOutput, Error> {
    generate(
        index,
        config,
        out_dir,
        &NativeBridgeBuilder,
        &StubListingEmitter,
        &JsonMetadataEmitter,
    )
}

/// Build stubs for everything in `index` and write the bridge file and target output into `out_dir`.
///
/// Declarations that can't be represented are reported in the output's warnings. Any error returned means the
/// output directory may hold a partial result.
#[instrument(level = "trace", skip_all)]
pub fn generate(
    index: &DeclarationIndex,
    config: GeneratorConfig,
    out_dir: impl AsRef<Path>,
    bridge_builder: &dyn BridgeBuilder,
    source_emitter: &dyn SourceEmitter,
    metadata_emitter: &dyn MetadataEmitter,
) -> Result<GenerationOutput, Error> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir).map_err(|e| Error::FailedToWrite {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let mut ctx = GenerationContext::new(config);
    let built = StubBuilder::new(index, &mut ctx).build()?;
    debug!(
        "built {} stubs with {} warnings",
        built.stubs.ids().len(),
        built.warnings.len()
    );

    let bridges = bridge_builder.build(index, &mut ctx, built.stubs, &built.metadata)?;

    let package = ctx.package().to_string();
    let config = ctx.config();

    let mut preamble = index.preamble().to_vec();
    preamble.extend(config.extra_preamble.iter().cloned());

    let bridge_file = out_dir.join(bridge_file_name(&package));
    write_file(&bridge_file, |mut out| {
        write_bridge_file(
            &mut out,
            &preamble,
            &bridges.native_lines,
            config.entry_point.as_deref(),
        )
        .map_err(Error::from)
    })?;

    let manifest = ctx.manifest_properties();
    let mut outputs = Vec::new();

    match config.mode {
        GenerationMode::SourceCode => {
            for module in &bridges.modules {
                let name = match &module.suffix {
                    Some(suffix) => format!("{package}.{suffix}"),
                    None => package.clone(),
                };
                let path = out_dir.join(format!("{name}.{}", source_emitter.file_extension()));
                write_file(&path, |out| {
                    source_emitter
                        .emit(&package, module, out)
                        .map_err(Error::from)
                })?;
                outputs.push(path);
            }
        }
        GenerationMode::Metadata => {
            let mut metadata = MetadataModule {
                package: package.clone(),
                manifest: manifest.clone(),
                fragments: Vec::new(),
                annotations: Vec::new(),
            };
            for module in &bridges.modules {
                metadata
                    .fragments
                    .extend(metadata_emitter.fragments(&package, module)?);
                metadata
                    .annotations
                    .extend(metadata_emitter.annotations(&package, module));
            }

            let path = out_dir.join(metadata_emitter.file_name(&package));
            write_file(&path, |out| {
                metadata_emitter.write(&metadata, out).map_err(Error::from)
            })?;
            outputs.push(path);
        }
    }

    info!(
        "generated {} for {package} ({} skipped)",
        bridge_file.display(),
        built.warnings.len()
    );

    Ok(GenerationOutput {
        warnings: built.warnings,
        bridge_file,
        outputs,
        manifest,
    })
}

/// Open `path`, hand it to `write` and flush it. The file is closed however `write` returns.
fn write_file<F>(path: &Path, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Error>,
{
    let file = File::create(path).map_err(|e| Error::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut out = BufWriter::new(file);
    write(&mut out)?;
    out.flush().map_err(|e| Error::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error building stubs")]
    Stub(#[from] bgn_stub::Error),
    #[error("Error writing output")]
    Write(#[from] bgn_write::Error),
    #[error("Failed to write \"{}\"", path.display())]
    FailedToWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_file_is_named_after_the_package() {
        assert_eq!(bridge_file_name("org.sample"), "org_sample_bridge.cpp");
        assert_eq!(bridge_file_name("interop"), "interop_bridge.cpp");
    }
}
