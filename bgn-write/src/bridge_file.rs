use std::io::Write;

type Result<T, E = std::io::Error> = std::result::Result<T, E>;

/// Entry point of the target runtime that the trampoline forwards to
pub const RUNTIME_MAIN: &str = "Konan_main";

/// Write the native bridge file.
///
/// The bridge lines are wrapped in an `extern "C"` block so the file can be compiled as C or C++. When
/// `entry_point` is given a `main`-like trampoline with that name is appended, forwarding to the runtime.
pub fn write_bridge_file(
    out: &mut impl Write,
    preamble: &[String],
    lines: &[String],
    entry_point: Option<&str>,
) -> Result<()> {
    for line in preamble {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;

    writeln!(out, "#ifdef __cplusplus")?;
    writeln!(out, "extern \"C\" {{")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;

    for line in lines {
        writeln!(out, "{line}")?;
    }

    if let Some(entry_point) = entry_point {
        writeln!(out)?;
        writeln!(out, "extern int {RUNTIME_MAIN}(int argc, char** argv);")?;
        writeln!(
            out,
            "int {entry_point}(int argc, char** argv) {{ return {RUNTIME_MAIN}(argc, argv); }}"
        )?;
    }

    writeln!(out)?;
    writeln!(out, "#ifdef __cplusplus")?;
    writeln!(out, "}}")?;
    writeln!(out, "#endif")?;

    Ok(())
}
