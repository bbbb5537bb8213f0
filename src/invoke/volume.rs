//! Batched `shfs_admin` invocation.
use super::{run_tool, InvocationOutcome};
use crate::cli::FileAdditionSpec;
use crate::error::Result;
use crate::tools::{ToolResolver, SHFS_ADMIN};
use crate::util::is_blank;

/// Verbose, forced operation: no interactive questions from the admin tool.
pub const VOLUME_FIXED_FLAGS: [&str; 2] = ["-v", "-f"];

/// Arguments for one `shfs_admin` call covering every spec, in order.
pub fn build_volume_args(specs: &[FileAdditionSpec], passthrough: &[String]) -> Vec<String> {
    let mut args: Vec<String> = VOLUME_FIXED_FLAGS.iter().map(|flag| flag.to_string()).collect();
    for spec in specs {
        args.push("-a".to_string());
        args.push(spec.path.clone());
        if let Some(name) = spec.name.as_deref().filter(|name| !is_blank(name)) {
            args.push("-n".to_string());
            args.push(name.to_string());
        }
        if let Some(mime) = spec.mime.as_deref().filter(|mime| !is_blank(mime)) {
            args.push("-m".to_string());
            args.push(mime.to_string());
        }
    }
    args.extend(passthrough.iter().cloned());
    args
}

/// Register all specs with a single `shfs_admin` run.
///
/// Runs even when `specs` is empty. The exit code is returned, not judged.
pub fn update_volume(
    resolver: &mut ToolResolver,
    specs: &[FileAdditionSpec],
    passthrough: &[String],
) -> Result<InvocationOutcome> {
    let tool = resolver.resolve(SHFS_ADMIN)?;
    let args = build_volume_args(specs, passthrough);
    let output = run_tool(&tool, &args, false)?;
    Ok(InvocationOutcome::from_exit_code(output.status.code()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(path: &str, name: Option<&str>, mime: Option<&str>) -> FileAdditionSpec {
        FileAdditionSpec {
            path: path.to_string(),
            name: name.map(str::to_string),
            mime: mime.map(str::to_string),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn specs_are_batched_in_order_before_passthrough() {
        let specs = vec![
            spec("song.mp4", Some("song"), Some("video/mp4")),
            spec("notes.txt", None, Some("text/plain")),
            spec("raw.bin", Some("raw"), None),
        ];
        let args = build_volume_args(&specs, &strings(&["/dev/ram14", "/dev/ram15"]));
        assert_eq!(
            args,
            strings(&[
                "-v", "-f", "-a", "song.mp4", "-n", "song", "-m", "video/mp4", "-a",
                "notes.txt", "-m", "text/plain", "-a", "raw.bin", "-n", "raw", "/dev/ram14",
                "/dev/ram15",
            ])
        );
    }

    #[test]
    fn blank_overrides_are_never_emitted() {
        let specs = vec![spec("a", Some("   "), Some("\t"))];
        let args = build_volume_args(&specs, &[]);
        assert_eq!(args, strings(&["-v", "-f", "-a", "a"]));
    }

    #[test]
    fn no_specs_still_yields_fixed_flags_and_passthrough() {
        let args = build_volume_args(&[], &strings(&["/dev/ram0"]));
        assert_eq!(args, strings(&["-v", "-f", "/dev/ram0"]));
    }
}
