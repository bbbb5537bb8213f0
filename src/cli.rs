//! CLI argument parsing for the add-file workflow.
//!
//! clap handles the option grammar; this module layers on the parts clap has
//! no vocabulary for: `--name`/`--mime` bind to the most recent `--add-file`,
//! and domain IDs must be positive integers. Option values always take the
//! next token, even one starting with `-`.
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use crate::error::{AddFileError, Result};
use crate::util::non_blank;

/// Program name plus at least two arguments.
const MIN_ARGV_LEN: usize = 3;

#[derive(Parser, Debug)]
#[command(
    name = "shfs-add-file",
    version,
    about = "Add files to an SHFS volume and trigger a remount on running domains",
    override_usage = "shfs-add-file [OPTION]... [DEVICE]...",
    after_help = "For each add-file token, --name and --mime apply to the most recent --add-file.\nArguments after the first DEVICE are passed to shfs_admin unchanged.\n\nExample:\n  shfs-add-file -d 12 -d 34 --add-file song.mp4 --mime video/mp4 /dev/ram14 /dev/ram15"
)]
pub struct RootArgs {
    /// Domain to notify after the volume update (repeatable)
    #[arg(short = 'd', long = "dom", value_name = "ID", allow_hyphen_values = true)]
    pub dom: Vec<String>,

    /// Add a file to the volume (repeatable)
    #[arg(
        short = 'a',
        long = "add-file",
        value_name = "FILE",
        allow_hyphen_values = true,
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    pub add_file: Vec<String>,

    /// Set an additional name on the current file
    #[arg(short = 'n', long, value_name = "NAME", allow_hyphen_values = true)]
    pub name: Vec<String>,

    /// Set the MIME type of the current file
    #[arg(short = 'm', long, value_name = "MIME", allow_hyphen_values = true)]
    pub mime: Vec<String>,

    /// Number of domains to trigger concurrently; reports stay in domain order
    #[arg(
        short = 'j',
        long,
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub jobs: u16,

    /// Volume member devices and extra shfs_admin arguments
    #[arg(value_name = "DEVICE", trailing_var_arg = true)]
    pub passthrough: Vec<String>,
}

/// Identifier of a running domain; always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainId(NonZeroU64);

impl DomainId {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl FromStr for DomainId {
    type Err = AddFileError;

    fn from_str(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<NonZeroU64>()
            .map(DomainId)
            .map_err(|_| AddFileError::InvalidDomainId(raw.to_string()))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One `--add-file` entry with the overrides that followed it.
///
/// Blank overrides are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAdditionSpec {
    pub path: String,
    pub name: Option<String>,
    pub mime: Option<String>,
}

impl FileAdditionSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            mime: None,
        }
    }
}

/// Fully validated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFileArgs {
    pub domains: Vec<DomainId>,
    pub files: Vec<FileAdditionSpec>,
    pub passthrough: Vec<String>,
    pub jobs: usize,
}

#[derive(Debug, Clone, Copy)]
enum Override {
    Name,
    Mime,
}

impl Override {
    fn label(self) -> &'static str {
        match self {
            Override::Name => "name",
            Override::Mime => "mime",
        }
    }
}

/// Parse a full argv (program name first).
///
/// Option errors are reported in command-line order, so the first bad token
/// wins. The argument-count check runs after the option scan.
pub fn parse_args<I, T>(argv: I) -> Result<AddFileArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let matches = RootArgs::command().try_get_matches_from(argv.iter())?;
    let root = RootArgs::from_arg_matches(&matches)?;

    let (domains, files) = match (
        collect_domains(&matches, &root.dom),
        collect_file_specs(&matches, &root),
    ) {
        (Ok(domains), Ok(files)) => (domains, files),
        (Err((_, err)), Ok(_)) | (Ok(_), Err((_, err))) => return Err(err),
        (Err((domain_idx, domain_err)), Err((file_idx, file_err))) => {
            return Err(if domain_idx < file_idx {
                domain_err
            } else {
                file_err
            });
        }
    };

    if argv.len() < MIN_ARGV_LEN {
        return Err(AddFileError::Usage);
    }

    Ok(AddFileArgs {
        domains,
        files,
        passthrough: root.passthrough,
        jobs: usize::from(root.jobs),
    })
}

/// Full help text, printed on stderr for usage errors.
pub fn usage_text() -> String {
    RootArgs::command().render_help().to_string()
}

type Indexed<T> = std::result::Result<T, (usize, AddFileError)>;

/// Pair each value of a repeatable option with its position on the command line.
fn indexed_values<'a>(
    matches: &ArgMatches,
    id: &str,
    values: &'a [String],
) -> Vec<(usize, &'a str)> {
    matches
        .indices_of(id)
        .map(|indices| indices.zip(values.iter().map(String::as_str)).collect())
        .unwrap_or_default()
}

fn collect_domains(matches: &ArgMatches, raw: &[String]) -> Indexed<Vec<DomainId>> {
    indexed_values(matches, "dom", raw)
        .into_iter()
        .map(|(idx, raw)| raw.parse::<DomainId>().map_err(|err| (idx, err)))
        .collect()
}

fn collect_file_specs(
    matches: &ArgMatches,
    root: &RootArgs,
) -> Indexed<Vec<FileAdditionSpec>> {
    let adds = indexed_values(matches, "add_file", &root.add_file);
    let mut specs: Vec<FileAdditionSpec> = adds
        .iter()
        .map(|(_, path)| FileAdditionSpec::new(*path))
        .collect();

    let mut overrides: Vec<(usize, Override, &str)> =
        indexed_values(matches, "name", &root.name)
            .into_iter()
            .map(|(idx, value)| (idx, Override::Name, value))
            .chain(
                indexed_values(matches, "mime", &root.mime)
                    .into_iter()
                    .map(|(idx, value)| (idx, Override::Mime, value)),
            )
            .collect();
    overrides.sort_by_key(|(idx, _, _)| *idx);

    for (idx, kind, value) in overrides {
        let Some(current) = adds.iter().rposition(|(add_idx, _)| *add_idx < idx) else {
            return Err((idx, AddFileError::MisplacedOverride(kind.label())));
        };
        let spec = &mut specs[current];
        match kind {
            Override::Name => spec.name = non_blank(value),
            Override::Mime => spec.mime = non_blank(value),
        }
    }
    Ok(specs)
}
