use crate::installers::github::DEFAULT_API_BASE;
use crate::schemas::release::LATEST;
use clap::Parser;

/// Defines the command-line interface of the installer.
/// `#[derive(Parser)]` generates the argument parsing code via `clap`.
#[derive(Parser, Debug)]
#[command(name = "proton-ge-installer")]
#[command(
    about = "Install GE-Proton releases into Steam's compatibilitytools.d",
    long_about = None
)]
// `-v` selects the release to install, so clap's own version flag is turned off.
#[command(disable_version_flag = true)]
pub struct Cli {
    /// GE Version (release) to install; takes precedence over --version.
    #[arg(value_name = "VERSION")]
    pub(crate) positional_version: Option<String>,

    /// GE Version (release) to install, e.g. "latest", "9-20" or "GE-Proton9-20".
    #[arg(short = 'v', long = "version", value_name = "VERSION", default_value = LATEST)]
    pub(crate) version: String,

    /// Steam root dir; releases are unpacked into <DIR>/root/compatibilitytools.d [default: ~/.steam]
    #[arg(
        short = 'd',
        long = "steam-dir",
        alias = "steam_dir",
        env = "PROTON_GE_STEAM_DIR",
        value_name = "DIR"
    )]
    pub(crate) steam_dir: Option<String>,

    /// Force to override an already existing install.
    #[arg(short, long)]
    pub(crate) force: bool,

    /// Enables detailed debug output for troubleshooting.
    #[arg(long, env = "PROTON_GE_DEBUG")]
    pub(crate) debug: bool,

    /// Release API root, for mirrors of the GitHub API.
    #[arg(long, env = "PROTON_GE_API_URL", default_value = DEFAULT_API_BASE, hide = true)]
    pub(crate) api_url: String,
}

impl Cli {
    /// The version the user asked for: the positional argument wins over the flag.
    pub fn requested_version(&self) -> &str {
        self.positional_version.as_deref().unwrap_or(&self.version)
    }
}
