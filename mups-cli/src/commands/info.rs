//! `info` command - build and print a ring metadata record.

use clap::Args;
use mups::config::ConfigFile;
use mups::platform::host_platform;
use mups::{serialize_ring_info, BuildTag, Identity, IdentityProvider, MetadataFormat, RingInfo};

use crate::error::CliError;

/// Arguments for `mups info`.
#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Package name
    #[arg(long)]
    pub name: String,

    /// Package version
    #[arg(long)]
    pub version: String,

    /// Platform tag to embed in the filename
    #[arg(long, conflicts_with = "host_platform")]
    pub platform: Option<String>,

    /// Use the platform this binary was built for
    #[arg(long)]
    pub host_platform: bool,

    /// Author name
    #[arg(long)]
    pub author: Option<String>,

    /// Author email
    #[arg(long)]
    pub email: Option<String>,

    /// Python requirements
    #[arg(long)]
    pub requires_dist: Option<String>,

    /// Mojo requirements
    #[arg(long)]
    pub requires_mojo: Option<String>,

    /// Build tag
    #[arg(long)]
    pub build: Option<BuildTag>,

    /// Output format (json or ini)
    #[arg(long)]
    pub format: Option<MetadataFormat>,

    /// Do not ask git for a default author identity
    #[arg(long)]
    pub no_git: bool,
}

pub fn run(args: InfoArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let format = args.format.unwrap_or(config.build.metadata_format);
    let info = build_info(args, &config)?;
    print!("{}", ensure_trailing_newline(serialize_ring_info(&info, format)?));
    Ok(())
}

/// Resolve defaults from flags, then config, then git, and build the record.
fn build_info(args: InfoArgs, config: &ConfigFile) -> Result<RingInfo, CliError> {
    let explicit = Identity::new(
        args.author.unwrap_or_default(),
        args.email.unwrap_or_default(),
    );
    let mut identity = explicit.merge_missing(config.author_identity());
    if !args.no_git && (identity.name.is_empty() || identity.email.is_empty()) {
        if let Some(git) = config.git_identity() {
            tracing::debug!("Filling author identity from git config");
            identity = identity.merge_missing(git.identity());
        }
    }

    let platform = if args.host_platform {
        host_platform()
    } else {
        args.platform
            .or_else(|| config.build.platform.clone())
            .unwrap_or_default()
    };

    let mut builder = RingInfo::builder(args.name, args.version)
        .platform(platform)
        .identity(&identity)
        .requires_dist(args.requires_dist.unwrap_or_default())
        .requires_mojo(args.requires_mojo.unwrap_or_default());
    if let Some(build) = args.build {
        builder = builder.build_tag(build);
    }

    Ok(builder.build()?)
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
