//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use extconf::LayoutPreset;

/// extconf - configure the build of a native extension module
#[derive(Parser)]
#[command(name = "extconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the Makefile for an extension
    Configure(ConfigureArgs),

    /// Print the include flags
    Flags(FlagsArgs),

    /// List the objects that will be linked
    Objects(ObjectsArgs),

    /// Report missing roots and objects before running make
    Check(CheckArgs),

    /// Run the binding compiler
    Generate(GenerateArgs),

    /// Remove the generated Makefile
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Layout, extension and toolchain selection shared by several commands.
#[derive(Args, Clone, Default)]
pub struct LayoutArgs {
    /// Directory the layout is relative to (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub anchor: Option<PathBuf>,

    /// Layout preset: `compiler` or `runtime`
    #[arg(long)]
    pub layout: Option<LayoutPreset>,

    /// Link target name (defaults to the preset's)
    #[arg(long)]
    pub target: Option<String>,

    /// Wrapper C source, relative to the anchor
    #[arg(long, value_name = "FILE")]
    pub wrapper_source: Option<PathBuf>,

    /// Core include directory, relative to the anchor
    #[arg(long, value_name = "DIR")]
    pub core_include: Option<PathBuf>,

    /// Core source directory holding pre-built objects
    #[arg(long, value_name = "DIR")]
    pub core_src: Option<PathBuf>,

    /// Peer runtime directory
    #[arg(long, value_name = "DIR")]
    pub peer_runtime: Option<PathBuf>,

    /// Autogenerated header directory
    #[arg(long, value_name = "DIR")]
    pub autogen: Option<PathBuf>,

    /// C compiler (overrides config and the CC environment variable)
    #[arg(long)]
    pub cc: Option<PathBuf>,

    /// Object file suffix (overrides OBJEXT)
    #[arg(long, value_name = "SUFFIX")]
    pub obj_ext: Option<String>,

    /// Extra compiler flag (repeatable)
    #[arg(long = "cflag", value_name = "FLAG", allow_hyphen_values = true)]
    pub cflags: Vec<String>,

    /// Extra linker flag (repeatable)
    #[arg(long = "ldflag", value_name = "FLAG", allow_hyphen_values = true)]
    pub ldflags: Vec<String>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Where to write the Makefile (defaults to ./Makefile)
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Print the plan as JSON instead of writing
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Annotate each flag with the root it comes from
    #[arg(long)]
    pub roles: bool,
}

#[derive(Args)]
pub struct ObjectsArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Output directory for generated files
    #[arg(long, default_value = "autogen")]
    pub dest: PathBuf,

    /// Declaration directory to compile (repeatable)
    #[arg(long = "source", value_name = "DIR")]
    pub source_dirs: Vec<PathBuf>,

    /// Declaration directory to reference (repeatable)
    #[arg(long = "include", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// File prepended to every generated file
    #[arg(long, value_name = "FILE")]
    pub header: Option<PathBuf>,

    /// File appended to every generated file
    #[arg(long, value_name = "FILE")]
    pub footer: Option<PathBuf>,

    /// Write every file even if unchanged
    #[arg(long)]
    pub modified: bool,

    /// Path to the `cfc` executable
    #[arg(long, value_name = "PATH")]
    pub cfc: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// The Makefile to remove (defaults to ./Makefile)
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
