use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// annodex - inspect binary class annotation indices
#[derive(Debug, Parser)]
#[command(name = "annodex", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Validate every region and name while opening the index.
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display index overview: format version, class and name counts.
    Info {
        /// Path to the index file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// List the classes of an index.
    Classes {
        /// Path to the index file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Show only classes in this package.
        #[arg(long)]
        package: Option<String>,

        /// Show only public classes.
        #[arg(long)]
        public_only: bool,
    },

    /// Show everything the index records about one class.
    Class {
        /// Path to the index file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Fully qualified class name, e.g. com.acme.Foo.
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List classes carrying an annotation.
    Annotated {
        /// Path to the index file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Fully qualified annotation type, e.g. javax.inject.Singleton.
        #[arg(value_name = "ANNOTATION")]
        annotation: String,

        /// Also match annotations on fields and methods, not only on the class itself.
        #[arg(long)]
        members: bool,
    },
}
