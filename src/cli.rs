use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    #[command(subcommand)]
    pub(crate) command: LibswitchCommand,
    /// More log output on stderr (-v: info, -vv: debug). `LIBSWITCH_LOG` overrides
    #[clap(short, long, global = true, action = ArgAction::Count)]
    pub(crate) verbose: u8,
    /// Package-manager program used to install libraries (default: npm)
    #[clap(long, global = true)]
    pub(crate) installer: Option<String>,
    /// Alias configuration file, relative to the project root (default: tsconfig.json)
    #[clap(long, global = true)]
    pub(crate) alias_file: Option<String>,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum LibswitchCommand {
    /// Show whether libraries are local or remote. Defaults to all registered libraries
    Status {
        names: Vec<String>,
    },
    /// List the libraries declared in the `libswitch` section of `package.json`
    List,
    /// Switch libraries to their local checkout
    Local {
        #[clap(required = true)]
        names: Vec<String>,
    },
    /// Switch libraries to their published version
    Remote {
        #[clap(required = true)]
        names: Vec<String>,
    },
    /// Reinstall libraries in their current mode. Defaults to all registered libraries
    Update {
        names: Vec<String>,
    },
    /// Rewrite the tsconfig path aliases from `package.json` without installing anything
    Sync,
    /// Print the path of the alias configuration file in use
    Tsconfig,
}
