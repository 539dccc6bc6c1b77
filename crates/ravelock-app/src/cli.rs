//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ravelock_core::{LockPolicy, SortOrder};

#[derive(Parser)]
#[command(
    name = "ravelock",
    version,
    about = "Inspect and drive lock groups of linked Ravel widgets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON configuration file.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

/// Ravels are named by tooltip or id wherever a command takes one.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an empty canvas.
    New {
        /// Canvas name.
        #[arg(default_value = "Untitled")]
        name: String,
    },

    /// Create a canvas with three locked ravels to experiment with.
    Demo,

    /// List saved canvases.
    List,

    /// Print the ravels, lock groups and lock rows of a canvas.
    Show { canvas: String },

    /// Add a ravel to a canvas.
    AddRavel {
        canvas: String,
        /// Tooltip of the new ravel.
        tooltip: String,
        /// Handle as name=label,label,...
        #[arg(long = "handle", value_name = "SPEC", required = true)]
        handles: Vec<String>,
    },

    /// Link ravels into a new lock group.
    Lock {
        canvas: String,
        #[arg(num_args = 2.., required = true)]
        ravels: Vec<String>,
    },

    /// Take a ravel out of its lock group.
    Unlock { canvas: String, ravel: String },

    /// Set which handles the group of a ravel locks.
    LockHandles {
        canvas: String,
        ravel: String,
        /// Handle names; none locks the whole state.
        handles: Vec<String>,
        /// Lock every handle any member has.
        #[arg(long, conflicts_with = "handles")]
        all: bool,
    },

    /// Set the fields one lock row propagates.
    Policy {
        canvas: String,
        ravel: String,
        row: usize,
        /// Fields to lock; none turns the row off.
        #[arg(value_enum)]
        fields: Vec<PolicyField>,
    },

    /// Step a ravel's slicer and broadcast the change.
    Slice {
        canvas: String,
        ravel: String,
        handle: String,
        #[arg(allow_hyphen_values = true)]
        step: i64,
    },

    /// Set a handle's sort order and broadcast the change.
    Sort {
        canvas: String,
        ravel: String,
        handle: String,
        #[arg(value_enum)]
        order: SortOrderArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyField {
    Slicer,
    Orientation,
    Calipers,
    Order,
}

impl PolicyField {
    /// Policy locking exactly `fields`.
    pub fn policy(fields: &[PolicyField]) -> LockPolicy {
        fields.iter().fold(LockPolicy::NONE, |policy, field| match field {
            PolicyField::Slicer => policy.with_slicer(true),
            PolicyField::Orientation => policy.with_orientation(true),
            PolicyField::Calipers => policy.with_calipers(true),
            PolicyField::Order => policy.with_order(true),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortOrderArg {
    None,
    Forward,
    Reverse,
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::None => SortOrder::None,
            SortOrderArg::Forward => SortOrder::Forward,
            SortOrderArg::Reverse => SortOrder::Reverse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lock() {
        let cli = Cli::try_parse_from(["ravelock", "-vv", "lock", "c1", "sales", "costs"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.command,
            Command::Lock {
                canvas: "c1".to_string(),
                ravels: vec!["sales".to_string(), "costs".to_string()],
            }
        );
        assert!(Cli::try_parse_from(["ravelock", "lock", "c1", "sales"]).is_err());
    }

    #[test]
    fn test_parse_negative_step() {
        let cli = Cli::try_parse_from(["ravelock", "slice", "c1", "sales", "time", "-2"]).unwrap();
        assert!(matches!(cli.command, Command::Slice { step: -2, .. }));
    }

    #[test]
    fn test_policy_fields() {
        let cli =
            Cli::try_parse_from(["ravelock", "policy", "c1", "sales", "0", "slicer", "order"]).unwrap();
        let Command::Policy { fields, .. } = cli.command else {
            panic!("expected policy command");
        };
        assert_eq!(
            PolicyField::policy(&fields),
            LockPolicy::NONE.with_slicer(true).with_order(true)
        );
        assert_eq!(PolicyField::policy(&[]), LockPolicy::NONE);
    }
}
