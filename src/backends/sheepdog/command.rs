//! Argument vectors for the `collie` control tool

use super::host::HostTarget;
use crate::domain::ports::CommandLine;
use std::path::PathBuf;

/// One control tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheepdogCommand {
    /// Cluster capacity, raw output
    NodeInfo,
    /// Every VDI, raw output
    VdiList,
    /// The VDIs (current and snapshots) carrying one name, raw output
    VdiListOne { name: String },
    VdiCreate { name: String, capacity: u64 },
    VdiDelete { name: String },
    VdiResize { name: String, capacity: u64 },
}

impl SheepdogCommand {
    /// Short label for logs and errors
    pub fn operation(&self) -> &'static str {
        match self {
            SheepdogCommand::NodeInfo => "node info",
            SheepdogCommand::VdiList | SheepdogCommand::VdiListOne { .. } => "vdi list",
            SheepdogCommand::VdiCreate { .. } => "vdi create",
            SheepdogCommand::VdiDelete { .. } => "vdi delete",
            SheepdogCommand::VdiResize { .. } => "vdi resize",
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            SheepdogCommand::NodeInfo => vec!["node".into(), "info".into(), "-r".into()],
            SheepdogCommand::VdiList => vec!["vdi".into(), "list".into(), "-r".into()],
            SheepdogCommand::VdiListOne { name } => {
                vec!["vdi".into(), "list".into(), name.clone(), "-r".into()]
            }
            SheepdogCommand::VdiCreate { name, capacity } => vec![
                "vdi".into(),
                "create".into(),
                name.clone(),
                capacity.to_string(),
            ],
            SheepdogCommand::VdiDelete { name } => {
                vec!["vdi".into(), "delete".into(), name.clone()]
            }
            SheepdogCommand::VdiResize { name, capacity } => vec![
                "vdi".into(),
                "resize".into(),
                name.clone(),
                capacity.to_string(),
            ],
        }
    }
}

/// Composes [`CommandLine`]s aimed at one cluster
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    tool: PathBuf,
    target: HostTarget,
}

impl CommandBuilder {
    pub fn new(tool: impl Into<PathBuf>, target: HostTarget) -> Self {
        Self {
            tool: tool.into(),
            target,
        }
    }

    /// Operation arguments followed by the host flags
    pub fn build(&self, command: &SheepdogCommand) -> CommandLine {
        let mut args = command.args();
        args.extend(self.target.args());
        CommandLine {
            program: self.tool.clone(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CommandBuilder {
        CommandBuilder::new(
            "collie",
            HostTarget {
                address: "localhost".into(),
                port: 7000,
            },
        )
    }

    fn argv(command: SheepdogCommand) -> String {
        builder().build(&command).args.join(" ")
    }

    #[test]
    fn test_listing_commands() {
        assert_eq!(
            argv(SheepdogCommand::NodeInfo),
            "node info -r -a localhost -p 7000"
        );
        assert_eq!(
            argv(SheepdogCommand::VdiList),
            "vdi list -r -a localhost -p 7000"
        );
        assert_eq!(
            argv(SheepdogCommand::VdiListOne {
                name: "test".into()
            }),
            "vdi list test -r -a localhost -p 7000"
        );
    }

    #[test]
    fn test_mutating_commands() {
        assert_eq!(
            argv(SheepdogCommand::VdiCreate {
                name: "vol1".into(),
                capacity: 10737418240,
            }),
            "vdi create vol1 10737418240 -a localhost -p 7000"
        );
        assert_eq!(
            argv(SheepdogCommand::VdiDelete {
                name: "vol1".into()
            }),
            "vdi delete vol1 -a localhost -p 7000"
        );
        assert_eq!(
            argv(SheepdogCommand::VdiResize {
                name: "vol1".into(),
                capacity: 1024,
            }),
            "vdi resize vol1 1024 -a localhost -p 7000"
        );
    }

    #[test]
    fn test_name_stays_one_argument() {
        let cmd = builder().build(&SheepdogCommand::VdiDelete {
            name: "test name".into(),
        });
        assert_eq!(cmd.program, PathBuf::from("collie"));
        assert_eq!(cmd.args[2], "test name");
        assert_eq!(cmd.args.len(), 7);
    }

    #[test]
    fn test_custom_target() {
        let builder = CommandBuilder::new(
            "/opt/sheepdog/bin/collie",
            HostTarget {
                address: "10.0.0.5".into(),
                port: 7001,
            },
        );
        let cmd = builder.build(&SheepdogCommand::NodeInfo);
        assert_eq!(
            cmd.to_string(),
            "/opt/sheepdog/bin/collie node info -r -a 10.0.0.5 -p 7001"
        );
        assert_eq!(SheepdogCommand::NodeInfo.operation(), "node info");
    }
}
