use cs_nodes::NodeError;
use cs_statemachine::MachineError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {what}")]
    Config { what: String },

    #[error("Sequence did not finish within {ticks} ticks (stopped in '{trace}')")]
    Timeout { ticks: u32, trace: String },

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("State machine error: {0}")]
    Machine(#[from] MachineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
