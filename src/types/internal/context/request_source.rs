use std::fmt;

/// Where an operation entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    /// HTTP endpoint
    API,

    /// CLI command
    CLI,

    /// Background task (session cleanup, seeding)
    System,
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestSource::API => "api",
            RequestSource::CLI => "cli",
            RequestSource::System => "system",
        };
        f.write_str(label)
    }
}
