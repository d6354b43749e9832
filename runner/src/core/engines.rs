//! Engine binaries the Prisma CLI delegates to.

use serde::{Deserialize, Serialize};

/// One auxiliary engine binary, addressed through its own environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    /// Logical engine name, e.g. `query-engine`.
    pub name: String,
    /// Variable the CLI reads the binary path from.
    pub env: String,
}

impl EngineDescriptor {
    pub fn new(name: &str, env: &str) -> Self {
        Self {
            name: name.to_string(),
            env: env.to_string(),
        }
    }

    /// File name of this engine's binary for `binary_platform`,
    /// e.g. `prisma-query-engine-debian-openssl-3.0.x`.
    pub fn binary_file_name(&self, binary_platform: &str) -> String {
        format!("prisma-{}-{}", self.name, binary_platform)
    }
}

pub fn default_engines() -> Vec<EngineDescriptor> {
    vec![
        EngineDescriptor::new("query-engine", "PRISMA_QUERY_ENGINE_BINARY"),
        EngineDescriptor::new("schema-engine", "PRISMA_SCHEMA_ENGINE_BINARY"),
    ]
}
