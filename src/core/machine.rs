//! Machine snapshot included once per export document.

use serde::{Deserialize, Serialize};

/// Host description captured when the benchmarks ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineInfo {
    pub hostname: String,
    pub processor_type: String,
    pub processors: u64,
    /// Total memory in bytes
    pub memory: u64,
    pub kernel_version: String,
}

impl Default for MachineInfo {
    fn default() -> Self {
        MachineInfo {
            hostname: "unknown".to_string(),
            processor_type: std::env::consts::ARCH.to_string(),
            processors: 0,
            memory: 0,
            kernel_version: "unknown".to_string(),
        }
    }
}

impl MachineInfo {
    /// Detect machine information from the current system
    pub fn detect() -> Self {
        use sysinfo::System;

        let mut sys = System::new_all();
        sys.refresh_all();

        let fallback = MachineInfo::default();
        let processor_type = sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback.processor_type);
        let processors = sys.cpus().len() as u64;
        let memory = sys.total_memory();
        let hostname = System::host_name().unwrap_or(fallback.hostname);
        let kernel_version = System::kernel_version().unwrap_or(fallback.kernel_version);

        MachineInfo {
            hostname,
            processor_type,
            processors,
            memory,
            kernel_version,
        }
    }
}
