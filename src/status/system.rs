//! Host metrics behind a capability trait
//!
//! The status node asks this trait for everything it reads off the host:
//! CPU/RAM load, disk usage per mount, the GPU temperature sensor, and
//! device-path presence probes. Production uses `sysinfo`; tests use the
//! fixed-value stub so no assertion depends on the build machine.

use std::path::Path;
use sysinfo::{Components, CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

/// Sentinel for metrics the host could not provide this tick
pub const METRIC_UNAVAILABLE: f32 = -1.0;

pub trait SystemMetricsProvider: Send {
    /// Whole-machine CPU utilization, 0-100
    fn cpu_percent(&mut self) -> f32;

    /// RAM utilization, 0-100
    fn ram_percent(&mut self) -> f32;

    /// Used share of the filesystem mounted at `mount`, 0-100;
    /// [`METRIC_UNAVAILABLE`] when the mount is unknown
    fn disk_used_percent(&mut self, mount: &str) -> f32;

    /// Temperature in Celsius of the first sensor whose label contains
    /// `label` (case-insensitive); [`METRIC_UNAVAILABLE`] when none does
    fn gpu_temp_c(&mut self, label: &str) -> f32;

    /// Device presence probe
    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// `sysinfo`-backed provider
pub struct SysinfoMetrics {
    system: System,
    disks: Disks,
    components: Components,
}

impl SysinfoMetrics {
    pub fn new() -> Self {
        SysinfoMetrics {
            system: System::new_with_specifics(
                RefreshKind::nothing()
                    .with_cpu(CpuRefreshKind::everything())
                    .with_memory(MemoryRefreshKind::everything()),
            ),
            disks: Disks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetricsProvider for SysinfoMetrics {
    fn cpu_percent(&mut self) -> f32 {
        // Usage is computed against the previous refresh; the first tick
        // after startup reads 0 and settles from the second tick on
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage()
    }

    fn ram_percent(&mut self) -> f32 {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return METRIC_UNAVAILABLE;
        }
        self.system.used_memory() as f32 / total as f32 * 100.0
    }

    fn disk_used_percent(&mut self, mount: &str) -> f32 {
        self.disks.refresh(true);
        for disk in self.disks.list() {
            if disk.mount_point() == Path::new(mount) {
                let total = disk.total_space();
                if total == 0 {
                    return METRIC_UNAVAILABLE;
                }
                let used = total - disk.available_space();
                return used as f32 / total as f32 * 100.0;
            }
        }
        log::debug!("No disk mounted at {}", mount);
        METRIC_UNAVAILABLE
    }

    fn gpu_temp_c(&mut self, label: &str) -> f32 {
        self.components.refresh(true);
        let needle = label.to_lowercase();
        for component in self.components.list() {
            if component.label().to_lowercase().contains(&needle) {
                if let Some(temp) = component.temperature() {
                    return temp;
                }
            }
        }
        METRIC_UNAVAILABLE
    }
}

/// Fixed-value provider for tests and dry runs
pub struct FixedMetrics {
    pub cpu: f32,
    pub ram: f32,
    pub disk: f32,
    pub gpu_temp: f32,
    /// Paths reported present by the probe
    pub present_paths: Vec<String>,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        FixedMetrics {
            cpu: 12.5,
            ram: 40.0,
            disk: 55.0,
            gpu_temp: 42.0,
            present_paths: Vec::new(),
        }
    }
}

impl SystemMetricsProvider for FixedMetrics {
    fn cpu_percent(&mut self) -> f32 {
        self.cpu
    }

    fn ram_percent(&mut self) -> f32 {
        self.ram
    }

    fn disk_used_percent(&mut self, _mount: &str) -> f32 {
        self.disk
    }

    fn gpu_temp_c(&mut self, _label: &str) -> f32 {
        self.gpu_temp
    }

    fn path_exists(&self, path: &str) -> bool {
        self.present_paths.iter().any(|p| p == path)
    }
}
