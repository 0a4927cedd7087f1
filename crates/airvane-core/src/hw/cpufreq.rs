//! Per-CPU frequency scaling attributes (`/sys/bus/cpu/devices/cpuN/cpufreq`).
//!
//! The governor only acts through `scaling_max_freq`: it lowers or raises
//! the ceiling, and leaves the in-kernel governor to pick frequencies
//! underneath it. All frequencies are in kHz, as sysfs reports them.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sysfs::Attr;

/// cpufreq and topology attributes of a single logical CPU.
#[derive(Debug, Clone)]
pub struct Cpu {
    cpuinfo_min_freq: Attr,
    cpuinfo_max_freq: Attr,
    scaling_available_frequencies: Attr,
    scaling_cur_freq: Attr,
    scaling_max_freq: Attr,
    scaling_governor: Attr,
    core_id: Attr,
}

impl Cpu {
    pub fn new(dir: &Path) -> Self {
        let cpufreq = dir.join("cpufreq");
        Self {
            cpuinfo_min_freq: Attr::new(cpufreq.join("cpuinfo_min_freq")),
            cpuinfo_max_freq: Attr::new(cpufreq.join("cpuinfo_max_freq")),
            scaling_available_frequencies: Attr::new(cpufreq.join("scaling_available_frequencies")),
            scaling_cur_freq: Attr::new(cpufreq.join("scaling_cur_freq")),
            scaling_max_freq: Attr::new(cpufreq.join("scaling_max_freq")),
            scaling_governor: Attr::new(cpufreq.join("scaling_governor")),
            core_id: Attr::new(dir.join("topology").join("core_id")),
        }
    }

    /// Whether the platform exposes a discrete frequency ladder for this
    /// CPU. Without it the governor stays inactive.
    pub fn configurable(&self) -> bool {
        self.scaling_available_frequencies.exists()
    }

    pub fn cpuinfo_min_freq(&self) -> Result<u32> {
        self.cpuinfo_min_freq.read()
    }

    pub fn cpuinfo_max_freq(&self) -> Result<u32> {
        self.cpuinfo_max_freq.read()
    }

    pub fn scaling_cur_freq(&self) -> Result<u32> {
        self.scaling_cur_freq.read()
    }

    pub fn scaling_max_freq(&self) -> Result<u32> {
        self.scaling_max_freq.read()
    }

    pub fn scaling_governor(&self) -> Result<String> {
        self.scaling_governor.read_line()
    }

    /// The frequencies this CPU supports, sorted ascending.
    pub fn scaling_available_frequencies(&self) -> Result<Vec<u32>> {
        let line = self.scaling_available_frequencies.read_line()?;
        let mut freqs: Vec<u32> = line.split_whitespace().filter_map(|f| f.parse().ok()).collect();
        freqs.sort_unstable();
        Ok(freqs)
    }

    pub fn core_id(&self) -> Result<u32> {
        self.core_id.read()
    }

    pub fn set_scaling_max_freq(&self, value: u32) -> Result<()> {
        self.scaling_max_freq.write(value)
    }
}

/// All logical CPUs, enumerated as `cpu0`, `cpu1`, … until a gap.
pub struct CpuInfo {
    cpus: Vec<Cpu>,
}

impl CpuInfo {
    pub fn enumerate(base: &Path) -> Self {
        let mut cpus = Vec::new();
        for ix in 0.. {
            let dir: PathBuf = base.join(format!("cpu{ix}"));
            if !dir.exists() {
                break;
            }
            cpus.push(Cpu::new(&dir));
        }
        Self { cpus }
    }

    pub fn cpus(&self) -> &[Cpu] {
        &self.cpus
    }

    /// Frequency scaling is usable only when at least one CPU was found
    /// and it publishes a ladder.
    pub fn configurable(&self) -> bool {
        self.cpus.first().is_some_and(Cpu::configurable)
    }

    /// The ladder of supported frequencies (identical across cores; read
    /// from the first).
    pub fn available_frequencies(&self) -> Result<Vec<u32>> {
        match self.cpus.first() {
            Some(cpu) => cpu.scaling_available_frequencies(),
            None => Ok(Vec::new()),
        }
    }

    /// Highest configured ceiling across all cores.
    pub fn scaling_max_freq(&self) -> Result<u32> {
        let mut freq = 0;
        for cpu in &self.cpus {
            freq = freq.max(cpu.scaling_max_freq()?);
        }
        Ok(freq)
    }

    /// Apply a new frequency ceiling to every core.
    pub fn set_scaling_max_freq(&self, value: u32) -> Result<()> {
        for cpu in &self.cpus {
            cpu.set_scaling_max_freq(value)?;
        }
        Ok(())
    }

    /// Append one status line per core to `out`.
    pub fn render_status(&self, out: &mut String) -> Result<()> {
        for cpu in &self.cpus {
            let _ = writeln!(
                out,
                "Core {}: {} ({}, max: {})",
                cpu.core_id()?,
                freq2str(cpu.scaling_cur_freq()?),
                cpu.scaling_governor()?,
                freq2str(cpu.scaling_max_freq()?)
            );
        }
        Ok(())
    }
}

/// Render a kHz value with an SI prefix, e.g. `1600000` → `"1.6 GHz"`.
pub fn freq2str(khz: u32) -> String {
    const PREFIX: [&str; 4] = ["k", "M", "G", "T"];
    let mut value = khz as f64;
    let mut ix = 0;
    while value >= 1000.0 && ix < PREFIX.len() - 1 {
        value /= 1000.0;
        ix += 1;
    }
    format!("{} {}Hz", value, PREFIX[ix])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fake_cpus(count: usize, ladder: Option<&str>) -> TempDir {
        let dir = TempDir::new().unwrap();
        for ix in 0..count {
            let cpufreq = dir.path().join(format!("cpu{ix}/cpufreq"));
            fs::create_dir_all(&cpufreq).unwrap();
            fs::write(cpufreq.join("cpuinfo_min_freq"), "800000\n").unwrap();
            fs::write(cpufreq.join("cpuinfo_max_freq"), "2000000\n").unwrap();
            fs::write(cpufreq.join("scaling_cur_freq"), "1600000\n").unwrap();
            fs::write(cpufreq.join("scaling_max_freq"), "2000000\n").unwrap();
            fs::write(cpufreq.join("scaling_governor"), "ondemand\n").unwrap();
            if let Some(ladder) = ladder {
                fs::write(
                    cpufreq.join("scaling_available_frequencies"),
                    format!("{ladder}\n"),
                )
                .unwrap();
            }
            let topology = dir.path().join(format!("cpu{ix}/topology"));
            fs::create_dir_all(&topology).unwrap();
            fs::write(topology.join("core_id"), format!("{ix}\n")).unwrap();
        }
        dir
    }

    #[test]
    fn enumeration_stops_at_gap() {
        let dir = fake_cpus(4, Some("800000 1200000 2000000"));
        let info = CpuInfo::enumerate(dir.path());
        assert_eq!(info.cpus().len(), 4);
    }

    #[test]
    fn ladder_is_sorted_ascending() {
        // Kernel reports descending on many platforms.
        let dir = fake_cpus(1, Some("2000000 1600000 800000 1200000"));
        let info = CpuInfo::enumerate(dir.path());
        assert_eq!(
            info.available_frequencies().unwrap(),
            vec![800000, 1200000, 1600000, 2000000]
        );
    }

    #[test]
    fn not_configurable_without_ladder() {
        let dir = fake_cpus(2, None);
        let info = CpuInfo::enumerate(dir.path());
        assert!(!info.configurable());

        let empty = TempDir::new().unwrap();
        assert!(!CpuInfo::enumerate(empty.path()).configurable());
    }

    #[test]
    fn ceiling_write_hits_every_core() {
        let dir = fake_cpus(2, Some("800000 2000000"));
        let info = CpuInfo::enumerate(dir.path());
        info.set_scaling_max_freq(800000).unwrap();
        for cpu in info.cpus() {
            assert_eq!(cpu.scaling_max_freq().unwrap(), 800000);
        }
        assert_eq!(info.scaling_max_freq().unwrap(), 800000);
    }

    #[test]
    fn freq2str_prefixes() {
        assert_eq!(freq2str(800), "800 kHz");
        assert_eq!(freq2str(1600000), "1.6 GHz");
        assert_eq!(freq2str(2000000), "2 GHz");
    }
}
